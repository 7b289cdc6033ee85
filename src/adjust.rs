use tracing::debug;

use crate::geometry::{Rect, Side};
use crate::sidebar::SidebarState;

/// Move `rect` so it abuts the sidebar instead of covering it
///
/// Returns `None` when the window doesn't overlap the sidebar. Only `x`
/// changes; size and `y` are preserved.
pub fn adjust(rect: Rect, sidebar: &SidebarState) -> Option<Rect> {
    let side = sidebar.overlaps(&rect)?;
    let x = match side {
        Side::Left => sidebar.width,
        Side::Right => sidebar
            .display_width
            .saturating_sub(sidebar.width)
            .saturating_sub(rect.width),
    };

    debug!(?side, from = rect.x, to = x, "window overlaps sidebar");
    Some(rect.with_x(x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrideEntry;
    use crate::sidebar::{DetectedPanel, detect_panel, DockCandidate};

    fn sidebar(side: Side, width: i32, padding: Option<u32>) -> SidebarState {
        let overrides = OverrideEntry { padding, ..Default::default() };
        SidebarState::compute(DetectedPanel { side: Some(side), width }, &overrides, 1920)
    }

    #[test]
    fn test_left_overlap_moves_to_sidebar_edge() {
        let detected = detect_panel([DockCandidate { is_dock: true, x: 0, width: 60 }], 1920);
        let state = SidebarState::compute(detected, &OverrideEntry::default(), 1920);
        assert_eq!(state.side, Some(Side::Left));
        assert_eq!(state.width, 60);

        let adjusted = adjust(Rect::new(10, 0, 800, 600), &state);
        assert_eq!(adjusted, Some(Rect::new(60, 0, 800, 600)));
    }

    #[test]
    fn test_right_overlap_moves_left_of_sidebar() {
        let state = sidebar(Side::Right, 40, None);
        let adjusted = adjust(Rect::new(1500, 100, 800, 600), &state);
        assert_eq!(adjusted, Some(Rect::new(1920 - 40 - 800, 100, 800, 600)));
    }

    #[test]
    fn test_non_overlapping_window_is_untouched() {
        let state = sidebar(Side::Left, 60, None);
        assert_eq!(adjust(Rect::new(60, 0, 800, 600), &state), None);
        assert_eq!(adjust(Rect::new(400, 0, 800, 600), &state), None);
    }

    #[test]
    fn test_adjust_is_idempotent() {
        let cases = [
            (sidebar(Side::Left, 60, None), Rect::new(10, 20, 700, 500)),
            (sidebar(Side::Right, 60, None), Rect::new(1400, 20, 700, 500)),
            (sidebar(Side::Right, 60, Some(12)), Rect::new(1400, 20, 700, 500)),
        ];
        for (state, rect) in cases {
            let once = adjust(rect, &state).unwrap_or(rect);
            assert_ne!(once, rect);
            let twice = adjust(once, &state).unwrap_or(once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_no_overlap_after_correction_without_padding() {
        let state = sidebar(Side::Right, 60, None);
        let once = adjust(Rect::new(1400, 0, 700, 500), &state).unwrap();
        assert_eq!(state.overlaps(&once), None);
    }
}
