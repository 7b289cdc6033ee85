//! Quick-tile guessing
//!
//! The host only says that a window's tile mode changed. It doesn't say
//! whether the window was tiled or untiled, or to which half. Both are guessed
//! from how close the window landed to half the display.
//!
//! Known misfires: a window that was already half the display wide looks
//! tiled, and a side panel shrinking the tile area makes a real tile look
//! untiled.

use tracing::debug;

use crate::constants::heuristics::{RIGHT_TILE_X_TOLERANCE, TILE_WIDTH_TOLERANCE};
use crate::geometry::Rect;

/// Which half a tiled window snapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileHalf {
    Left,
    Right,
}

/// Guess whether `rect` was just tiled and, if so, to which half
pub fn classify(rect: &Rect, display_width: i32) -> Option<TileHalf> {
    let half = f64::from(display_width) * 0.5;
    if (half - f64::from(rect.width)).abs() > TILE_WIDTH_TOLERANCE {
        return None;
    }

    if (half - f64::from(rect.x)).abs() < RIGHT_TILE_X_TOLERANCE {
        Some(TileHalf::Right)
    } else {
        Some(TileHalf::Left)
    }
}

/// Shrink a freshly tiled window to half of the usable desktop width
///
/// Returns `None` when the notification looks like an untile. A right-half
/// tile keeps its right edge in place; a left-half tile keeps its x.
pub fn on_tile_toggled(rect: Rect, display_width: i32, desktop_max_width: i32) -> Option<Rect> {
    let Some(half) = classify(&rect, display_width) else {
        debug!(width = rect.width, display_width, "tile change looks like an untile, ignoring");
        return None;
    };

    let width = desktop_max_width / 2;
    let x = match half {
        TileHalf::Left => rect.x,
        TileHalf::Right => rect.x.saturating_add(rect.width - width),
    };

    debug!(?half, width, x, "window tiled");
    Some(Rect { x, width, ..rect })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_outside_tolerance_is_untile() {
        assert_eq!(on_tile_toggled(Rect::new(958, 0, 962, 1080), 1920, 1720), None);
        assert_eq!(classify(&Rect::new(0, 0, 958, 1080), 1920), None);
    }

    #[test]
    fn test_right_tile_keeps_right_edge() {
        let tiled = on_tile_toggled(Rect::new(959, 0, 960, 1080), 1920, 1720);
        assert_eq!(tiled, Some(Rect::new(1059, 0, 860, 1080)));
    }

    #[test]
    fn test_x_two_units_from_midpoint_is_left_tile() {
        // |960 - 958| = 2 is not strictly below the right-tile tolerance
        let tiled = on_tile_toggled(Rect::new(958, 0, 960, 1080), 1920, 1720);
        assert_eq!(tiled, Some(Rect::new(958, 0, 860, 1080)));
    }

    #[test]
    fn test_left_tile_keeps_x() {
        let tiled = on_tile_toggled(Rect::new(0, 0, 961, 1080), 1920, 1720);
        assert_eq!(tiled, Some(Rect::new(0, 0, 860, 1080)));
    }

    #[test]
    fn test_classify_tolerances() {
        assert_eq!(classify(&Rect::new(959, 0, 959, 100), 1920), Some(TileHalf::Right));
        assert_eq!(classify(&Rect::new(962, 0, 960, 100), 1920), Some(TileHalf::Left));
        assert_eq!(classify(&Rect::new(961, 0, 960, 100), 1920), Some(TileHalf::Right));
    }
}
