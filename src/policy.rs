//! Per-event policy snapshot
//!
//! Everything here is rebuilt from scratch for each event: the window list,
//! the active activity and the display may all change in between.

use serde::Serialize;

use crate::adjust::adjust;
use crate::config::{OverrideEntry, OverrideRegistry};
use crate::desktop::DesktopState;
use crate::geometry::{Display, Rect};
use crate::host::ClientInfo;
use crate::sidebar::{DetectedPanel, SidebarState, detect_panel};
use crate::tile::on_tile_toggled;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySnapshot {
    pub profile: String,
    pub display: Display,
    pub overrides: OverrideEntry,
    pub panel: DetectedPanel,
    pub sidebar: SidebarState,
    pub desktop: DesktopState,
}

impl PolicySnapshot {
    pub fn build(
        profile: &str,
        clients: &[ClientInfo],
        registry: &OverrideRegistry,
        display: Display,
    ) -> Self {
        let overrides = registry.resolve(profile);
        let panel = detect_panel(clients.iter().map(ClientInfo::dock_candidate), display.width);
        let sidebar = SidebarState::compute(panel, &overrides, display.width);
        let desktop = DesktopState::compute(&overrides, &sidebar, display);

        Self {
            profile: profile.to_string(),
            display,
            overrides,
            panel,
            sidebar,
            desktop,
        }
    }

    /// New geometry for a window that just appeared, if it covers the sidebar
    pub fn place(&self, rect: Rect) -> Option<Rect> {
        adjust(rect, &self.sidebar)
    }

    /// Geometry for a window that was just maximized in both directions
    pub fn maximize(&self, rect: Rect) -> Rect {
        self.desktop.max_rect(rect)
    }

    /// Geometry for a window whose tile mode changed; `None` on untile
    pub fn retile(&self, rect: Rect) -> Option<Rect> {
        let tiled = on_tile_toggled(rect, self.display.width, self.desktop.width)?;
        Some(adjust(tiled, &self.sidebar).unwrap_or(tiled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Side;

    const DISPLAY: Display = Display { width: 1920, height: 1080 };

    fn dock(window: u32, x: i32, width: i32) -> ClientInfo {
        ClientInfo {
            window,
            geometry: Rect::new(x, 0, width, DISPLAY.height),
            is_dock: true,
            is_normal: false,
            caption: "panel".to_string(),
        }
    }

    #[test]
    fn test_left_dock_without_overrides() {
        let snapshot = PolicySnapshot::build("Default", &[dock(1, 0, 60)], &OverrideRegistry::new(), DISPLAY);

        assert_eq!(snapshot.sidebar.side, Some(Side::Left));
        assert_eq!(snapshot.sidebar.width, 60);
        assert_eq!(snapshot.place(Rect::new(10, 0, 800, 600)), Some(Rect::new(60, 0, 800, 600)));
    }

    #[test]
    fn test_default_override_moves_sidebar_right() {
        let mut registry = OverrideRegistry::new();
        registry.insert(
            "Default",
            OverrideEntry { side: Some(Side::Right), width: Some(200), ..Default::default() },
        );
        let snapshot = PolicySnapshot::build("Default", &[dock(1, 0, 60)], &registry, DISPLAY);

        assert_eq!(snapshot.sidebar.side, Some(Side::Right));
        assert_eq!(snapshot.sidebar.width, 200);

        let max = snapshot.maximize(Rect::new(0, 0, 1920, 1080));
        assert_eq!(max.x, 0);
        assert_eq!(max.width, 1720);
    }

    #[test]
    fn test_retile_runs_sidebar_adjustment() {
        // Left sidebar 60 wide: a left-half tile at x=0 must be pushed clear of it
        let snapshot = PolicySnapshot::build("Default", &[dock(1, 0, 60)], &OverrideRegistry::new(), DISPLAY);
        assert_eq!(snapshot.desktop.width, 1860);

        let retiled = snapshot.retile(Rect::new(0, 0, 960, 1080));
        assert_eq!(retiled, Some(Rect::new(60, 0, 930, 1080)));
    }

    #[test]
    fn test_retile_right_half_with_right_sidebar() {
        // Right sidebar 72 wide: the right-half tile shrinks to 924 and abuts the sidebar
        let snapshot = PolicySnapshot::build("Default", &[dock(1, 1848, 72)], &OverrideRegistry::new(), DISPLAY);
        assert_eq!(snapshot.sidebar.side, Some(Side::Right));
        assert_eq!(snapshot.desktop.width, 1848);

        let retiled = snapshot.retile(Rect::new(960, 0, 960, 1080));
        assert_eq!(retiled, Some(Rect::new(924, 0, 924, 1080)));
    }

    #[test]
    fn test_retile_ignores_untile() {
        let snapshot = PolicySnapshot::build("Default", &[], &OverrideRegistry::new(), DISPLAY);
        assert_eq!(snapshot.retile(Rect::new(100, 100, 1200, 800)), None);
    }

    #[test]
    fn test_no_docks_means_no_adjustment() {
        let snapshot = PolicySnapshot::build("Default", &[], &OverrideRegistry::new(), DISPLAY);
        assert_eq!(snapshot.sidebar.side, None);
        assert_eq!(snapshot.place(Rect::new(-20, 0, 800, 600)), None);
        assert_eq!(snapshot.maximize(Rect::new(5, 0, 800, 1080)), Rect::new(0, 0, 1920, 1080));
    }
}
