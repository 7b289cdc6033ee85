use serde::Serialize;
use tracing::debug;

use crate::config::OverrideEntry;
use crate::geometry::{Display, Rect, Side};
use crate::sidebar::SidebarState;

/// Where a maximized window goes under the active activity
///
/// A missing `origin_y`/`height` keeps the window's own value, so the host's
/// vertical maximization is left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DesktopState {
    pub origin_x: i32,
    pub origin_y: Option<i32>,
    pub width: i32,
    pub height: Option<i32>,
}

impl DesktopState {
    pub fn compute(overrides: &OverrideEntry, sidebar: &SidebarState, display: Display) -> Self {
        let origin_x = overrides.xpos.unwrap_or(match sidebar.side {
            Some(Side::Right) => 0,
            _ => sidebar.width,
        });
        let width = overrides
            .max_width
            .unwrap_or_else(|| display.width.saturating_sub(sidebar.width));

        let state = Self {
            origin_x,
            origin_y: overrides.ypos,
            width,
            height: overrides.max_height,
        };
        debug!(?state, "computed maximized geometry");
        state
    }

    /// Rectangle for `current` once maximized
    pub fn max_rect(&self, current: Rect) -> Rect {
        Rect {
            x: self.origin_x,
            y: self.origin_y.unwrap_or(current.y),
            width: self.width,
            height: self.height.unwrap_or(current.height),
        }
    }
}
