//! Sidebar detection and exclusion bounds
//!
//! The sidebar is inferred from dock-type windows hugging the left or right
//! screen edge, then merged with the active activity's overrides.

use serde::Serialize;
use tracing::debug;

use crate::config::OverrideEntry;
use crate::constants::heuristics::{LEFT_EDGE_MAX_X, RIGHT_EDGE_DENOMINATOR, RIGHT_EDGE_NUMERATOR};
use crate::geometry::{Rect, Side, to_coord};

/// The bits of a window that matter for sidebar detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DockCandidate {
    pub is_dock: bool,
    pub x: i32,
    pub width: i32,
}

/// What the dock scan found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectedPanel {
    /// `None` when no dock hugs either edge
    pub side: Option<Side>,
    pub width: i32,
}

/// Find the dock acting as a sidebar
///
/// Docks at least half the display wide (top/bottom bars) and docks away from
/// both edges are ignored. The reported width is the widest qualifying dock;
/// the side is that of the last one seen.
pub fn detect_panel<I>(candidates: I, display_width: i32) -> DetectedPanel
where
    I: IntoIterator<Item = DockCandidate>,
{
    let mut detected = DetectedPanel::default();

    for candidate in candidates {
        if !candidate.is_dock {
            continue;
        }

        if i64::from(candidate.width) * 2 >= i64::from(display_width) {
            continue;
        }

        let side = if candidate.x < LEFT_EDGE_MAX_X {
            Side::Left
        } else if i64::from(candidate.x) * RIGHT_EDGE_DENOMINATOR
            > i64::from(display_width) * RIGHT_EDGE_NUMERATOR
        {
            Side::Right
        } else {
            continue;
        };

        detected.side = Some(side);
        detected.width = detected.width.max(candidate.width);
    }

    debug!(side = ?detected.side, width = detected.width, "detected sidebar panel");
    detected
}

/// Open coordinate interval; a missing end is unbounded in that direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExclusionRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl ExclusionRange {
    /// True iff `value` lies strictly between the ends
    pub fn contains(&self, value: i32) -> bool {
        self.min.is_none_or(|min| value > min) && self.max.is_none_or(|max| value < max)
    }
}

/// Exclusion ranges for a sidebar on either edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidebarBounds {
    pub left: ExclusionRange,
    pub right: ExclusionRange,
}

impl SidebarBounds {
    pub fn for_side(&self, side: Side) -> ExclusionRange {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Effective sidebar for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SidebarState {
    /// `None` when the side is unknown; nothing overlaps an unknown sidebar
    pub side: Option<Side>,
    pub width: i32,
    pub bounds: SidebarBounds,
    pub display_width: i32,
}

impl SidebarState {
    /// Merge the detected panel with the activity overrides
    pub fn compute(detected: DetectedPanel, overrides: &OverrideEntry, display_width: i32) -> Self {
        let padding = to_coord(overrides.padding_or_zero());
        let side = overrides.side.or(detected.side);
        let width = overrides
            .width
            .map(to_coord)
            .unwrap_or_else(|| detected.width.saturating_add(padding));

        let bounds = SidebarBounds {
            left: ExclusionRange { min: None, max: Some(width) },
            right: ExclusionRange {
                min: Some(display_width.saturating_sub(width).saturating_sub(padding)),
                max: None,
            },
        };

        debug!(side = ?side, width, padding, "computed sidebar geometry");
        Self { side, width, bounds, display_width }
    }

    /// Whether `rect` reaches into the sidebar on `side`
    ///
    /// Only the active side is ever tested; the inactive side's bounds never
    /// count as an overlap.
    pub fn overlaps_on(&self, rect: &Rect, side: Side) -> bool {
        if self.side != Some(side) {
            return false;
        }

        let edge = match side {
            Side::Left => rect.left(),
            Side::Right => rect.right(),
        };
        self.bounds.for_side(side).contains(edge)
    }

    /// The side `rect` overlaps, if any
    pub fn overlaps(&self, rect: &Rect) -> Option<Side> {
        [Side::Left, Side::Right]
            .into_iter()
            .find(|side| self.overlaps_on(rect, *side))
    }
}
