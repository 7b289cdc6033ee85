//! Seams between the placement policy and the window system

use anyhow::Result;
use std::future::Future;

use crate::geometry::{Display, Rect};
use crate::sidebar::DockCandidate;

/// Host window handle (an X11 window id)
pub type WindowId = u32;

/// Host identifier of the active activity (an EWMH desktop index)
pub type ProfileId = u32;

/// Snapshot of one managed window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub window: WindowId,
    pub geometry: Rect,
    pub is_dock: bool,
    pub is_normal: bool,
    pub caption: String,
}

impl ClientInfo {
    pub fn dock_candidate(&self) -> DockCandidate {
        DockCandidate {
            is_dock: self.is_dock,
            x: self.geometry.x,
            width: self.geometry.width,
        }
    }
}

/// Lifecycle events the policy reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    WindowAdded(WindowId),
    WindowRemoved(WindowId),
    MaximizeSet {
        window: WindowId,
        horizontal: bool,
        vertical: bool,
    },
    TileModeChanged(WindowId),
}

/// Messages delivered to the policy loop
#[derive(Debug)]
pub enum LoopMessage {
    Event(HostEvent),
    Shutdown,
}

/// Synchronous window-system access
pub trait Host {
    fn display(&self) -> Display;

    /// All managed windows, docks included
    fn clients(&self) -> Result<Vec<ClientInfo>>;

    /// One managed window; `None` if it went away
    fn client(&self, window: WindowId) -> Result<Option<ClientInfo>>;

    fn current_profile(&self) -> Result<ProfileId>;

    fn set_geometry(&self, window: WindowId, rect: Rect) -> Result<()>;
}

/// Translates an activity identifier into the name overrides are keyed by
///
/// The lookup may take a while; callers bound it with a timeout.
pub trait ProfileNames {
    fn profile_name(&self, id: ProfileId) -> impl Future<Output = Result<String>>;
}
