//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// EWMH atom names interned once at startup
pub mod ewmh {
    pub const NET_CLIENT_LIST: &[u8] = b"_NET_CLIENT_LIST";
    pub const NET_WM_WINDOW_TYPE: &[u8] = b"_NET_WM_WINDOW_TYPE";
    pub const NET_WM_WINDOW_TYPE_DOCK: &[u8] = b"_NET_WM_WINDOW_TYPE_DOCK";
    pub const NET_WM_WINDOW_TYPE_NORMAL: &[u8] = b"_NET_WM_WINDOW_TYPE_NORMAL";
    pub const NET_WM_NAME: &[u8] = b"_NET_WM_NAME";
    pub const UTF8_STRING: &[u8] = b"UTF8_STRING";
    pub const WM_NAME: &[u8] = b"WM_NAME";
    pub const NET_WM_STATE: &[u8] = b"_NET_WM_STATE";
    pub const NET_WM_STATE_MAXIMIZED_HORZ: &[u8] = b"_NET_WM_STATE_MAXIMIZED_HORZ";
    pub const NET_WM_STATE_MAXIMIZED_VERT: &[u8] = b"_NET_WM_STATE_MAXIMIZED_VERT";
    pub const NET_CURRENT_DESKTOP: &[u8] = b"_NET_CURRENT_DESKTOP";
    pub const NET_DESKTOP_NAMES: &[u8] = b"_NET_DESKTOP_NAMES";
    pub const NET_MOVERESIZE_WINDOW: &[u8] = b"_NET_MOVERESIZE_WINDOW";

    /// Upper bound (in 32-bit units) for property reads
    pub const PROPERTY_READ_LENGTH: u32 = 1024;
}

/// `_NET_MOVERESIZE_WINDOW` request flags (data.l[0])
pub mod moveresize {
    /// Static gravity: x/y address the client window itself, not its frame
    pub const GRAVITY_STATIC: u32 = 10;

    /// Bits 8-11: x, y, width and height are all present
    pub const ALL_FIELDS: u32 = 0xF << 8;

    /// Bits 12-13: source indication 2 (pager/direct user action)
    pub const SOURCE_PAGER: u32 = 2 << 12;
}

/// Tolerances used to guess the sidebar and tile state from bare geometry
pub mod heuristics {
    /// A dock whose x-origin is below this is considered to hug the left edge
    pub const LEFT_EDGE_MAX_X: i32 = 10;

    /// A dock whose x-origin is beyond NUMERATOR/DENOMINATOR of the display width
    /// hugs the right edge (80%)
    pub const RIGHT_EDGE_NUMERATOR: i64 = 4;
    pub const RIGHT_EDGE_DENOMINATOR: i64 = 5;

    /// Max distance between a window's width and half the display width for a
    /// tile-changed notification to count as "just tiled"
    pub const TILE_WIDTH_TOLERANCE: f64 = 1.0;

    /// A tiled window whose x is closer than this to the display midpoint was
    /// tiled to the right half
    pub const RIGHT_TILE_X_TOLERANCE: f64 = 2.0;
}

/// Config file location and well-known profile names
pub mod config {
    /// Directory under the XDG config dir
    pub const APP_DIR: &str = "sidebar-keeper";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    /// Override entry used when the active profile has no entry of its own
    pub const FALLBACK_PROFILE: &str = "Fallback";

    /// Profile shipped by default on most desktops
    pub const DEFAULT_PROFILE: &str = "Default";
}

/// Config validation ranges
pub mod validation {
    pub const MIN_RESOLVE_TIMEOUT_MS: u64 = 50;
    pub const MAX_RESOLVE_TIMEOUT_MS: u64 = 60_000;
}

/// Event loop sizing and shutdown
pub mod runtime {
    /// Lifecycle events buffered between the X11 reader thread and the policy loop
    pub const EVENT_QUEUE_SIZE: usize = 256;

    /// How long shutdown waits for blocking lookups still in flight
    pub const SHUTDOWN_TIMEOUT_MS: u64 = 500;
}
