use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use crate::constants::{ewmh, moveresize};
use crate::geometry::{Display, Rect};
use crate::host::{ClientInfo, Host, ProfileId, ProfileNames, WindowId};

/// Pre-cached X11 atoms to avoid repeated roundtrips
#[derive(Debug, Clone, Copy)]
pub struct CachedAtoms {
    pub net_client_list: Atom,
    pub net_wm_window_type: Atom,
    pub net_wm_window_type_dock: Atom,
    pub net_wm_window_type_normal: Atom,
    pub net_wm_name: Atom,
    pub utf8_string: Atom,
    pub wm_name: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_current_desktop: Atom,
    pub net_desktop_names: Atom,
    pub net_moveresize_window: Atom,
}

fn intern(conn: &RustConnection, name: &[u8]) -> Result<Atom> {
    let label = String::from_utf8_lossy(name);
    Ok(conn
        .intern_atom(false, name)
        .with_context(|| format!("Failed to intern {label} atom"))?
        .reply()
        .with_context(|| format!("Failed to get reply for {label} atom"))?
        .atom)
}

impl CachedAtoms {
    pub fn new(conn: &RustConnection) -> Result<Self> {
        // Do all intern_atom roundtrips once at startup
        Ok(Self {
            net_client_list: intern(conn, ewmh::NET_CLIENT_LIST)?,
            net_wm_window_type: intern(conn, ewmh::NET_WM_WINDOW_TYPE)?,
            net_wm_window_type_dock: intern(conn, ewmh::NET_WM_WINDOW_TYPE_DOCK)?,
            net_wm_window_type_normal: intern(conn, ewmh::NET_WM_WINDOW_TYPE_NORMAL)?,
            net_wm_name: intern(conn, ewmh::NET_WM_NAME)?,
            utf8_string: intern(conn, ewmh::UTF8_STRING)?,
            wm_name: intern(conn, ewmh::WM_NAME)?,
            net_wm_state: intern(conn, ewmh::NET_WM_STATE)?,
            net_wm_state_maximized_horz: intern(conn, ewmh::NET_WM_STATE_MAXIMIZED_HORZ)?,
            net_wm_state_maximized_vert: intern(conn, ewmh::NET_WM_STATE_MAXIMIZED_VERT)?,
            net_current_desktop: intern(conn, ewmh::NET_CURRENT_DESKTOP)?,
            net_desktop_names: intern(conn, ewmh::NET_DESKTOP_NAMES)?,
            net_moveresize_window: intern(conn, ewmh::NET_MOVERESIZE_WINDOW)?,
        })
    }
}

/// Whether `err` comes from a window that no longer exists
pub fn is_window_gone(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<ReplyError>(),
            Some(ReplyError::X11Error(x11_error))
                if matches!(x11_error.error_kind, ErrorKind::Window | ErrorKind::Drawable)
        )
    })
}

/// Split a `_NET_DESKTOP_NAMES` value into one name per desktop
pub fn parse_desktop_names(value: &[u8]) -> Vec<String> {
    let value = value.strip_suffix(&[0]).unwrap_or(value);
    if value.is_empty() {
        return Vec::new();
    }
    value
        .split(|byte| *byte == 0)
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect()
}

/// Current desktop index, treating an unset `_NET_CURRENT_DESKTOP` as the first desktop
pub fn desktop_or_first(value: Option<u32>) -> ProfileId {
    value.unwrap_or_else(|| {
        debug!("_NET_CURRENT_DESKTOP is not set, assuming desktop 0");
        0
    })
}

/// EWMH window manager as seen through one X11 connection
#[derive(Clone)]
pub struct X11Host {
    conn: Arc<RustConnection>,
    root: Window,
    display: Display,
    atoms: CachedAtoms,
}

impl X11Host {
    pub fn connect(display_name: Option<&str>) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(display_name).context("Failed to connect to X11 server")?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .with_context(|| format!("X11 server has no screen {screen_num}"))?;
        let root = screen.root;
        let display = Display::new(i32::from(screen.width_in_pixels), i32::from(screen.height_in_pixels));
        let (width, height) = (display.width, display.height);
        info!("successfully connected to x11: screen={screen_num}, dimensions={width}x{height}");

        let atoms = CachedAtoms::new(&conn)?;
        Ok(Self {
            conn: Arc::new(conn),
            root,
            display,
            atoms,
        })
    }

    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    pub fn atoms(&self) -> &CachedAtoms {
        &self.atoms
    }

    pub fn root(&self) -> Window {
        self.root
    }

    /// Subscribe to client list changes on the root window
    pub fn watch_root(&self) -> Result<()> {
        self.conn
            .change_window_attributes(
                self.root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::PROPERTY_CHANGE),
            )
            .context("Failed to select PropertyChange on root window")?;
        self.conn.flush().context("Failed to flush X11 connection")?;
        Ok(())
    }

    /// Subscribe to state and geometry changes of a client
    pub fn watch_client(&self, window: Window) -> Result<()> {
        self.conn
            .change_window_attributes(
                window,
                &ChangeWindowAttributesAux::new()
                    .event_mask(EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY),
            )
            .with_context(|| format!("Failed to select events on window {}", window))?;
        self.conn.flush().context("Failed to flush X11 connection")?;
        Ok(())
    }

    fn property(&self, window: Window, property: Atom, type_: impl Into<Atom>) -> Result<GetPropertyReply> {
        self.conn
            .get_property(false, window, property, type_, 0, ewmh::PROPERTY_READ_LENGTH)
            .with_context(|| format!("Failed to query property {} on window {}", property, window))?
            .reply()
            .with_context(|| format!("Failed to get property {} reply for window {}", property, window))
    }

    fn atom_list(&self, window: Window, property: Atom) -> Result<Vec<Atom>> {
        let reply = self.property(window, property, AtomEnum::ATOM)?;
        Ok(reply.value32().map(|atoms| atoms.collect()).unwrap_or_default())
    }

    pub fn client_list(&self) -> Result<Vec<Window>> {
        let reply = self
            .conn
            .get_property(false, self.root, self.atoms.net_client_list, AtomEnum::WINDOW, 0, u32::MAX)
            .context("Failed to query _NET_CLIENT_LIST")?
            .reply()
            .context("Failed to get reply for _NET_CLIENT_LIST query")?;
        let windows = reply
            .value32()
            .ok_or_else(|| anyhow::anyhow!("Invalid return from _NET_CLIENT_LIST"))?
            .collect();
        Ok(windows)
    }

    /// (horizontal, vertical) maximized flags from `_NET_WM_STATE`
    pub fn maximized_state(&self, window: Window) -> Result<(bool, bool)> {
        let state = self.atom_list(window, self.atoms.net_wm_state)?;
        Ok((
            state.contains(&self.atoms.net_wm_state_maximized_horz),
            state.contains(&self.atoms.net_wm_state_maximized_vert),
        ))
    }

    fn caption(&self, window: Window) -> Result<String> {
        let net_name = self.property(window, self.atoms.net_wm_name, self.atoms.utf8_string)?;
        if !net_name.value.is_empty() {
            return Ok(String::from_utf8_lossy(&net_name.value).into_owned());
        }
        let name = self.property(window, self.atoms.wm_name, AtomEnum::STRING)?;
        Ok(String::from_utf8_lossy(&name.value).into_owned())
    }

    /// Client area in root coordinates (frame decorations excluded)
    pub fn geometry(&self, window: Window) -> Result<Rect> {
        let geometry = self
            .conn
            .get_geometry(window)
            .with_context(|| format!("Failed to query geometry of window {}", window))?
            .reply()
            .with_context(|| format!("Failed to get geometry reply for window {}", window))?;
        let origin = self
            .conn
            .translate_coordinates(window, self.root, 0, 0)
            .with_context(|| format!("Failed to translate coordinates of window {}", window))?
            .reply()
            .with_context(|| format!("Failed to get translate reply for window {}", window))?;

        Ok(Rect::new(
            i32::from(origin.dst_x),
            i32::from(origin.dst_y),
            i32::from(geometry.width),
            i32::from(geometry.height),
        ))
    }

    fn read_client(&self, window: Window) -> Result<ClientInfo> {
        let window_type = self.atom_list(window, self.atoms.net_wm_window_type)?;
        let is_dock = window_type.contains(&self.atoms.net_wm_window_type_dock);
        // EWMH: managed windows without a type are normal windows
        let is_normal = window_type.is_empty() || window_type.contains(&self.atoms.net_wm_window_type_normal);

        Ok(ClientInfo {
            window,
            geometry: self.geometry(window)?,
            is_dock,
            is_normal,
            caption: self.caption(window)?,
        })
    }

    /// Name of desktop `id`, or "Desktop N" when the window manager has none
    pub fn desktop_name(&self, id: ProfileId) -> Result<String> {
        let reply = self.property(self.root, self.atoms.net_desktop_names, self.atoms.utf8_string)?;
        let names = parse_desktop_names(&reply.value);
        let name = usize::try_from(id)
            .ok()
            .and_then(|index| names.get(index))
            .filter(|name| !name.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Desktop {}", u64::from(id) + 1));
        Ok(name)
    }
}

impl Host for X11Host {
    fn display(&self) -> Display {
        self.display
    }

    fn clients(&self) -> Result<Vec<ClientInfo>> {
        let mut clients = Vec::new();
        for window in self.client_list()? {
            match self.read_client(window) {
                Ok(client) => clients.push(client),
                Err(err) if is_window_gone(&err) => debug!(window, "client vanished while listing"),
                Err(err) => return Err(err),
            }
        }
        Ok(clients)
    }

    fn client(&self, window: WindowId) -> Result<Option<ClientInfo>> {
        match self.read_client(window) {
            Ok(client) => Ok(Some(client)),
            Err(err) if is_window_gone(&err) => {
                debug!(window, "client vanished before it could be handled");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn current_profile(&self) -> Result<ProfileId> {
        let reply = self.property(self.root, self.atoms.net_current_desktop, AtomEnum::CARDINAL)?;
        Ok(desktop_or_first(reply.value32().and_then(|mut values| values.next())))
    }

    /// Move/resize through `_NET_MOVERESIZE_WINDOW` so the window manager applies it
    fn set_geometry(&self, window: WindowId, rect: Rect) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: self.atoms.net_moveresize_window,
            data: ClientMessageData::from([
                moveresize::GRAVITY_STATIC | moveresize::ALL_FIELDS | moveresize::SOURCE_PAGER,
                rect.x as u32, // Signed coordinates travel as two's complement
                rect.y as u32,
                rect.width.max(1) as u32,
                rect.height.max(1) as u32,
            ]),
        };

        self.conn
            .send_event(
                false,
                self.root,
                EventMask::SUBSTRUCTURE_NOTIFY | EventMask::SUBSTRUCTURE_REDIRECT,
                event,
            )
            .with_context(|| format!("Failed to send _NET_MOVERESIZE_WINDOW for window {}", window))?;
        self.conn
            .flush()
            .context("Failed to flush X11 connection after moving window")?;
        Ok(())
    }
}

impl ProfileNames for X11Host {
    /// Desktop names are read on the blocking pool so a stalled server can't wedge the loop
    async fn profile_name(&self, id: ProfileId) -> Result<String> {
        let host = self.clone();
        tokio::task::spawn_blocking(move || host.desktop_name(id))
            .await
            .context("Desktop name lookup task failed")?
    }
}
