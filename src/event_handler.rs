use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::Window;

use crate::geometry::Rect;
use crate::host::{HostEvent, LoopMessage};
use crate::x11_utils::{X11Host, is_window_gone};

/// Turns raw X11 notifications into policy lifecycle events
///
/// EWMH has no "window added" or "tile changed" signal, so both are derived:
/// additions by diffing `_NET_CLIENT_LIST`, tiling from client size changes.
#[derive(Debug, Default)]
pub struct EventTranslator {
    known: HashSet<Window>,
    maximized: HashMap<Window, (bool, bool)>,
    sizes: HashMap<Window, (i32, i32)>,
}

impl EventTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking the current clients; each one is reported as added
    pub fn prime(&mut self, host: &X11Host) -> Result<Vec<HostEvent>> {
        self.sync_client_list(host)
    }

    pub fn translate(&mut self, host: &X11Host, event: Event) -> Result<Vec<HostEvent>> {
        let atoms = host.atoms();
        match event {
            Event::PropertyNotify(event)
                if event.window == host.root() && event.atom == atoms.net_client_list =>
            {
                self.sync_client_list(host)
            }
            Event::PropertyNotify(event)
                if event.atom == atoms.net_wm_state && self.known.contains(&event.window) =>
            {
                let state = match host.maximized_state(event.window) {
                    Ok(state) => state,
                    Err(err) if is_window_gone(&err) => return Ok(Vec::new()),
                    Err(err) => return Err(err),
                };
                Ok(self.maximize_changed(event.window, state).into_iter().collect())
            }
            Event::ConfigureNotify(event) if self.known.contains(&event.window) => {
                let size = (i32::from(event.width), i32::from(event.height));
                Ok(self.size_changed(event.window, size).into_iter().collect())
            }
            Event::DestroyNotify(event) if self.known.contains(&event.window) => {
                self.forget(event.window);
                Ok(vec![HostEvent::WindowRemoved(event.window)])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn sync_client_list(&mut self, host: &X11Host) -> Result<Vec<HostEvent>> {
        let clients = host.client_list()?;
        let (added, removed) = self.diff_clients(&clients);

        let mut events: Vec<HostEvent> = removed.into_iter().map(HostEvent::WindowRemoved).collect();
        events.extend(self.admit(&added, |window| {
            host.watch_client(window)?;
            Ok((host.maximized_state(window)?, host.geometry(window)?))
        }));
        Ok(events)
    }

    /// Windows new to `current` and windows gone from it; gone windows are forgotten
    fn diff_clients(&mut self, current: &[Window]) -> (Vec<Window>, Vec<Window>) {
        let listed: HashSet<Window> = current.iter().copied().collect();
        let removed: Vec<Window> = self.known.difference(&listed).copied().collect();
        for window in &removed {
            self.forget(*window);
        }

        let mut seen = HashSet::new();
        let added = current
            .iter()
            .copied()
            .filter(|window| !self.known.contains(window) && seen.insert(*window))
            .collect();
        (added, removed)
    }

    /// Track each window whose initial state can be read
    ///
    /// A window that fails is left unknown so the next client list change retries it.
    fn admit<F>(&mut self, windows: &[Window], mut read: F) -> Vec<HostEvent>
    where
        F: FnMut(Window) -> Result<((bool, bool), Rect)>,
    {
        let mut events = Vec::new();
        for &window in windows {
            match read(window) {
                Ok((state, geometry)) => {
                    self.known.insert(window);
                    self.maximized.insert(window, state);
                    self.sizes.insert(window, (geometry.width, geometry.height));
                    debug!(window, "tracking client");
                    events.push(HostEvent::WindowAdded(window));
                }
                Err(err) if is_window_gone(&err) => debug!(window, "client vanished before tracking"),
                Err(err) => warn!(window, "failed to track client: err={err:#}"),
            }
        }
        events
    }

    fn forget(&mut self, window: Window) {
        self.known.remove(&window);
        self.maximized.remove(&window);
        self.sizes.remove(&window);
    }

    fn maximize_changed(&mut self, window: Window, state: (bool, bool)) -> Option<HostEvent> {
        let previous = self.maximized.insert(window, state);
        (previous != Some(state)).then_some(HostEvent::MaximizeSet {
            window,
            horizontal: state.0,
            vertical: state.1,
        })
    }

    /// A size seen for the first time only seeds the cache
    fn size_changed(&mut self, window: Window, size: (i32, i32)) -> Option<HostEvent> {
        let previous = self.sizes.insert(window, size)?;
        (previous != size).then_some(HostEvent::TileModeChanged(window))
    }
}

/// Read X11 events on a dedicated thread and forward lifecycle events
///
/// Existing clients are reported first. A lost connection shuts the loop down.
pub fn spawn_reader(host: X11Host, tx: Sender<LoopMessage>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("x11-events".to_string())
        .spawn(move || {
            let mut translator = EventTranslator::new();
            let initial = translator
                .prime(&host)
                .inspect_err(|err| error!("failed to read initial client list: err={err:#?}"))
                .unwrap_or_default();
            for event in initial {
                if tx.blocking_send(LoopMessage::Event(event)).is_err() {
                    return;
                }
            }

            loop {
                let event = match host.conn().wait_for_event() {
                    Ok(event) => event,
                    Err(err) => {
                        error!("lost X11 connection: err={err:?}");
                        let _ = tx.blocking_send(LoopMessage::Shutdown);
                        return;
                    }
                };

                let events = translator
                    .translate(&host, event)
                    .inspect_err(|err| error!("encountered error in 'translate': err={err:#?}"))
                    .unwrap_or_default();
                for event in events {
                    if tx.blocking_send(LoopMessage::Event(event)).is_err() {
                        return;
                    }
                }
            }
        })
        .context("Failed to spawn X11 event thread")
}
