//! Wires host lifecycle events to the placement policy
//!
//! Each handler resolves the active activity's name, rebuilds the policy
//! snapshot and writes the resulting geometry back. Handlers run to
//! completion one at a time; the name lookup is the only suspension point.

use anyhow::{Context, Result};
use std::collections::HashSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::geometry::Rect;
use crate::host::{ClientInfo, Host, HostEvent, ProfileNames, WindowId};
use crate::policy::PolicySnapshot;

pub struct PolicyController<H, N> {
    host: H,
    names: N,
    config: Config,
    dry_run: bool,
    /// Windows admitted by the window-added handler
    tracked: HashSet<WindowId>,
}

impl<H: Host, N: ProfileNames> PolicyController<H, N> {
    pub fn new(host: H, names: N, config: Config, dry_run: bool) -> Self {
        Self {
            host,
            names,
            config,
            dry_run,
            tracked: HashSet::new(),
        }
    }

    pub fn is_tracked(&self, window: WindowId) -> bool {
        self.tracked.contains(&window)
    }

    pub async fn handle(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::WindowAdded(window) => self.window_added(window).await,
            HostEvent::WindowRemoved(window) => {
                self.tracked.remove(&window);
                Ok(())
            }
            HostEvent::MaximizeSet { window, horizontal, vertical } => {
                self.maximize_set(window, horizontal, vertical).await
            }
            HostEvent::TileModeChanged(window) => self.tile_mode_changed(window).await,
        }
    }

    async fn window_added(&mut self, window: WindowId) -> Result<()> {
        let Some(client) = self.host.client(window)? else {
            return Ok(());
        };
        if !client.is_normal {
            return Ok(());
        }
        if self.config.is_ignored(&client.caption) {
            debug!(window, caption = %client.caption, "ignoring window by title");
            return Ok(());
        }

        let Some(snapshot) = self.snapshot().await? else {
            return Ok(());
        };
        self.tracked.insert(window);

        if let Some(rect) = snapshot.place(client.geometry) {
            self.apply(&client, rect)?;
        }
        Ok(())
    }

    async fn maximize_set(&mut self, window: WindowId, horizontal: bool, vertical: bool) -> Result<()> {
        if !horizontal || !vertical {
            return Ok(());
        }
        let Some(client) = self.host.client(window)? else {
            return Ok(());
        };
        if self.config.is_ignored(&client.caption) {
            debug!(window, caption = %client.caption, "ignoring window by title");
            return Ok(());
        }

        let Some(snapshot) = self.snapshot().await? else {
            return Ok(());
        };
        let rect = snapshot.maximize(client.geometry);
        self.apply(&client, rect)
    }

    async fn tile_mode_changed(&mut self, window: WindowId) -> Result<()> {
        if !self.config.tile_heuristic || !self.is_tracked(window) {
            return Ok(());
        }
        let Some(client) = self.host.client(window)? else {
            return Ok(());
        };

        let Some(snapshot) = self.snapshot().await? else {
            return Ok(());
        };
        if let Some(rect) = snapshot.retile(client.geometry) {
            self.apply(&client, rect)?;
        }
        Ok(())
    }

    /// Build the policy for the current activity
    /// Returns `None` when the activity name can't be resolved in time
    pub async fn snapshot(&self) -> Result<Option<PolicySnapshot>> {
        let Some(profile) = self.resolve_profile().await? else {
            return Ok(None);
        };
        let clients = self.host.clients().context("Failed to list clients")?;
        Ok(Some(PolicySnapshot::build(
            &profile,
            &clients,
            &self.config.activity_overrides,
            self.host.display(),
        )))
    }

    async fn resolve_profile(&self) -> Result<Option<String>> {
        let id = self.host.current_profile().context("Failed to read current activity")?;
        match timeout(self.config.resolve_timeout(), self.names.profile_name(id)).await {
            Ok(Ok(name)) => {
                debug!(id, profile = %name, "resolved activity name");
                Ok(Some(name))
            }
            Ok(Err(err)) => {
                warn!(id, error = %err, "activity name lookup failed, skipping event");
                Ok(None)
            }
            Err(_) => {
                debug!(id, timeout_ms = self.config.name_resolution_timeout_ms, "activity name lookup timed out, skipping event");
                Ok(None)
            }
        }
    }

    fn apply(&self, client: &ClientInfo, rect: Rect) -> Result<()> {
        if rect == client.geometry {
            return Ok(());
        }
        if self.dry_run {
            info!(window = client.window, from = ?client.geometry, to = ?rect, "dry run: would move window");
            return Ok(());
        }

        self.host
            .set_geometry(client.window, rect)
            .with_context(|| format!("Failed to set geometry of window {}", client.window))?;
        info!(window = client.window, caption = %client.caption, x = rect.x, y = rect.y, width = rect.width, height = rect.height, "moved window");
        Ok(())
    }
}
