//! Protocol limits and persisted per-player settings.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The plan encoder stops adding entries once the payload has grown past
/// this; the entry that crossed the line is kept.
pub const PLAN_PACKET_SOFT_LIMIT: usize = 4000;

/// The host drops client plan payloads longer than this outright.
pub const PLAN_PACKET_HARD_LIMIT: usize = 5000;

/// Quiet window between engine-level resyncs.
pub const RESYNC_QUIET: Duration = Duration::from_millis(5100);

/// Chat command that asks the host for an engine-level state resync.
pub const RESYNC_COMMAND: &str = "/sync";

/// Update cadence of the service-style run loops, one frame at ~60 fps.
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Screen corner the resource overlay docks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayCorner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Per-player preferences, persisted as JSON. Unknown or missing fields
/// fall back to the defaults so old files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show pause-change toasts.
    pub toasts: bool,
    /// Host only: accept pause requests from non-admin peers.
    pub allow_any_pause: bool,
    /// Request an engine resync when the game pauses.
    pub resync_on_pause: bool,
    /// Request an engine resync when the game unpauses.
    pub resync_on_unpause: bool,
    /// Defer resyncs that fall inside the quiet window instead of
    /// dropping them.
    pub schedule_resync: bool,
    /// Render other peers' plan queues in the overlay.
    pub show_other_previews: bool,
    /// Label overlay sections with peer names.
    pub show_preview_names: bool,
    pub overlay_corner: OverlayCorner,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            toasts: true,
            allow_any_pause: false,
            resync_on_pause: false,
            resync_on_unpause: false,
            schedule_resync: false,
            show_other_previews: true,
            show_preview_names: true,
            overlay_corner: OverlayCorner::TopLeft,
        }
    }
}

impl Settings {
    /// Whether a resync should follow a transition into the given state.
    pub fn resync_on(&self, paused: bool) -> bool {
        if paused {
            self.resync_on_pause
        } else {
            self.resync_on_unpause
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
