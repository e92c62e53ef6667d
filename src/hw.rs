//! Hardware collaborator contracts
//!
//! The runtime core touches the outside world only through these traits:
//! the per-cube drawing surface, the audio sink, and the asset loader. All
//! methods take `&self` so implementations live behind `Arc<dyn ...>`;
//! implementations use interior mutability for their own state.

use anyhow::Result;
use async_trait::async_trait;

use crate::sets::{CubeSet, Side, SlotId};

pub mod console;
pub mod sim;

pub use console::{ConsoleAudio, ConsoleSurface};
pub use sim::{Scenario, ScenarioPlayer, SimLoader};

/// Video mode of a cube's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoMode {
    /// System font only, used for the loading placeholder.
    Placeholder,
    /// Full scene with background and side-bar sprites.
    Scene,
}

/// Background image selection for the active scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// No neighbors touching: the character sleeps.
    Asleep,
    /// At least one side bar showing: the character is awake.
    Awake,
}

/// One-shot sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sfx {
    /// Played once per asset-load phase, when new cubes join.
    Connect,
    /// A neighbor edge became visible.
    Attach,
    /// A neighbor edge disappeared.
    Detach,
}

/// Per-cube canvas, a pure side-effect sink.
///
/// Text goes to fixed character-cell coordinates; the surface does not keep
/// layout state of its own.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Bind the canvas to a freshly connected cube.
    async fn attach(&self, slot: SlotId) -> Result<()>;

    async fn set_mode(&self, slot: SlotId, mode: VideoMode) -> Result<()>;

    /// Blank the whole canvas.
    async fn clear(&self, slot: SlotId) -> Result<()>;

    /// Draw a text line at (col, row).
    async fn text(&self, slot: SlotId, col: u8, row: u8, line: &str) -> Result<()>;

    /// Draw a horizontal progress bar at `row`, `progress` in [0, 1].
    async fn bargraph(&self, slot: SlotId, row: u8, progress: f32) -> Result<()>;

    /// Show or hide the bar sprite along one side.
    async fn set_side_bar(&self, slot: SlotId, side: Side, visible: bool) -> Result<()>;

    async fn set_background(&self, slot: SlotId, bg: Background) -> Result<()>;
}

/// One-shot and background audio.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play a one-shot clip. Implementations alternate channels so that
    /// overlapping cues do not cut each other off.
    async fn play(&self, clip: Sfx) -> Result<()>;

    async fn music_start(&self, volume: f32) -> Result<()>;

    /// Pause the background track for the duration of an asset load.
    async fn music_pause(&self) -> Result<()>;

    async fn music_resume(&self) -> Result<()>;
}

/// Asset transfer into cube flash, driven to completion by the gate.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Begin a load covering (at least) the given slots.
    async fn start(&self, slots: CubeSet) -> Result<()>;

    async fn is_complete(&self) -> bool;

    /// Per-cube transfer progress in [0, 1].
    async fn progress(&self, slot: SlotId) -> f32;

    /// Settle the transfer after `is_complete` reports true.
    async fn finish(&self) -> Result<()>;
}
