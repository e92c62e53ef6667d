//! Runtime module - core orchestration of cube lifecycle and adjacency
//!
//! The runtime owns:
//! - The membership set tracker (new/lost/reconnected/dirty/active)
//! - The symmetric neighbor table mirrored from hardware events
//! - The asset-readiness gate guarding entry into the active scene
//! - The side-bar visibility policy with its audio-cue dedup
//!
//! Everything runs on one logical thread of control: events are pumped
//! synchronously inside the frame loop, so per-slot state needs no locking.
//! The only suspension point is the gate's poll loop, which keeps pumping
//! the same event channel while it waits.

mod frame;
mod gate;
mod handlers;
mod membership;
mod sidebar;


use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::AppConfig;
use crate::events::CubeEvent;
use crate::hw::{AssetLoader, AudioSink, Surface};
use crate::neighborhood::NeighborTable;
use crate::sets::SlotId;

pub use membership::{Membership, SensorCounters};
pub use sidebar::SideBars;

/// The frame loop and all per-cube state, single logical thread of control.
pub struct Runtime {
    pub(crate) capacity: usize,
    pub(crate) membership: Membership,
    pub(crate) neighbors: NeighborTable,
    pub(crate) side_bars: SideBars,
    pub(crate) surface: Arc<dyn Surface>,
    pub(crate) audio: Arc<dyn AudioSink>,
    pub(crate) loader: Arc<dyn AssetLoader>,
    pub(crate) events: mpsc::Receiver<CubeEvent>,
    pub(crate) loader_poll: Duration,
    pub(crate) frame: u64,
}

impl Runtime {
    pub fn new(
        config: &AppConfig,
        surface: Arc<dyn Surface>,
        audio: Arc<dyn AudioSink>,
        loader: Arc<dyn AssetLoader>,
        events: mpsc::Receiver<CubeEvent>,
    ) -> Self {
        Self {
            capacity: config.capacity,
            membership: Membership::new(config.capacity),
            neighbors: NeighborTable::new(config.capacity),
            side_bars: SideBars::new(config.capacity),
            surface,
            audio,
            loader,
            events,
            loader_poll: Duration::from_millis(config.timing.loader_poll_ms),
            frame: 0,
        }
    }

    /// Bring up cubes that are already connected when the demo starts. They
    /// carry their assets from the bootstrap image, so they skip the gate and
    /// go straight to the active scene.
    pub async fn startup(&mut self, initial: &[usize], music_volume: Option<f32>) -> Result<()> {
        if let Some(volume) = music_volume {
            self.audio.music_start(volume).await?;
        }
        for &raw in initial {
            let slot = self.expect_slot(raw, "startup");
            self.surface.attach(slot).await?;
            self.activate(slot).await?;
        }
        if !initial.is_empty() {
            info!("{} cube(s) present at startup", initial.len());
        }
        Ok(())
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn side_bars(&self) -> &SideBars {
        &self.side_bars
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Lifecycle events always carry a real slot; anything else is a bug in
    /// the event source, not a condition to recover from.
    pub(crate) fn expect_slot(&self, raw: usize, what: &str) -> SlotId {
        SlotId::new(raw, self.capacity)
            .unwrap_or_else(|| panic!("{} references slot {} outside capacity {}", what, raw, self.capacity))
    }
}
