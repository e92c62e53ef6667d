//! Console sinks - log all drawing and audio for demos and debugging
//!
//! Useful for running scenarios without real cube hardware and for watching
//! the runtime's side effects in the log output.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::hw::{AudioSink, Background, Sfx, Surface, VideoMode};
use crate::sets::{Side, SlotId};

/// Surface that logs every drawing call.
#[derive(Debug, Default)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Surface for ConsoleSurface {
    async fn attach(&self, slot: SlotId) -> Result<()> {
        debug!("cube {}: canvas attached", slot);
        Ok(())
    }

    async fn set_mode(&self, slot: SlotId, mode: VideoMode) -> Result<()> {
        debug!("cube {}: video mode {:?}", slot, mode);
        Ok(())
    }

    async fn clear(&self, slot: SlotId) -> Result<()> {
        debug!("cube {}: clear", slot);
        Ok(())
    }

    async fn text(&self, slot: SlotId, col: u8, row: u8, line: &str) -> Result<()> {
        debug!("cube {}: text ({},{}) {:?}", slot, col, row, line);
        Ok(())
    }

    async fn bargraph(&self, slot: SlotId, row: u8, progress: f32) -> Result<()> {
        debug!(
            "cube {}: bargraph row {} {:.0}%",
            slot,
            row,
            progress * 100.0
        );
        Ok(())
    }

    async fn set_side_bar(&self, slot: SlotId, side: Side, visible: bool) -> Result<()> {
        info!(
            "cube {}: {} bar {}",
            slot,
            side,
            if visible { "shown" } else { "hidden" }
        );
        Ok(())
    }

    async fn set_background(&self, slot: SlotId, bg: Background) -> Result<()> {
        info!("cube {}: background {:?}", slot, bg);
        Ok(())
    }
}

/// Audio sink that logs playback, alternating between two channels per
/// one-shot like the hardware mixer would.
#[derive(Debug, Default)]
pub struct ConsoleAudio {
    channel: Mutex<usize>,
}

impl ConsoleAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AudioSink for ConsoleAudio {
    async fn play(&self, clip: Sfx) -> Result<()> {
        let mut channel = self.channel.lock().await;
        info!("sfx {:?} on channel {}", clip, *channel);
        *channel = 1 - *channel;
        Ok(())
    }

    async fn music_start(&self, volume: f32) -> Result<()> {
        info!("music started at volume {:.2}", volume);
        Ok(())
    }

    async fn music_pause(&self) -> Result<()> {
        info!("music paused");
        Ok(())
    }

    async fn music_resume(&self) -> Result<()> {
        info!("music resumed");
        Ok(())
    }
}
