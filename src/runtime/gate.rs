//! Asset-readiness gate
//!
//! Blocking phase between a frame's events and its activation pass: every
//! cube in `new ∪ reconnected` must have its assets in flash before it may
//! join the active scene. The wait is a nested pump — each poll iteration
//! re-enters the same event primitive the outer frame loop uses, so
//! connects and disconnects keep registering while the transfer runs.

use anyhow::Result;
use tracing::{debug, info};

use crate::hw::Sfx;

use super::handlers::ROW_PROGRESS;
use super::Runtime;

impl Runtime {
    /// Run one Idle -> Loading -> Idle cycle. Callers enter only when the
    /// pending union is non-empty.
    ///
    /// The background track is paused for the duration so the transfer I/O
    /// cannot glitch it, and the connect cue plays once per gate entry, not
    /// once per cube. Cubes that disconnect mid-load drop out of the pending
    /// union through the ordinary disconnect handler, which also removes
    /// them from `dirty` — the post-gate activation pass therefore never
    /// trusts the membership seen at entry.
    pub(crate) async fn run_gate(&mut self) -> Result<()> {
        let entered_with = self.membership.pending();
        debug_assert!(!entered_with.is_empty());
        info!(
            "asset gate entered for {} cube(s) on frame {}",
            entered_with.len(),
            self.frame
        );

        self.audio.music_pause().await?;
        self.audio.play(Sfx::Connect).await?;
        self.loader.start(entered_with).await?;

        while !self.loader.is_complete().await {
            // Progress feedback for whatever is pending *now*, which may
            // have shrunk (disconnects) or grown (late connects) since entry.
            for slot in self.membership.pending().iter() {
                let progress = self.loader.progress(slot).await;
                self.surface.bargraph(slot, ROW_PROGRESS, progress).await?;
            }

            self.pump_events().await?;
            tokio::time::sleep(self.loader_poll).await;
        }

        self.loader.finish().await?;
        self.audio.music_resume().await?;
        debug!("asset gate complete on frame {}", self.frame);
        Ok(())
    }
}
