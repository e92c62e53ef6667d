//! Frame loop and activation pass

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info};

use crate::hw::{Background, VideoMode};
use crate::sets::{Side, SlotId};

use super::Runtime;

impl Runtime {
    /// Run frames forever (or until `max_frames`), terminating on the
    /// shutdown future. Collaborator failures propagate out as fatal.
    pub async fn run(
        mut self,
        frame_interval: Duration,
        max_frames: Option<u64>,
        shutdown: impl std::future::Future<Output = ()>,
    ) -> Result<()> {
        tokio::pin!(shutdown);
        let mut ticker = tokio::time::interval(frame_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_frame().await?;
                    if max_frames.is_some_and(|n| self.frame >= n) {
                        info!("reached frame {}, stopping", self.frame);
                        break;
                    }
                }
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping frame loop");
                    break;
                }
            }
        }
        Ok(())
    }

    /// One frame: wipe the transient sets, replay this frame's events, run
    /// the asset gate if anything new arrived, then activate every cube
    /// still marked dirty.
    pub async fn run_frame(&mut self) -> Result<()> {
        self.frame += 1;
        self.membership.begin_frame();

        self.pump_events().await?;

        if !self.membership.pending().is_empty() {
            self.run_gate().await?;
        }

        // Current dirty membership, not a pre-gate snapshot: anything that
        // disconnected while the gate was loading has already left the set.
        for slot in self.membership.dirty_cubes.iter() {
            self.activate(slot).await?;
        }
        Ok(())
    }

    /// Drain and dispatch every event currently queued. Used by the outer
    /// frame loop and re-entered by the gate's poll loop.
    pub(crate) async fn pump_events(&mut self) -> Result<()> {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.dispatch(event).await?,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
    }

    /// Move a cube into the active scene: full repaint, then side bars
    /// initialized from the live neighbor table.
    pub(crate) async fn activate(&mut self, slot: SlotId) -> Result<()> {
        debug!("activating cube {}", slot);
        self.membership.mark_active(slot);

        self.surface.set_mode(slot, VideoMode::Scene).await?;
        self.surface.clear(slot).await?;
        self.surface
            .set_background(slot, Background::Asleep)
            .await?;
        self.draw_identity(slot).await?;
        self.draw_neighbor_status(slot).await?;

        self.side_bars.reset(slot);
        for side in Side::ALL {
            if self.neighbors.has_edge(slot, side) {
                self.show_bar(slot, side).await?;
            } else {
                self.hide_bar(slot, side).await?;
            }
        }
        Ok(())
    }
}
