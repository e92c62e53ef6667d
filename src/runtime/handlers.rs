//! Hardware event handlers
//!
//! Each handler runs synchronously inside the frame pump. Lifecycle events
//! mutate the membership sets; neighbor events mirror the adjacency table and
//! drive the side-bar policy; sensor events update counters and status text.
//! Sensor and neighbor events re-validate the slot at consumption time, since
//! the cube may already have disconnected by the time they are processed.

use anyhow::Result;
use tracing::{debug, info};

use crate::events::CubeEvent;
use crate::hw::{Sfx, VideoMode};
use crate::sets::{Side, SlotId};

use super::Runtime;

// Fixed character-cell rows of the status layout.
const ROW_IDENTITY: u8 = 2;
const ROW_NEIGHBORS: u8 = 6;
const ROW_TOUCH: u8 = 9;
const ROW_ACCEL: u8 = 10;
const ROW_BATTERY: u8 = 13;
pub(crate) const ROW_PROGRESS: u8 = 4;

impl Runtime {
    pub(crate) async fn dispatch(&mut self, event: CubeEvent) -> Result<()> {
        debug!("event: {:?}", event);
        match event {
            CubeEvent::Connect { slot } => self.on_connect(slot).await,
            CubeEvent::Disconnect { slot } => self.on_disconnect(slot).await,
            CubeEvent::Refresh { slot } => self.on_refresh(slot),
            CubeEvent::NeighborAdd { a, side_a, b, side_b } => {
                self.on_neighbor_add(a, side_a, b, side_b).await
            }
            CubeEvent::NeighborRemove { a, side_a, b, side_b } => {
                self.on_neighbor_remove(a, side_a, b, side_b).await
            }
            CubeEvent::Touch { slot, pressed } => self.on_touch(slot, pressed).await,
            CubeEvent::Accel { slot, x, y, z } => self.on_accel(slot, x, y, z).await,
            CubeEvent::Battery { slot, level } => self.on_battery(slot, level).await,
        }
    }

    /// Connect: classify new vs reconnected, then put up the loading
    /// placeholder right away — assets are not in flash yet, so only the
    /// system font is available.
    async fn on_connect(&mut self, raw: usize) -> Result<()> {
        let slot = self.expect_slot(raw, "connect event");
        info!("cube {} connected", slot);
        self.membership.on_connect(slot);

        self.surface.attach(slot).await?;
        self.surface.set_mode(slot, VideoMode::Placeholder).await?;
        self.surface.clear(slot).await?;
        self.surface.text(slot, 1, 1, "Hold on!").await?;
        self.surface.text(slot, 1, 14, "Adding cube...").await?;
        Ok(())
    }

    async fn on_disconnect(&mut self, raw: usize) -> Result<()> {
        let slot = self.expect_slot(raw, "disconnect event");
        info!("cube {} disconnected", slot);
        self.membership.on_disconnect(slot);
        self.neighbors.detach_all(slot);
        Ok(())
    }

    fn on_refresh(&mut self, raw: usize) -> Result<()> {
        let slot = self.expect_slot(raw, "refresh event");
        debug!("cube {} refresh requested", slot);
        self.membership.on_refresh(slot);
        Ok(())
    }

    /// Neighbor add: mirror the edge, bump counters on occupied endpoints,
    /// then run the bar policy on active endpoints. The cue fires once per
    /// event if *either* endpoint's rendered state changed — deliberately a
    /// non-short-circuiting OR, both bars must be evaluated.
    async fn on_neighbor_add(
        &mut self,
        a: usize,
        side_a: Side,
        b: usize,
        side_b: Side,
    ) -> Result<()> {
        debug!("neighbor add: {}:{} - {}:{}", a, side_a, b, side_b);
        self.neighbors.add_edge(a, side_a, b, side_b);

        for &(raw, _) in &[(a, side_a), (b, side_b)] {
            if let Some(slot) = SlotId::new(raw, self.capacity) {
                if self.membership.is_occupied(slot) {
                    self.membership.counters_mut(slot).neighbor_add += 1;
                    self.draw_neighbor_status(slot).await?;
                }
            }
        }

        let mut cue = false;
        cue |= self.show_endpoint(a, side_a).await?;
        cue |= self.show_endpoint(b, side_b).await?;
        if cue {
            self.audio.play(Sfx::Attach).await?;
        }
        Ok(())
    }

    /// Mirror of neighbor add.
    async fn on_neighbor_remove(
        &mut self,
        a: usize,
        side_a: Side,
        b: usize,
        side_b: Side,
    ) -> Result<()> {
        debug!("neighbor remove: {}:{} - {}:{}", a, side_a, b, side_b);
        self.neighbors.remove_edge(a, side_a, b, side_b);

        for &(raw, _) in &[(a, side_a), (b, side_b)] {
            if let Some(slot) = SlotId::new(raw, self.capacity) {
                if self.membership.is_occupied(slot) {
                    self.membership.counters_mut(slot).neighbor_remove += 1;
                    self.draw_neighbor_status(slot).await?;
                }
            }
        }

        let mut cue = false;
        cue |= self.hide_endpoint(a, side_a).await?;
        cue |= self.hide_endpoint(b, side_b).await?;
        if cue {
            self.audio.play(Sfx::Detach).await?;
        }
        Ok(())
    }

    /// Bars only move on active cubes; loading cubes and anchors are ignored
    /// and their visibility state stays untouched.
    async fn show_endpoint(&mut self, raw: usize, side: Side) -> Result<bool> {
        match SlotId::new(raw, self.capacity) {
            Some(slot) if self.membership.is_active(slot) => self.show_bar(slot, side).await,
            _ => Ok(false),
        }
    }

    async fn hide_endpoint(&mut self, raw: usize, side: Side) -> Result<bool> {
        match SlotId::new(raw, self.capacity) {
            Some(slot) if self.membership.is_active(slot) => self.hide_bar(slot, side).await,
            _ => Ok(false),
        }
    }

    async fn on_touch(&mut self, raw: usize, pressed: bool) -> Result<()> {
        let Some(slot) = SlotId::new(raw, self.capacity) else {
            return Ok(());
        };
        if !self.membership.is_occupied(slot) {
            return Ok(());
        }
        self.membership.counters_mut(slot).touch += 1;
        let count = self.membership.counters(slot).touch;
        debug!("touch on cube {}, pressed={}", slot, pressed);
        let line = format!("touch: {} ({})", pressed as u8, count);
        self.surface.text(slot, 1, ROW_TOUCH, &line).await
    }

    async fn on_accel(&mut self, raw: usize, x: i8, y: i8, z: i8) -> Result<()> {
        let Some(slot) = SlotId::new(raw, self.capacity) else {
            return Ok(());
        };
        if !self.membership.is_occupied(slot) {
            return Ok(());
        }
        let line = format!("acc: {:4} {:4} {:4}", x, y, z);
        self.surface.text(slot, 1, ROW_ACCEL, &line).await
    }

    async fn on_battery(&mut self, raw: usize, level: f32) -> Result<()> {
        let Some(slot) = SlotId::new(raw, self.capacity) else {
            return Ok(());
        };
        if !self.membership.is_occupied(slot) {
            return Ok(());
        }
        let line = format!("bat: {:.1}", level);
        self.surface.text(slot, 1, ROW_BATTERY, &line).await
    }

    pub(crate) async fn draw_identity(&mut self, slot: SlotId) -> Result<()> {
        let line = format!("I am cube #{}", slot);
        self.surface.text(slot, 1, ROW_IDENTITY, &line).await
    }

    /// Redraw the neighbor line for one cube: the raw peer id per side (the
    /// anchor shows up here too) plus the add/remove counters.
    pub(crate) async fn draw_neighbor_status(&mut self, slot: SlotId) -> Result<()> {
        let mut line = String::from("nb");
        for side in Side::ALL {
            match self.neighbors.peer_raw(slot, side) {
                Some(peer) => line.push_str(&format!(" {:02x}", peer)),
                None => line.push_str(" --"),
            }
        }
        self.surface.text(slot, 1, ROW_NEIGHBORS, &line).await?;

        let counters = *self.membership.counters(slot);
        let counts = format!("   +{}, -{}", counters.neighbor_add, counters.neighbor_remove);
        self.surface.text(slot, 1, ROW_NEIGHBORS + 1, &counts).await
    }
}
