//! Side-bar visibility state and the show/hide policy
//!
//! `SideBars` records what is currently *rendered* per (slot, side),
//! independent of the neighbor table — an edge change only produces a visible
//! change (and at most one audio cue) when the rendered state actually flips.

use anyhow::Result;

use crate::hw::Background;
use crate::sets::{Side, SlotId};

use super::Runtime;

/// Rendered per-(slot, side) bar visibility.
#[derive(Debug, Clone)]
pub struct SideBars {
    visible: Vec<[bool; 4]>,
}

impl SideBars {
    pub fn new(capacity: usize) -> Self {
        Self {
            visible: vec![[false; 4]; capacity],
        }
    }

    pub fn is_visible(&self, slot: SlotId, side: Side) -> bool {
        self.visible[slot.index()][side.index()]
    }

    pub fn set(&mut self, slot: SlotId, side: Side, visible: bool) {
        self.visible[slot.index()][side.index()] = visible;
    }

    /// Number of bars currently showing on a cube; drives the background
    /// (awake as soon as one bar shows, asleep when none do).
    pub fn bar_count(&self, slot: SlotId) -> usize {
        self.visible[slot.index()].iter().filter(|&&v| v).count()
    }

    /// Forget rendered state for a cube, done when it (re)enters the active
    /// scene and the canvas starts from blank.
    pub fn reset(&mut self, slot: SlotId) {
        self.visible[slot.index()] = [false; 4];
    }
}

impl Runtime {
    /// Show the bar on `side` if it is not already rendered. Returns true if
    /// the rendered state changed. The first bar wakes the background
    /// character up.
    pub(crate) async fn show_bar(&mut self, slot: SlotId, side: Side) -> Result<bool> {
        debug_assert!(self.membership.is_active(slot));
        if self.side_bars.is_visible(slot, side) {
            return Ok(false);
        }
        self.side_bars.set(slot, side, true);
        self.surface.set_side_bar(slot, side, true).await?;
        if self.side_bars.bar_count(slot) == 1 {
            self.surface.set_background(slot, Background::Awake).await?;
        }
        Ok(true)
    }

    /// Mirror of [`show_bar`]; hiding the last bar puts the character back
    /// to sleep.
    pub(crate) async fn hide_bar(&mut self, slot: SlotId, side: Side) -> Result<bool> {
        debug_assert!(self.membership.is_active(slot));
        if !self.side_bars.is_visible(slot, side) {
            return Ok(false);
        }
        self.side_bars.set(slot, side, false);
        self.surface.set_side_bar(slot, side, false).await?;
        if self.side_bars.bar_count(slot) == 0 {
            self.surface
                .set_background(slot, Background::Asleep)
                .await?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::SlotId;

    fn slot(i: usize) -> SlotId {
        SlotId::new(i, 4).unwrap()
    }

    #[test]
    fn test_bar_count_tracks_sets() {
        let mut bars = SideBars::new(4);
        assert_eq!(bars.bar_count(slot(1)), 0);

        bars.set(slot(1), Side::Top, true);
        bars.set(slot(1), Side::Right, true);
        assert_eq!(bars.bar_count(slot(1)), 2);
        assert!(bars.is_visible(slot(1), Side::Top));
        assert!(!bars.is_visible(slot(1), Side::Left));
        // other slots unaffected
        assert_eq!(bars.bar_count(slot(0)), 0);

        bars.reset(slot(1));
        assert_eq!(bars.bar_count(slot(1)), 0);
    }
}
