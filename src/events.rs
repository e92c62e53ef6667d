//! Hardware event stream items
//!
//! Every sensor and lifecycle notification from the cube hardware arrives as
//! one `CubeEvent` on the runtime's event channel. Slot ids are raw `usize`
//! here: neighbor events can reference a non-cube anchor (the charging base),
//! so validation happens at the dispatch boundary, not at construction.

use crate::sets::Side;
use serde::{Deserialize, Serialize};

/// One hardware event, as delivered by the platform event pump.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CubeEvent {
    /// A cube joined (first time or after a loss).
    Connect { slot: usize },
    /// A cube dropped off the radio.
    Disconnect { slot: usize },
    /// Hardware hint that the cube's visible content must be redrawn.
    Refresh { slot: usize },
    /// Two endpoints started touching. Either endpoint may be an anchor.
    NeighborAdd {
        a: usize,
        side_a: Side,
        b: usize,
        side_b: Side,
    },
    /// Two endpoints stopped touching.
    NeighborRemove {
        a: usize,
        side_a: Side,
        b: usize,
        side_b: Side,
    },
    /// Touch sensor state change.
    Touch { slot: usize, pressed: bool },
    /// Accelerometer reading change.
    Accel { slot: usize, x: i8, y: i8, z: i8 },
    /// Battery level change, in [0, 1].
    Battery { slot: usize, level: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_yaml_tagging() {
        let ev: CubeEvent = serde_yaml::from_str("{ type: connect, slot: 2 }").unwrap();
        assert_eq!(ev, CubeEvent::Connect { slot: 2 });

        let ev: CubeEvent =
            serde_yaml::from_str("{ type: neighbor_add, a: 0, side_a: right, b: 1, side_b: left }")
                .unwrap();
        assert_eq!(
            ev,
            CubeEvent::NeighborAdd {
                a: 0,
                side_a: Side::Right,
                b: 1,
                side_b: Side::Left,
            }
        );
    }
}
