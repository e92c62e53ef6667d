//! Membership set tracker
//!
//! Classifies every cube slot into the five membership sets driven by the
//! lifecycle events, plus the per-slot sensor counters that reset at connect
//! time. The transient sets (`new`, `lost`, `reconnected`, `dirty`) are wiped
//! at the start of every frame; `active` and the counters persist until the
//! cube disconnects.

use crate::sets::{CubeSet, SlotId};

/// Monotonic per-cube event counters, reset once at connect time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SensorCounters {
    pub touch: u32,
    pub neighbor_add: u32,
    pub neighbor_remove: u32,
}

/// The five membership sets and the per-slot counters.
#[derive(Debug, Clone)]
pub struct Membership {
    pub new_cubes: CubeSet,
    pub lost_cubes: CubeSet,
    pub reconnected_cubes: CubeSet,
    pub dirty_cubes: CubeSet,
    pub active_cubes: CubeSet,
    counters: Vec<SensorCounters>,
}

impl Membership {
    pub fn new(capacity: usize) -> Self {
        Self {
            new_cubes: CubeSet::new(),
            lost_cubes: CubeSet::new(),
            reconnected_cubes: CubeSet::new(),
            dirty_cubes: CubeSet::new(),
            active_cubes: CubeSet::new(),
            counters: vec![SensorCounters::default(); capacity],
        }
    }

    /// Wipe the transient sets. Called once per frame before that frame's
    /// events are delivered. `active` and the counters are untouched, so the
    /// call is idempotent with respect to them.
    pub fn begin_frame(&mut self) {
        self.new_cubes.clear_all();
        self.lost_cubes.clear_all();
        self.reconnected_cubes.clear_all();
        self.dirty_cubes.clear_all();
    }

    /// A cube joined: `lost` within this frame means it is reconnecting,
    /// otherwise it is brand new. Either way it needs a repaint and fresh
    /// counters.
    pub fn on_connect(&mut self, slot: SlotId) {
        if self.lost_cubes.test(slot) {
            self.lost_cubes.clear(slot);
            self.reconnected_cubes.mark(slot);
        } else {
            self.new_cubes.mark(slot);
        }
        self.dirty_cubes.mark(slot);
        self.counters[slot.index()] = SensorCounters::default();
        self.check_invariants();
    }

    /// A cube dropped: it leaves every set except `lost`.
    pub fn on_disconnect(&mut self, slot: SlotId) {
        self.lost_cubes.mark(slot);
        self.new_cubes.clear(slot);
        self.reconnected_cubes.clear(slot);
        self.dirty_cubes.clear(slot);
        self.active_cubes.clear(slot);
        self.check_invariants();
    }

    /// Hardware asked for a repaint; no other set is touched.
    pub fn on_refresh(&mut self, slot: SlotId) {
        self.dirty_cubes.mark(slot);
    }

    /// Transition into the active scene. Only valid once the asset gate has
    /// run for this frame, so the slot must have left the pending union.
    pub fn mark_active(&mut self, slot: SlotId) {
        self.active_cubes.mark(slot);
        self.check_invariants();
    }

    /// Slots whose assets must be loaded before they may become active.
    pub fn pending(&self) -> CubeSet {
        self.new_cubes | self.reconnected_cubes
    }

    /// A slot is occupied while tracked by any set a connected cube can be
    /// in. Sensor events for vacant slots are dropped by the dispatcher.
    pub fn is_occupied(&self, slot: SlotId) -> bool {
        (self.new_cubes | self.reconnected_cubes | self.dirty_cubes | self.active_cubes).test(slot)
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active_cubes.test(slot)
    }

    pub fn counters(&self, slot: SlotId) -> &SensorCounters {
        &self.counters[slot.index()]
    }

    pub fn counters_mut(&mut self, slot: SlotId) -> &mut SensorCounters {
        &mut self.counters[slot.index()]
    }

    /// A slot in two of {new, lost, reconnected} is a bug in the mutation
    /// rules, never a recoverable condition.
    fn check_invariants(&self) {
        debug_assert!((self.new_cubes & self.lost_cubes).is_empty());
        debug_assert!((self.new_cubes & self.reconnected_cubes).is_empty());
        debug_assert!((self.lost_cubes & self.reconnected_cubes).is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::MAX_CUBES;
    use proptest::prelude::*;

    const CAP: usize = 8;

    fn slot(i: usize) -> SlotId {
        SlotId::new(i, CAP).unwrap()
    }

    #[test]
    fn test_connect_marks_new_and_dirty() {
        let mut m = Membership::new(CAP);
        m.on_connect(slot(0));
        assert!(m.new_cubes.test(slot(0)));
        assert!(m.dirty_cubes.test(slot(0)));
        assert!(!m.reconnected_cubes.test(slot(0)));
        assert!(!m.active_cubes.test(slot(0)));
        assert_eq!(m.pending().len(), 1);
    }

    #[test]
    fn test_connect_after_loss_is_reconnect() {
        let mut m = Membership::new(CAP);
        m.on_connect(slot(1));
        m.begin_frame();
        m.mark_active(slot(1));

        m.on_disconnect(slot(1));
        assert!(m.lost_cubes.test(slot(1)));
        assert!(!m.active_cubes.test(slot(1)));

        m.on_connect(slot(1));
        assert!(m.reconnected_cubes.test(slot(1)));
        assert!(!m.new_cubes.test(slot(1)));
        assert!(!m.lost_cubes.test(slot(1)));
    }

    #[test]
    fn test_connect_then_disconnect_same_frame_ends_lost() {
        let mut m = Membership::new(CAP);
        m.on_connect(slot(2));
        m.on_disconnect(slot(2));

        assert!(m.lost_cubes.test(slot(2)));
        assert!(!m.new_cubes.test(slot(2)));
        assert!(!m.reconnected_cubes.test(slot(2)));
        assert!(!m.dirty_cubes.test(slot(2)));
        assert!(!m.active_cubes.test(slot(2)));
    }

    #[test]
    fn test_connect_disconnect_connect_same_frame() {
        let mut m = Membership::new(CAP);
        m.counters_mut(slot(2)).touch = 7;

        m.on_connect(slot(2));
        m.counters_mut(slot(2)).touch = 3;
        m.on_disconnect(slot(2));
        m.on_connect(slot(2));

        assert!(m.reconnected_cubes.test(slot(2)));
        assert!(!m.lost_cubes.test(slot(2)));
        assert!(!m.new_cubes.test(slot(2)));
        // counters were reset at the final connect
        assert_eq!(m.counters(slot(2)).touch, 0);
    }

    #[test]
    fn test_refresh_touches_only_dirty() {
        let mut m = Membership::new(CAP);
        m.mark_active(slot(3));
        m.on_refresh(slot(3));
        assert!(m.dirty_cubes.test(slot(3)));
        assert!(m.active_cubes.test(slot(3)));
        assert!(m.pending().is_empty());
    }

    #[test]
    fn test_begin_frame_preserves_active_and_counters() {
        let mut m = Membership::new(CAP);
        m.on_connect(slot(4));
        m.mark_active(slot(4));
        m.counters_mut(slot(4)).neighbor_add = 2;

        m.begin_frame();
        m.begin_frame();

        assert!(m.active_cubes.test(slot(4)));
        assert_eq!(m.counters(slot(4)).neighbor_add, 2);
        assert!(m.new_cubes.is_empty());
        assert!(m.lost_cubes.is_empty());
        assert!(m.reconnected_cubes.is_empty());
        assert!(m.dirty_cubes.is_empty());
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Connect(usize),
        Disconnect(usize),
        Refresh(usize),
        BeginFrame,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..CAP).prop_map(Op::Connect),
            (0..CAP).prop_map(Op::Disconnect),
            (0..CAP).prop_map(Op::Refresh),
            Just(Op::BeginFrame),
        ]
    }

    fn apply(m: &mut Membership, op: Op) {
        match op {
            Op::Connect(i) => m.on_connect(slot(i)),
            Op::Disconnect(i) => m.on_disconnect(slot(i)),
            Op::Refresh(i) => m.on_refresh(slot(i)),
            Op::BeginFrame => m.begin_frame(),
        }
    }

    proptest! {
        #[test]
        fn prop_transient_sets_stay_disjoint(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut m = Membership::new(CAP);
            for op in ops {
                apply(&mut m, op);
                for i in 0..MAX_CUBES.min(CAP) {
                    let s = slot(i);
                    let hits = [m.new_cubes.test(s), m.lost_cubes.test(s), m.reconnected_cubes.test(s)]
                        .iter()
                        .filter(|&&b| b)
                        .count();
                    prop_assert!(hits <= 1, "slot {} in {} transient sets", i, hits);
                }
            }
        }

        #[test]
        fn prop_begin_frame_is_idempotent_for_active(
            ops in proptest::collection::vec(op_strategy(), 0..64),
        ) {
            let mut m = Membership::new(CAP);
            for op in ops {
                apply(&mut m, op);
            }
            let active_before = m.active_cubes;
            let counters_before: Vec<_> = (0..CAP).map(|i| *m.counters(slot(i))).collect();

            m.begin_frame();
            m.begin_frame();

            prop_assert_eq!(m.active_cubes, active_before);
            for (i, before) in counters_before.iter().enumerate() {
                prop_assert_eq!(m.counters(slot(i)), before);
            }
        }

        #[test]
        fn prop_disconnect_leaves_only_lost(
            ops in proptest::collection::vec(op_strategy(), 0..64),
            target in 0..CAP,
        ) {
            let mut m = Membership::new(CAP);
            for op in ops {
                apply(&mut m, op);
            }
            m.on_disconnect(slot(target));

            let s = slot(target);
            prop_assert!(m.lost_cubes.test(s));
            prop_assert!(!m.new_cubes.test(s));
            prop_assert!(!m.reconnected_cubes.test(s));
            prop_assert!(!m.dirty_cubes.test(s));
            prop_assert!(!m.active_cubes.test(s));
        }
    }
}
