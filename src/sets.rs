//! Slot identifiers, sides, and the fixed-capacity cube set
//!
//! All per-cube state in the runtime lives in fixed-size arrays indexed by
//! slot. `CubeSet` is the bounded bitset used for the membership sets; it is
//! `Copy`, so callers can snapshot a set before mutating it.

use serde::{Deserialize, Serialize};

/// Hard ceiling on concurrent cubes, bounded by the bitset word.
pub const MAX_CUBES: usize = 32;

/// Fixed-index identifier for one physical cube's state.
///
/// Hardware-sourced raw ids go through [`SlotId::new`], which rejects ids
/// outside the configured capacity (neighbor events may carry a non-cube
/// anchor id). Code that already holds a `SlotId` indexes arrays directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

impl SlotId {
    /// Validate a raw hardware id against the configured capacity.
    pub fn new(raw: usize, capacity: usize) -> Option<Self> {
        debug_assert!(capacity <= MAX_CUBES);
        if raw < capacity {
            Some(Self(raw))
        } else {
            None
        }
    }

    /// Build a slot from an index already known to be in range.
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < MAX_CUBES);
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the four edges of a cube where it can touch another cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Left,
    Bottom,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Left, Side::Bottom, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Left => 1,
            Side::Bottom => 2,
            Side::Right => 3,
        }
    }

    /// The side a neighbor touches us with when we touch it with `self`.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Left => Side::Right,
            Side::Bottom => Side::Top,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Side::Top => "top",
            Side::Left => "left",
            Side::Bottom => "bottom",
            Side::Right => "right",
        };
        write!(f, "{}", s)
    }
}

/// Fixed-capacity set of slots with O(1) test/mark/clear/union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CubeSet {
    bits: u32,
}

impl CubeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, slot: SlotId) {
        self.bits |= 1 << slot.index();
    }

    pub fn clear(&mut self, slot: SlotId) {
        self.bits &= !(1 << slot.index());
    }

    pub fn clear_all(&mut self) {
        self.bits = 0;
    }

    pub fn test(self, slot: SlotId) -> bool {
        self.bits & (1 << slot.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate set slots in ascending index order.
    pub fn iter(self) -> impl Iterator<Item = SlotId> {
        (0..MAX_CUBES)
            .filter(move |i| self.bits & (1 << i) != 0)
            .map(SlotId::from_index)
    }
}

impl std::ops::BitOr for CubeSet {
    type Output = CubeSet;

    fn bitor(self, rhs: CubeSet) -> CubeSet {
        CubeSet {
            bits: self.bits | rhs.bits,
        }
    }
}

impl std::ops::BitAnd for CubeSet {
    type Output = CubeSet;

    fn bitand(self, rhs: CubeSet) -> CubeSet {
        CubeSet {
            bits: self.bits & rhs.bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize) -> SlotId {
        SlotId::new(i, MAX_CUBES).unwrap()
    }

    #[test]
    fn test_slot_validation() {
        assert_eq!(SlotId::new(0, 8).map(SlotId::index), Some(0));
        assert_eq!(SlotId::new(7, 8).map(SlotId::index), Some(7));
        assert!(SlotId::new(8, 8).is_none());
        // Non-cube anchor ids from neighbor events land well above capacity
        assert!(SlotId::new(0xFF, 8).is_none());
    }

    #[test]
    fn test_mark_clear_test() {
        let mut set = CubeSet::new();
        assert!(set.is_empty());

        set.mark(slot(3));
        assert!(set.test(slot(3)));
        assert!(!set.test(slot(4)));
        assert_eq!(set.len(), 1);

        set.clear(slot(3));
        assert!(set.is_empty());

        // clearing an absent slot is a no-op
        set.clear(slot(3));
        assert!(set.is_empty());
    }

    #[test]
    fn test_union_and_iter() {
        let mut a = CubeSet::new();
        let mut b = CubeSet::new();
        a.mark(slot(0));
        a.mark(slot(5));
        b.mark(slot(5));
        b.mark(slot(31));

        let union = a | b;
        let members: Vec<usize> = union.iter().map(SlotId::index).collect();
        assert_eq!(members, vec![0, 5, 31]);
        assert_eq!(union.len(), 3);
    }

    #[test]
    fn test_side_opposite() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
        }
        assert_eq!(Side::Right.opposite(), Side::Left);
        assert_eq!(Side::Top.opposite(), Side::Bottom);
    }
}
