//! Symmetric neighbor table
//!
//! Mirrors the hardware-reported adjacency: which (slot, side) touches which
//! other endpoint. The table is pure data — mutation happens only from the
//! runtime's neighbor event handlers, and activation reads it fresh rather
//! than keeping a second cached copy.

use crate::sets::{Side, SlotId};

/// One recorded link endpoint. `peer` keeps the raw hardware id so that a
/// non-cube anchor (the base) still counts as an edge for the cube touching
/// it, even though it has no slot of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    peer: usize,
    peer_side: Side,
}

/// Per-(slot, side) adjacency, symmetric for in-range endpoints.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    links: Vec<[Option<Link>; 4]>,
}

impl NeighborTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            links: vec![[None; 4]; capacity],
        }
    }

    fn capacity(&self) -> usize {
        self.links.len()
    }

    /// Record an edge between two endpoints. Out-of-range endpoints (anchors)
    /// get no row of their own but still appear as the peer of the in-range
    /// side.
    pub fn add_edge(&mut self, a: usize, side_a: Side, b: usize, side_b: Side) {
        if let Some(slot) = SlotId::new(a, self.capacity()) {
            self.links[slot.index()][side_a.index()] = Some(Link {
                peer: b,
                peer_side: side_b,
            });
        }
        if let Some(slot) = SlotId::new(b, self.capacity()) {
            self.links[slot.index()][side_b.index()] = Some(Link {
                peer: a,
                peer_side: side_a,
            });
        }
    }

    /// Remove an edge from both in-range endpoints.
    pub fn remove_edge(&mut self, a: usize, side_a: Side, b: usize, side_b: Side) {
        if let Some(slot) = SlotId::new(a, self.capacity()) {
            self.links[slot.index()][side_a.index()] = None;
        }
        if let Some(slot) = SlotId::new(b, self.capacity()) {
            self.links[slot.index()][side_b.index()] = None;
        }
    }

    /// Drop every link touching `slot`, both its own row and reverse links
    /// from other cubes. Called when a cube disconnects so the table never
    /// holds a dangling half-edge.
    pub fn detach_all(&mut self, slot: SlotId) {
        self.links[slot.index()] = [None; 4];
        for row in self.links.iter_mut() {
            for link in row.iter_mut() {
                if link.map(|l| l.peer) == Some(slot.index()) {
                    *link = None;
                }
            }
        }
    }

    /// True iff something (cube or anchor) touches `slot` on `side`.
    pub fn has_edge(&self, slot: SlotId, side: Side) -> bool {
        self.links[slot.index()][side.index()].is_some()
    }

    /// The cube endpoint on the other end, if the peer is a cube.
    pub fn edge_target(&self, slot: SlotId, side: Side) -> Option<(SlotId, Side)> {
        let link = self.links[slot.index()][side.index()]?;
        let peer = SlotId::new(link.peer, self.capacity())?;
        Some((peer, link.peer_side))
    }

    /// Raw peer id for status display, anchors included.
    pub fn peer_raw(&self, slot: SlotId, side: Side) -> Option<usize> {
        self.links[slot.index()][side.index()].map(|l| l.peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 8;

    fn slot(i: usize) -> SlotId {
        SlotId::new(i, CAP).unwrap()
    }

    #[test]
    fn test_symmetric_add_remove() {
        let mut nb = NeighborTable::new(CAP);
        nb.add_edge(0, Side::Right, 1, Side::Left);

        assert!(nb.has_edge(slot(0), Side::Right));
        assert!(nb.has_edge(slot(1), Side::Left));
        assert_eq!(
            nb.edge_target(slot(0), Side::Right),
            Some((slot(1), Side::Left))
        );
        assert_eq!(
            nb.edge_target(slot(1), Side::Left),
            Some((slot(0), Side::Right))
        );

        nb.remove_edge(0, Side::Right, 1, Side::Left);
        assert!(!nb.has_edge(slot(0), Side::Right));
        assert!(!nb.has_edge(slot(1), Side::Left));
    }

    #[test]
    fn test_anchor_edge_is_one_sided() {
        let mut nb = NeighborTable::new(CAP);
        // 0xFE plays the base anchor: no row of its own
        nb.add_edge(2, Side::Bottom, 0xFE, Side::Top);

        assert!(nb.has_edge(slot(2), Side::Bottom));
        assert_eq!(nb.edge_target(slot(2), Side::Bottom), None);
        assert_eq!(nb.peer_raw(slot(2), Side::Bottom), Some(0xFE));
    }

    #[test]
    fn test_detach_all_clears_reverse_links() {
        let mut nb = NeighborTable::new(CAP);
        nb.add_edge(0, Side::Right, 1, Side::Left);
        nb.add_edge(1, Side::Top, 3, Side::Bottom);

        nb.detach_all(slot(1));
        assert!(!nb.has_edge(slot(1), Side::Left));
        assert!(!nb.has_edge(slot(1), Side::Top));
        assert!(!nb.has_edge(slot(0), Side::Right));
        assert!(!nb.has_edge(slot(3), Side::Bottom));
    }
}
