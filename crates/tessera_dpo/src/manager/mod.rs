//! The segment manager: legal row segments, move/swap primitives and the
//! pending-change record.
//!
//! The optimizer only talks to placement legality through the
//! [`SegmentManager`] trait. [`SegmentMgr`] is the in-memory implementation
//! used by the entry points and the tests.

mod detailed;
mod segment;

pub use detailed::SegmentMgr;
pub use segment::Segment;

use rand::RngCore;
use tessera_common::Point;
use tessera_db::{Design, NodeId, RowId, SegmentId};

/// One relocation inside a [`PendingMove`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMove {
    /// The node being relocated.
    pub node: NodeId,
    /// Its origin before the change.
    pub old: Point,
    /// Its origin after the change.
    pub new: Point,
    /// The segment it occupies before the change.
    pub old_seg: SegmentId,
    /// The segment it occupies after the change.
    pub new_seg: SegmentId,
}

/// The change recorded by the last successful `try_*` call.
///
/// Empty when nothing is pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingMove {
    /// All relocations making up the change.
    pub moves: Vec<NodeMove>,
}

impl PendingMove {
    /// Returns `true` if no change is pending.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Returns the recorded new origin of `node`, if it takes part.
    pub fn new_position(&self, node: NodeId) -> Option<Point> {
        self.moves.iter().find(|m| m.node == node).map(|m| m.new)
    }

    /// Drops the recorded change.
    pub fn clear(&mut self) {
        self.moves.clear();
    }
}

/// Legality and bookkeeping services the optimizer needs from a placement.
///
/// Every `try_*` call first clears the previous pending change; on success it
/// records a new one without touching node positions. Positions only change
/// through [`accept_move`](SegmentManager::accept_move).
pub trait SegmentManager {
    /// The design being optimized.
    fn design(&self) -> &Design;

    /// The shared random source driving shuffles and row picks.
    fn rng(&mut self) -> &mut dyn RngCore;

    /// Re-sorts the cells of every segment by x.
    fn resort_segments(&mut self);

    /// Movable single-height cells eligible for optimization.
    fn candidates(&self) -> &[NodeId];

    /// Segments a node is currently assigned to.
    fn segments_of(&self, node: NodeId) -> &[SegmentId];

    /// Segments of one row, left to right.
    fn segments_in_row(&self, row: RowId) -> &[SegmentId];

    /// Looks up a segment.
    fn segment(&self, id: SegmentId) -> &Segment;

    /// Tries to move `node` from `old_seg` into a different segment near `new`.
    fn try_move_to_segment(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        new: Point,
        new_seg: SegmentId,
    ) -> bool;

    /// Tries to move `node` to `new` inside the segment it already occupies.
    fn try_move_within_segment(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        new: Point,
        new_seg: SegmentId,
    ) -> bool;

    /// Tries to exchange `node` with the cell occupying `target` in
    /// `target_seg`.
    fn try_swap(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        target: Point,
        target_seg: SegmentId,
    ) -> bool;

    /// The change recorded by the last successful `try_*` call.
    fn pending(&self) -> &PendingMove;

    /// Applies the pending change to the design and the segment lists.
    fn accept_move(&mut self);

    /// Discards the pending change.
    fn reject_move(&mut self);
}
