//! Incremental half-perimeter wirelength.
//!
//! Deltas touch only the nets of the relocated cells. A net shared by two of
//! them is scored once per query: every query advances a traversal stamp and
//! each net remembers the stamp it was last scored under.

use crate::manager::PendingMove;
use tessera_common::{Point, Rect};
use tessera_db::{Design, EdgeId, NodeId};

/// HPWL over nets with `2..=threshold` pins, with stamp-deduplicated deltas.
#[derive(Debug, Clone)]
pub struct HpwlObjective {
    skip_nets_larger_than: usize,
    traversal: u32,
    edge_mask: Vec<u32>,
}

impl HpwlObjective {
    /// Creates an objective for a design with `edge_count` nets.
    pub fn new(edge_count: usize, skip_nets_larger_than: usize) -> Self {
        Self {
            skip_nets_larger_than,
            traversal: 0,
            edge_mask: vec![0; edge_count],
        }
    }

    /// Clears the stamp and all per-net marks.
    pub fn reset(&mut self, edge_count: usize) {
        self.traversal = 0;
        self.edge_mask.clear();
        self.edge_mask.resize(edge_count, 0);
    }

    /// Returns the current traversal stamp.
    pub fn traversal(&self) -> u32 {
        self.traversal
    }

    fn tracks(&self, design: &Design, edge: EdgeId) -> bool {
        let n = design.edge(edge).pin_count();
        n >= 2 && n <= self.skip_nets_larger_than
    }

    /// Sum of the spans of all tracked nets.
    pub fn current(&self, design: &Design) -> f64 {
        design
            .edges
            .iter()
            .filter(|e| self.tracks(design, e.id))
            .map(|e| design.edge_bbox(e.id).half_perimeter())
            .sum()
    }

    /// Wirelength saved by moving `node` to `(new_x, new_y)`; positive is an
    /// improvement.
    pub fn delta_move(&mut self, design: &Design, node: NodeId, new_x: f64, new_y: f64) -> f64 {
        let to = Point::new(new_x, new_y);
        self.delta_with(design, &[node], |n| (n == node).then_some(to))
    }

    /// Wirelength saved by exchanging the origins of `a` and `b`.
    pub fn delta_swap(&mut self, design: &Design, a: NodeId, b: NodeId) -> f64 {
        let pa = design.node(a).position();
        let pb = design.node(b).position();
        self.delta_with(design, &[a, b], |n| {
            if n == a {
                Some(pb)
            } else if n == b {
                Some(pa)
            } else {
                None
            }
        })
    }

    /// Wirelength saved by applying `pending`.
    pub fn delta_pending(&mut self, design: &Design, pending: &PendingMove) -> f64 {
        let nodes: Vec<NodeId> = pending.moves.iter().map(|m| m.node).collect();
        self.delta_with(design, &nodes, |n| pending.new_position(n))
    }

    fn next_traversal(&mut self, edge_count: usize) -> u32 {
        if self.edge_mask.len() < edge_count {
            self.edge_mask.resize(edge_count, 0);
        }
        self.traversal = self.traversal.wrapping_add(1);
        if self.traversal == 0 {
            self.edge_mask.fill(0);
            self.traversal = 1;
        }
        self.traversal
    }

    fn delta_with(
        &mut self,
        design: &Design,
        roots: &[NodeId],
        relocated: impl Fn(NodeId) -> Option<Point>,
    ) -> f64 {
        let stamp = self.next_traversal(design.edge_count());
        let mut old_wl = 0.0;
        let mut new_wl = 0.0;

        for &root in roots {
            for &pid in &design.node(root).pins {
                let edge = design.pin(pid).edge;
                if !self.tracks(design, edge) || self.edge_mask[edge.index()] == stamp {
                    continue;
                }
                self.edge_mask[edge.index()] = stamp;

                let mut old_box = Rect::empty();
                let mut new_box = Rect::empty();
                for &other in &design.edge(edge).pins {
                    let pin = design.pin(other);
                    let owner = design.node(pin.node);
                    old_box.expand(owner.x + pin.dx, owner.y + pin.dy);
                    let at = relocated(pin.node).unwrap_or_else(|| owner.position());
                    new_box.expand(at.x + pin.dx, at.y + pin.dy);
                }
                old_wl += old_box.half_perimeter();
                new_wl += new_box.half_perimeter();
            }
        }
        old_wl - new_wl
    }
}
