//! Optimal-region estimation.
//!
//! For a cell, each connected net contributes the bounding box of its other
//! pins, shifted by the connecting pin's offset so it describes origins for
//! the cell. The median of all collected interval endpoints, taken
//! independently in x and y, bounds the set of origins minimizing the cell's
//! HPWL with everything else held fixed.

use tessera_common::Rect;
use tessera_db::{Design, EdgeId, NodeId};

/// Computes optimal regions, reusing its endpoint buffers across calls.
#[derive(Debug, Clone)]
pub struct RegionEstimator {
    skip_nets_larger_than: usize,
    xpts: Vec<f64>,
    ypts: Vec<f64>,
}

impl RegionEstimator {
    /// Creates an estimator ignoring nets with more than
    /// `skip_nets_larger_than` pins.
    pub fn new(skip_nets_larger_than: usize) -> Self {
        Self {
            skip_nets_larger_than,
            xpts: Vec::new(),
            ypts: Vec::new(),
        }
    }

    /// Returns the large-net threshold.
    pub fn skip_nets_larger_than(&self) -> usize {
        self.skip_nets_larger_than
    }

    /// Returns the box of origins for `node` that minimizes its wirelength,
    /// or `None` when fewer than two interval endpoints were collected.
    ///
    /// The box is clipped to the chip bounds.
    pub fn optimal_region(&mut self, design: &Design, node: NodeId) -> Option<Rect> {
        self.xpts.clear();
        self.ypts.clear();

        let bounds = design.arch.bounds;
        for &pid in &design.node(node).pins {
            let pin = design.pin(pid);
            let npins = design.edge(pin.edge).pin_count();
            if npins <= 1 || npins > self.skip_nets_larger_than {
                continue;
            }
            let Some(bbox) = edge_bbox_excluding(design, pin.edge, node) else {
                continue;
            };

            let xmin = (bbox.xmin - pin.dx).max(bounds.xmin).min(bounds.xmax);
            let xmax = (bbox.xmax - pin.dx).min(bounds.xmax).max(bounds.xmin);
            let ymin = (bbox.ymin - pin.dy).max(bounds.ymin).min(bounds.ymax);
            let ymax = (bbox.ymax - pin.dy).min(bounds.ymax).max(bounds.ymin);

            self.xpts.push(xmin);
            self.xpts.push(xmax);
            self.ypts.push(ymin);
            self.ypts.push(ymax);
        }

        let t = self.xpts.len();
        if t <= 1 {
            return None;
        }
        self.xpts.sort_by(f64::total_cmp);
        self.ypts.sort_by(f64::total_cmp);

        let mid = t / 2;
        Some(Rect::new(
            self.xpts[mid - 1],
            self.ypts[mid - 1],
            self.xpts[mid],
            self.ypts[mid],
        ))
    }
}

/// Bounding box of the pins of `edge` that do not belong to `node`, or
/// `None` if every pin does.
pub fn edge_bbox_excluding(design: &Design, edge: EdgeId, node: NodeId) -> Option<Rect> {
    let mut bbox = Rect::empty();
    for &pid in &design.edge(edge).pins {
        if design.pin(pid).node == node {
            continue;
        }
        let p = design.pin_position(pid);
        bbox.expand(p.x, p.y);
    }
    if bbox.is_empty() {
        None
    } else {
        Some(bbox)
    }
}
