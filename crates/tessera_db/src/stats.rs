//! Design statistics summary.

use crate::data::Design;
use std::fmt;

/// Cell counts, areas and utilisation of a design.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignStats {
    /// Total nodes.
    pub nodes: usize,
    /// Movable nodes.
    pub movable: usize,
    /// Fixed nodes.
    pub fixed: usize,
    /// Movable single-height nodes.
    pub single_height: usize,
    /// Movable nodes taller than one row.
    pub multi_height: usize,
    /// Nets.
    pub edges: usize,
    /// Pins.
    pub pins: usize,
    /// Rows.
    pub rows: usize,
    /// Summed area of all rows.
    pub row_area: f64,
    /// Summed area of movable nodes.
    pub movable_area: f64,
    /// Summed area of fixed nodes.
    pub fixed_area: f64,
    /// Movable area over the row area not covered by fixed cells.
    pub utilization: f64,
}

impl DesignStats {
    pub(crate) fn collect(design: &Design) -> Self {
        let mut stats = DesignStats {
            nodes: design.node_count(),
            movable: 0,
            fixed: 0,
            single_height: 0,
            multi_height: 0,
            edges: design.edge_count(),
            pins: design.pin_count(),
            rows: design.arch.row_count(),
            row_area: design
                .arch
                .rows
                .iter()
                .map(|r| (r.xmax - r.xmin) * r.height)
                .sum(),
            movable_area: 0.0,
            fixed_area: 0.0,
            utilization: 0.0,
        };
        for node in &design.nodes {
            if node.fixed {
                stats.fixed += 1;
                stats.fixed_area += node.area();
                continue;
            }
            stats.movable += 1;
            stats.movable_area += node.area();
            if design.is_single_height(node.id) {
                stats.single_height += 1;
            } else {
                stats.multi_height += 1;
            }
        }
        let free = stats.row_area - stats.fixed_area;
        if free > 0.0 {
            stats.utilization = stats.movable_area / free;
        }
        stats
    }
}

impl fmt::Display for DesignStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total cells                : {}", self.nodes)?;
        writeln!(f, "movable cells              : {}", self.movable)?;
        writeln!(f, "multi-height cells         : {}", self.multi_height)?;
        writeln!(f, "fixed cells                : {}", self.fixed)?;
        writeln!(f, "nets                       : {}", self.edges)?;
        writeln!(f, "rows                       : {}", self.rows)?;
        writeln!(f, "total movable area         : {:.3}", self.movable_area)?;
        writeln!(f, "total fixed area           : {:.3}", self.fixed_area)?;
        write!(f, "design utilization         : {:.3}%", self.utilization * 100.0)
    }
}
