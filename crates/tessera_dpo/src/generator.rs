//! The move/swap generator.
//!
//! For one candidate cell the generator computes the optimal region, aims at
//! its centre, picks a target row and segment, and asks the segment manager
//! for a move, falling back to a swap with the cell already there. The only
//! difference between the global and the vertical flavour is how the target
//! row is chosen, captured by [`RowSelection`].

use crate::manager::SegmentManager;
use crate::region::RegionEstimator;
use rand::seq::SliceRandom;
use rand::Rng;
use tessera_common::{Point, Rect};
use tessera_config::SearchScope;
use tessera_db::{NodeId, RowId};
use tessera_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// How the generator picks the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    /// The row nearest the region centre, however far away.
    Unrestricted,
    /// A random row in a window at most two rows from the current one,
    /// stepping towards the region.
    RowWindow,
}

impl RowSelection {
    /// Display name of a generator using this selection.
    pub fn generator_name(self) -> &'static str {
        match self {
            RowSelection::Unrestricted => "global swap",
            RowSelection::RowWindow => "vertical swap",
        }
    }

    /// Plural noun used in pass progress notes.
    pub(crate) fn pass_noun(self) -> &'static str {
        match self {
            RowSelection::Unrestricted => "global swaps",
            RowSelection::RowWindow => "vertical swaps",
        }
    }

    /// Diagnostic numbers for the (pass, end, stats) notes.
    pub(crate) fn note_codes(self) -> (u16, u16, u16) {
        match self {
            RowSelection::Unrestricted => (306, 307, 334),
            RowSelection::RowWindow => (308, 309, 336),
        }
    }
}

impl From<SearchScope> for RowSelection {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Unrestricted => RowSelection::Unrestricted,
            SearchScope::RowWindow => RowSelection::RowWindow,
        }
    }
}

/// Proposes one move or swap per candidate and counts the outcomes.
#[derive(Debug, Clone)]
pub struct SwapGenerator {
    selection: RowSelection,
    region: RegionEstimator,
    attempts: u64,
    moves: u64,
    swaps: u64,
}

impl SwapGenerator {
    /// Creates a generator ignoring nets with more than
    /// `skip_nets_larger_than` pins.
    pub fn new(selection: RowSelection, skip_nets_larger_than: usize) -> Self {
        Self {
            selection,
            region: RegionEstimator::new(skip_nets_larger_than),
            attempts: 0,
            moves: 0,
            swaps: 0,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &'static str {
        self.selection.generator_name()
    }

    /// Returns the row-selection strategy.
    pub fn selection(&self) -> RowSelection {
        self.selection
    }

    /// Returns the number of `generate` calls since the last reset.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Returns the number of proposed moves since the last reset.
    pub fn moves(&self) -> u64 {
        self.moves
    }

    /// Returns the number of proposed swaps since the last reset.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Tries to propose a change for `node`.
    ///
    /// On success the manager holds the pending change and `true` is
    /// returned; the change is neither scored nor applied here.
    pub fn generate<M: SegmentManager + ?Sized>(&mut self, mgr: &mut M, node: NodeId) -> bool {
        self.attempts += 1;

        let design = mgr.design();
        let nd = design.node(node);
        if nd.fixed || !design.is_single_height(node) {
            return false;
        }
        let (xi, yi, height, region_id) = (nd.x, nd.y, nd.height, nd.region);

        let Some(region) = self.region.optimal_region(design, node) else {
            return false;
        };
        if region.contains(xi, yi) {
            return false;
        }
        let &[si] = mgr.segments_of(node) else {
            return false;
        };
        let ri = mgr.segment(si).row;

        let target = region.center();
        let Some(rj) = self.target_row(mgr, &region, target.y, height, ri) else {
            return false;
        };
        let xj = target.x;
        let yj = mgr.design().arch.row(rj).bottom + 0.5 * height;

        let Some(sj) = mgr
            .segments_in_row(rj)
            .iter()
            .copied()
            .find(|&s| mgr.segment(s).spans(xj))
        else {
            return false;
        };
        if mgr.segment(sj).region != region_id {
            return false;
        }

        let old = Point::new(xi, yi);
        let new = Point::new(xj, yj);
        let moved = if si != sj {
            mgr.try_move_to_segment(node, old, si, new, sj)
        } else {
            mgr.try_move_within_segment(node, old, si, new, sj)
        };
        if moved {
            self.moves += 1;
            return true;
        }
        if mgr.try_swap(node, old, si, new, sj) {
            self.swaps += 1;
            return true;
        }
        false
    }

    /// Picks one of `candidates` with the manager's random source and runs
    /// [`generate`](Self::generate) on it.
    pub fn generate_random<M: SegmentManager + ?Sized>(
        &mut self,
        mgr: &mut M,
        candidates: &[NodeId],
    ) -> bool {
        let Some(&node) = candidates.choose(mgr.rng()) else {
            return false;
        };
        self.generate(mgr, node)
    }

    fn target_row<M: SegmentManager + ?Sized>(
        &self,
        mgr: &mut M,
        region: &Rect,
        center_y: f64,
        height: f64,
        current: RowId,
    ) -> Option<RowId> {
        let arch = &mgr.design().arch;
        if self.selection == RowSelection::Unrestricted {
            return arch.find_closest_row(center_y - 0.5 * height);
        }

        let last = arch.row_count().checked_sub(1)?;
        let rmin = arch.find_closest_row(region.ymin - 0.5 * height)?.index();
        let rmax = arch.find_closest_row(region.ymax + 0.5 * height)?.index();
        let ri = current.index();
        let (lo, hi) = if rmin > ri {
            ((ri + 1).min(last), (ri + 2).min(last))
        } else if rmax < ri {
            (ri.saturating_sub(2), ri.saturating_sub(1))
        } else {
            (rmin.max(ri.saturating_sub(2)), rmax.min(ri + 2))
        };
        if lo > hi {
            return None;
        }
        Some(RowId::from_index(mgr.rng().gen_range(lo..=hi)))
    }

    /// Emits the cumulative counters as a note.
    pub fn stats(&self, sink: &DiagnosticSink) {
        let (_, _, code) = self.selection.note_codes();
        sink.emit(Diagnostic::note(
            DiagnosticCode::placement(code),
            format!(
                "Generator {}, Cumulative attempts {}, swaps {}, moves {:5} since last reset.",
                self.name(),
                self.attempts,
                self.swaps,
                self.moves
            ),
        ));
    }

    /// Zeroes the counters.
    pub fn reset_stats(&mut self) {
        self.attempts = 0;
        self.moves = 0;
        self.swaps = 0;
    }
}
