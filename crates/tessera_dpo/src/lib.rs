//! Detailed-placement local search for the Tessera placer.
//!
//! This crate takes a legal placement held in a [`tessera_db::Design`] and
//! lowers its half-perimeter wirelength by relocating single cells towards
//! their optimal regions, swapping with the cell in the way when the target
//! is occupied. Legality stays with the [`SegmentManager`]; the search only
//! proposes, scores and accepts.
//!
//! # Pipeline
//!
//! 1. **Region**: median of the neighbouring nets' boxes ([`RegionEstimator`])
//! 2. **Generate**: target row and segment, then move or swap ([`SwapGenerator`])
//! 3. **Score**: incremental HPWL of the pending change ([`HpwlObjective`])
//! 4. **Pass**: shuffle, sweep, accept non-worsening changes ([`PassController`])
//!
//! # Usage
//!
//! ```ignore
//! use tessera_dpo::{global_swap, SegmentMgr};
//!
//! let mut mgr = SegmentMgr::with_seed(design, 1, &sink)?;
//! let report = global_swap(&mut mgr, "-p 3 -t 0.01", &sink);
//! assert!(report.final_hpwl <= report.initial_hpwl);
//! ```

#![warn(missing_docs)]

pub mod generator;
pub mod manager;
pub mod objective;
pub mod pass;
pub mod region;

pub use generator::{RowSelection, SwapGenerator};
pub use manager::{NodeMove, PendingMove, Segment, SegmentManager, SegmentMgr};
pub use objective::HpwlObjective;
pub use pass::{OptimizeReport, PassController, RunParams, MIN_PASSES, MIN_TOLERANCE};
pub use region::{edge_bbox_excluding, RegionEstimator};

use tessera_config::OptimizeConfig;
use tessera_diagnostics::DiagnosticSink;

/// Runs passes of unrestricted (long-range) moves and swaps.
///
/// `command` accepts `-p <passes>` and `-t <tolerance>`.
pub fn global_swap<M: SegmentManager + ?Sized>(
    mgr: &mut M,
    command: &str,
    sink: &DiagnosticSink,
) -> OptimizeReport {
    optimize(mgr, RowSelection::Unrestricted, &RunParams::parse(command), sink)
}

/// Runs passes of moves and swaps limited to two rows up or down.
///
/// `command` accepts `-p <passes>` and `-t <tolerance>`.
pub fn vertical_swap<M: SegmentManager + ?Sized>(
    mgr: &mut M,
    command: &str,
    sink: &DiagnosticSink,
) -> OptimizeReport {
    optimize(mgr, RowSelection::RowWindow, &RunParams::parse(command), sink)
}

/// Runs the pass controller with explicit parameters.
pub fn optimize<M: SegmentManager + ?Sized>(
    mgr: &mut M,
    scope: RowSelection,
    params: &RunParams,
    sink: &DiagnosticSink,
) -> OptimizeReport {
    PassController::new(scope, params.clone()).run(mgr, sink)
}

/// Runs the pass controller seeded from an `[optimize]` table, with
/// `command` overriding the pass count and tolerance.
///
/// The seed in `config` is consumed when the manager is built, see
/// [`SegmentMgr::with_seed`].
pub fn run_with_config<M: SegmentManager + ?Sized>(
    mgr: &mut M,
    config: &OptimizeConfig,
    command: &str,
    sink: &DiagnosticSink,
) -> OptimizeReport {
    let params = RunParams::from_config(config).with_command(command);
    optimize(mgr, RowSelection::from(config.scope), &params, sink)
}
