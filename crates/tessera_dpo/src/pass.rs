//! Pass control: repeated sweeps over shuffled candidates with greedy
//! acceptance, stopping on a pass budget or when a pass no longer changes
//! the wirelength by more than the tolerance.

use crate::generator::{RowSelection, SwapGenerator};
use crate::manager::SegmentManager;
use crate::objective::HpwlObjective;
use rand::seq::SliceRandom;
use tessera_config::{
    OptimizeConfig, DEFAULT_PASSES, DEFAULT_SKIP_NETS_LARGER_THAN, DEFAULT_TOLERANCE,
};
use tessera_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Smallest pass count ever run.
pub const MIN_PASSES: u32 = 1;

/// Smallest tolerance ever used.
pub const MIN_TOLERANCE: f64 = 0.01;

/// Pass budget, convergence tolerance and large-net threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    /// Maximum number of passes; at least [`MIN_PASSES`].
    pub passes: u32,
    /// Relative per-pass change at or below which the run stops; at least
    /// [`MIN_TOLERANCE`].
    pub tolerance: f64,
    /// Nets with more pins than this are ignored.
    pub skip_nets_larger_than: usize,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            tolerance: DEFAULT_TOLERANCE,
            skip_nets_larger_than: DEFAULT_SKIP_NETS_LARGER_THAN,
        }
    }
}

impl RunParams {
    /// Parses a command string on top of the defaults.
    pub fn parse(command: &str) -> Self {
        Self::default().with_command(command)
    }

    /// Takes the parameters from an `[optimize]` table.
    pub fn from_config(config: &OptimizeConfig) -> Self {
        Self {
            passes: config.passes,
            tolerance: config.tolerance,
            skip_nets_larger_than: config.skip_nets_larger_than,
        }
        .clamped()
    }

    /// Overrides the pass count and tolerance with `-p <int>` and
    /// `-t <float>` from `command`.
    ///
    /// Tokens are separated by spaces, `\r`, `\t`, `\n` and `;`. A flag
    /// without a following value and unknown tokens are ignored. A value is
    /// read up to its first non-numeric character (`3x` is 3) and counts as
    /// zero when no number leads it. The result is clamped to the floors.
    pub fn with_command(mut self, command: &str) -> Self {
        let tokens: Vec<&str> = command
            .split(|c: char| matches!(c, ' ' | '\r' | '\t' | '\n' | ';'))
            .filter(|t| !t.is_empty())
            .collect();

        let mut i = 0;
        while i < tokens.len() {
            match (tokens[i], tokens.get(i + 1)) {
                ("-p", Some(value)) => {
                    let passes = numeric_prefix(value, false)
                        .parse::<i64>()
                        .unwrap_or(0)
                        .max(i64::from(MIN_PASSES));
                    self.passes = u32::try_from(passes).unwrap_or(u32::MAX);
                    i += 1;
                }
                ("-t", Some(value)) => {
                    self.tolerance = numeric_prefix(value, true).parse::<f64>().unwrap_or(0.0);
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
        self.clamped()
    }

    fn clamped(mut self) -> Self {
        self.passes = self.passes.max(MIN_PASSES);
        self.tolerance = self.tolerance.max(MIN_TOLERANCE);
        self
    }
}

/// Longest leading part of `value` shaped like a signed integer, or like a
/// decimal with optional fraction and exponent when `fractional` is set.
fn numeric_prefix(value: &str, fractional: bool) -> &str {
    let bytes = value.as_bytes();
    let digits =
        |from: usize| from + bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    end = digits(end);
    if fractional {
        if bytes.get(end) == Some(&b'.') {
            end = digits(end + 1);
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let after = digits(exp);
            if after > exp {
                end = after;
            }
        }
    }
    &value[..end]
}

/// Summary of one optimization run.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeReport {
    /// Row-selection strategy used.
    pub scope: RowSelection,
    /// Passes actually executed.
    pub passes_run: u32,
    /// Full HPWL before the first pass.
    pub initial_hpwl: f64,
    /// Full HPWL after the last pass.
    pub final_hpwl: f64,
    /// `(initial - final) / initial` in percent; zero for a zero baseline.
    pub improvement_percent: f64,
    /// Generator attempts.
    pub attempts: u64,
    /// Accepted or rejected move proposals.
    pub moves: u64,
    /// Accepted or rejected swap proposals.
    pub swaps: u64,
    /// Running total of tracked nets at the end of the last pass.
    pub tracked_hpwl: f64,
}

/// Drives one generator over a manager for up to `passes` sweeps.
#[derive(Debug, Clone)]
pub struct PassController {
    generator: SwapGenerator,
    params: RunParams,
}

impl PassController {
    /// Creates a controller with a fresh generator.
    pub fn new(selection: RowSelection, params: RunParams) -> Self {
        Self {
            generator: SwapGenerator::new(selection, params.skip_nets_larger_than),
            params,
        }
    }

    /// Returns the generator and its counters.
    pub fn generator(&self) -> &SwapGenerator {
        &self.generator
    }

    /// Returns the run parameters.
    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Runs one sweep over the shuffled candidates and returns the running
    /// tracked wirelength after it.
    ///
    /// A proposal is accepted when it does not increase the tracked
    /// wirelength.
    pub fn sweep<M: SegmentManager + ?Sized>(&mut self, mgr: &mut M) -> f64 {
        let mut objective = HpwlObjective::new(
            mgr.design().edge_count(),
            self.params.skip_nets_larger_than,
        );
        mgr.resort_segments();

        let mut candidates = mgr.candidates().to_vec();
        candidates.shuffle(mgr.rng());

        let mut running = objective.current(mgr.design());
        for node in candidates {
            if !self.generator.generate(mgr, node) {
                continue;
            }
            let delta = objective.delta_pending(mgr.design(), mgr.pending());
            let next = running - delta;
            if next <= running {
                mgr.accept_move();
                running = next;
            } else {
                mgr.reject_move();
            }
        }
        running
    }

    /// Runs passes until the budget is spent or the run converges, emitting
    /// one note per pass, an end-of-run summary and the generator counters.
    pub fn run<M: SegmentManager + ?Sized>(
        &mut self,
        mgr: &mut M,
        sink: &DiagnosticSink,
    ) -> OptimizeReport {
        let scope = self.generator.selection();
        let (pass_code, end_code, _) = scope.note_codes();
        let noun = scope.pass_noun();

        let initial = mgr.design().total_hpwl();
        let mut curr = initial;
        let mut tracked = 0.0;
        let mut passes_run = 0;

        for pass in 1..=self.params.passes {
            let last = curr;
            tracked = self.sweep(mgr);
            curr = mgr.design().total_hpwl();
            passes_run = pass;
            sink.emit(Diagnostic::note(
                DiagnosticCode::placement(pass_code),
                format!("Pass {pass:3} of {noun}; hpwl is {curr:.6e}."),
            ));
            if last == 0.0 || ((curr - last) / last).abs() <= self.params.tolerance {
                break;
            }
        }

        let improvement = if initial > 0.0 {
            (initial - curr) / initial * 100.0
        } else {
            0.0
        };
        sink.emit(
            Diagnostic::note(
                DiagnosticCode::placement(end_code),
                format!(
                    "End of {noun}; objective is {curr:.6e}, \
                     improvement is {improvement:.2} percent."
                ),
            )
            .with_note(format!("placement hash {}", mgr.design().placement_hash())),
        );
        self.generator.stats(sink);

        OptimizeReport {
            scope,
            passes_run,
            initial_hpwl: initial,
            final_hpwl: curr,
            improvement_percent: improvement,
            attempts: self.generator.attempts(),
            moves: self.generator.moves(),
            swaps: self.generator.swaps(),
            tracked_hpwl: tracked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::SegmentMgr;
    use tessera_common::Rect;
    use tessera_db::{Architecture, Design, Node};

    fn scattered() -> Design {
        let arch = Architecture::with_uniform_rows(Rect::new(0.0, 0.0, 100.0, 40.0), 4, 10.0, 1.0);
        let mut d = Design::new(arch);
        let p0 = d.add_node(Node::fixed("p0", 0.0, 20.0, 0.0, 0.0));
        let p1 = d.add_node(Node::fixed("p1", 100.0, 20.0, 0.0, 0.0));
        let spots = [
            (82.0, 5.0),
            (10.0, 35.0),
            (62.0, 15.0),
            (30.0, 25.0),
            (90.0, 35.0),
            (20.0, 5.0),
        ];
        let cells: Vec<_> = spots
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| d.add_node(Node::movable(format!("c{i}"), x, y, 4.0, 10.0)))
            .collect();
        d.connect("in", &[(p0, 0.0, 0.0), (cells[0], -2.0, 0.0)]);
        for (i, w) in cells.windows(2).enumerate() {
            d.connect(format!("w{i}"), &[(w[0], 2.0, 0.0), (w[1], -2.0, 0.0)]);
        }
        d.connect("out", &[(cells[5], 2.0, 0.0), (p1, 0.0, 0.0)]);
        d.connect("bus", &[(cells[1], 0.0, 1.0), (cells[3], 0.0, 1.0), (cells[4], 0.0, -1.0)]);
        d
    }

    fn pulled() -> Design {
        let arch =
            Architecture::with_uniform_rows(Rect::new(0.0, 0.0, 100.0, 100.0), 10, 10.0, 1.0);
        let mut d = Design::new(arch);
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let f = d.add_node(Node::fixed("f", 50.0, 95.0, 0.0, 0.0));
        d.connect("n", &[(a, 0.0, 0.0), (f, 0.0, 0.0)]);
        d
    }

    fn codes(sink: &DiagnosticSink) -> Vec<String> {
        sink.diagnostics().iter().map(|d| d.code.to_string()).collect()
    }

    #[test]
    fn parse_flags() {
        let p = RunParams::parse("-p 3 -t 0.5");
        assert_eq!((p.passes, p.tolerance), (3, 0.5));
        assert_eq!(p.skip_nets_larger_than, 100);

        let p = RunParams::parse("-p;5\t-t\n0.2\r");
        assert_eq!((p.passes, p.tolerance), (5, 0.2));

        let p = RunParams::parse("--verbose -p 2 extra");
        assert_eq!(p.passes, 2);
    }

    #[test]
    fn parse_clamps_and_defaults() {
        assert_eq!(RunParams::parse(""), RunParams::default());
        assert_eq!(RunParams::parse("-p 0").passes, 1);
        assert_eq!(RunParams::parse("-p -4").passes, 1);
        assert_eq!(RunParams::parse("-p abc").passes, 1);
        assert_eq!(RunParams::parse("-t 0.001").tolerance, 0.01);
        assert_eq!(RunParams::parse("-t x").tolerance, 0.01);
        // Trailing flag without a value.
        assert_eq!(RunParams::parse("-t 0.3 -p").passes, 1);
        assert_eq!(RunParams::parse("-p 4 -t").tolerance, 0.01);
    }

    #[test]
    fn parse_reads_leading_number() {
        assert_eq!(RunParams::parse("-p 3x").passes, 3);
        assert_eq!(RunParams::parse("-p +7;").passes, 7);
        assert_eq!(RunParams::parse("-t 0.5abc").tolerance, 0.5);
        assert_eq!(RunParams::parse("-t 2e-1x").tolerance, 0.2);
        assert_eq!(RunParams::parse("-t 0.25e").tolerance, 0.25);
        assert_eq!(RunParams::parse("-p -").passes, 1);
        assert_eq!(numeric_prefix("12.5", false), "12");
        assert_eq!(numeric_prefix("-1.5E+2k", true), "-1.5E+2");
    }

    #[test]
    fn command_overrides_config() {
        let config = OptimizeConfig {
            passes: 4,
            tolerance: 0.2,
            skip_nets_larger_than: 50,
            ..OptimizeConfig::default()
        };
        let p = RunParams::from_config(&config).with_command("-t 0.05");
        assert_eq!(p.passes, 4);
        assert_eq!(p.tolerance, 0.05);
        assert_eq!(p.skip_nets_larger_than, 50);
    }

    #[test]
    fn sweep_never_increases_tracked_wirelength() {
        for seed in 0..8 {
            let mut mgr = SegmentMgr::with_seed(scattered(), seed, &DiagnosticSink::new()).unwrap();
            let before = HpwlObjective::new(mgr.design().edge_count(), 100).current(mgr.design());
            let mut ctl = PassController::new(RowSelection::Unrestricted, RunParams::default());
            let running = ctl.sweep(&mut mgr);
            let recomputed =
                HpwlObjective::new(mgr.design().edge_count(), 100).current(mgr.design());
            assert!(running <= before + 1e-9, "seed {seed}");
            assert!((running - recomputed).abs() < 1e-6, "seed {seed}");
            assert!(mgr.is_legal(), "seed {seed}");
        }
    }

    #[test]
    fn row_window_sweep_keeps_totals_consistent() {
        let mut mgr = SegmentMgr::with_seed(scattered(), 3, &DiagnosticSink::new()).unwrap();
        let mut ctl = PassController::new(RowSelection::RowWindow, RunParams::default());
        for _ in 0..3 {
            let running = ctl.sweep(&mut mgr);
            let recomputed =
                HpwlObjective::new(mgr.design().edge_count(), 100).current(mgr.design());
            assert!((running - recomputed).abs() < 1e-6);
        }
        assert!(mgr.is_legal());
    }

    #[test]
    fn single_pass_budget() {
        let mut mgr = SegmentMgr::with_seed(pulled(), 1, &DiagnosticSink::new()).unwrap();
        let sink = DiagnosticSink::new();
        let mut ctl =
            PassController::new(RowSelection::Unrestricted, RunParams::parse("-p 1 -t 0.5"));
        let report = ctl.run(&mut mgr, &sink);

        assert_eq!(report.passes_run, 1);
        assert_eq!(report.initial_hpwl, 128.0);
        assert_eq!(report.final_hpwl, 0.0);
        assert_eq!(report.improvement_percent, 100.0);
        assert_eq!(report.moves, 1);
        assert_eq!(codes(&sink), vec!["P306", "P307", "P334"]);
    }

    #[test]
    fn zero_wirelength_stops_the_run() {
        let mut mgr = SegmentMgr::with_seed(pulled(), 1, &DiagnosticSink::new()).unwrap();
        let sink = DiagnosticSink::new();
        let mut ctl =
            PassController::new(RowSelection::Unrestricted, RunParams::parse("-p 5 -t 0.5"));
        let report = ctl.run(&mut mgr, &sink);
        // The second pass starts from zero and ends the run.
        assert_eq!(report.passes_run, 2);
        assert_eq!(report.attempts, 2);
    }

    #[test]
    fn converged_design_stops_after_one_pass() {
        let mut d = pulled();
        d.set_position(tessera_db::NodeId::from_raw(0), tessera_common::Point::new(50.0, 95.0));
        let before = d.placement_hash();
        let mut mgr = SegmentMgr::with_seed(d, 1, &DiagnosticSink::new()).unwrap();
        let sink = DiagnosticSink::new();
        let report = PassController::new(RowSelection::Unrestricted, RunParams::parse("-p 10"))
            .run(&mut mgr, &sink);
        assert_eq!(report.passes_run, 1);
        assert_eq!(report.improvement_percent, 0.0);
        assert_eq!(mgr.design().placement_hash(), before);
    }

    #[test]
    fn progress_messages() {
        let mut mgr = SegmentMgr::with_seed(pulled(), 1, &DiagnosticSink::new()).unwrap();
        let sink = DiagnosticSink::new();
        PassController::new(RowSelection::RowWindow, RunParams::default()).run(&mut mgr, &sink);
        let diags = sink.take_all();
        assert_eq!(diags[0].code.to_string(), "P308");
        assert!(diags[0].message.starts_with("Pass   1 of vertical swaps; hpwl is "));
        assert_eq!(diags[1].code.to_string(), "P309");
        assert!(diags[1].message.starts_with("End of vertical swaps; objective is "));
        assert!(diags[1].message.ends_with(" percent."));
        assert!(diags[1].notes[0].starts_with("placement hash "));
        assert_eq!(diags[2].code.to_string(), "P336");
    }
}
