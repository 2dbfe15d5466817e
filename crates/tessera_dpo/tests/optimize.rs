//! End-to-end runs of the optimizer over small generated designs: wirelength
//! never grows, placements stay legal, runs are reproducible per seed and
//! configuration flows through to the passes.

use tessera_common::{Point, Rect};
use tessera_config::load_config_from_str;
use tessera_db::{Architecture, Design, Node, NodeId};
use tessera_diagnostics::{DiagnosticCode, DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use tessera_dpo::{
    global_swap, run_with_config, vertical_swap, RowSelection, SegmentManager, SegmentMgr,
};

const CELLS: usize = 40;

/// 40 cells scattered over 8 rows of 50 sites, chained by 2- and 3-pin nets
/// and tied to four pads on the chip edges.
fn generated() -> (Design, Vec<NodeId>) {
    let arch = Architecture::with_uniform_rows(Rect::new(0.0, 0.0, 200.0, 80.0), 8, 10.0, 1.0);
    let mut d = Design::new(arch);
    let cells: Vec<NodeId> = (0..CELLS)
        .map(|i| {
            let slot = (i * 97) % 400;
            let (row, col) = (slot / 50, slot % 50);
            d.add_node(Node::movable(
                format!("c{i}"),
                col as f64 * 4.0 + 2.0,
                row as f64 * 10.0 + 5.0,
                4.0,
                10.0,
            ))
        })
        .collect();
    let pads: Vec<NodeId> = [(0.0, 40.0), (200.0, 40.0), (100.0, 0.0), (100.0, 80.0)]
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| d.add_node(Node::fixed(format!("pad{i}"), x, y, 0.0, 0.0)))
        .collect();

    for i in 0..CELLS {
        let next = cells[(i + 1) % CELLS];
        let far = cells[(i * 7 + 3) % CELLS];
        d.connect(format!("chain{i}"), &[(cells[i], 2.0, 0.0), (next, -2.0, 0.0)]);
        if far != cells[i] && far != next {
            d.connect(
                format!("tri{i}"),
                &[(cells[i], 0.0, 1.0), (next, 0.0, -1.0), (far, 1.0, 0.0)],
            );
        }
    }
    for (k, &pad) in pads.iter().enumerate() {
        d.connect(format!("io{k}"), &[(pad, 0.0, 0.0), (cells[k * 10], 0.0, 0.0)]);
    }
    (d, cells)
}

fn manager(seed: u64) -> SegmentMgr {
    let (design, _) = generated();
    SegmentMgr::with_seed(design, seed, &DiagnosticSink::new()).expect("consistent design")
}

#[test]
fn global_swap_never_worsens_and_stays_legal() {
    let mut mgr = manager(11);
    let sink = DiagnosticSink::new();
    let report = global_swap(&mut mgr, "-p 4 -t 0.01", &sink);

    assert_eq!(report.scope, RowSelection::Unrestricted);
    assert!(report.passes_run >= 1 && report.passes_run <= 4);
    assert!(report.final_hpwl <= report.initial_hpwl + 1e-9);
    assert!((report.final_hpwl - mgr.design().total_hpwl()).abs() < 1e-9);
    assert!((report.tracked_hpwl - report.final_hpwl).abs() < 1e-6);
    assert!(mgr.is_legal());
    assert!(!sink.has_errors());
}

#[test]
fn vertical_swap_never_worsens_and_stays_legal() {
    let mut mgr = manager(5);
    let sink = DiagnosticSink::new();
    let report = vertical_swap(&mut mgr, "-p 3", &sink);

    assert_eq!(report.scope, RowSelection::RowWindow);
    assert!(report.final_hpwl <= report.initial_hpwl + 1e-9);
    assert!(mgr.is_legal());
    let passes = sink.with_code(DiagnosticCode::placement(308));
    assert_eq!(passes.len() as u32, report.passes_run);
    assert!(passes[0].message.starts_with("Pass   1 of vertical swaps;"));
}

#[test]
fn same_seed_same_placement() {
    let run = |seed| {
        let mut mgr = manager(seed);
        let report = global_swap(&mut mgr, "-p 2", &DiagnosticSink::new());
        (mgr.design().placement_hash(), report)
    };
    let (hash_a, report_a) = run(42);
    let (hash_b, report_b) = run(42);
    assert_eq!(hash_a, hash_b);
    assert_eq!(report_a, report_b);
}

#[test]
fn single_pass_command_runs_one_pass() {
    let mut mgr = manager(3);
    let sink = DiagnosticSink::new();
    let report = global_swap(&mut mgr, "-p 1 -t 0.5", &sink);
    assert_eq!(report.passes_run, 1);
    assert_eq!(report.attempts as usize, CELLS);
}

#[test]
fn config_drives_the_run() {
    let config = load_config_from_str(
        r#"
[optimize]
passes = 2
tolerance = 0.0
seed = 9
scope = "row_window"
"#,
    )
    .expect("valid config")
    .optimize;

    let (design, _) = generated();
    let mut mgr = SegmentMgr::with_seed(design, config.seed, &DiagnosticSink::new()).unwrap();
    let sink = DiagnosticSink::new();
    let report = run_with_config(&mut mgr, &config, "", &sink);
    assert_eq!(report.scope, RowSelection::RowWindow);
    assert!(report.passes_run <= 2);

    // The command string still overrides the file.
    let (design, _) = generated();
    let mut mgr = SegmentMgr::with_seed(design, config.seed, &DiagnosticSink::new()).unwrap();
    let report = run_with_config(&mut mgr, &config, "-p 1", &DiagnosticSink::new());
    assert_eq!(report.passes_run, 1);
}

#[test]
fn cell_on_oversized_net_only_is_left_in_place() {
    let arch = Architecture::with_uniform_rows(Rect::new(0.0, 0.0, 200.0, 80.0), 8, 10.0, 1.0);
    let mut design = Design::new(arch);
    let lonely = design.add_node(Node::movable("lonely", 198.0, 75.0, 4.0, 10.0));
    let mut pins = vec![(lonely, 0.0, 0.0)];
    for i in 0..149 {
        let t = design.add_node(Node::fixed(format!("t{i}"), 0.0, 0.0, 0.0, 0.0));
        pins.push((t, 0.0, 0.0));
    }
    design.connect("wide", &pins);

    let mut mgr = SegmentMgr::with_seed(design, 1, &DiagnosticSink::new()).unwrap();
    let report = global_swap(&mut mgr, "-p 3", &DiagnosticSink::new());
    assert_eq!(mgr.design().node(lonely).position(), Point::new(198.0, 75.0));
    assert_eq!(report.moves + report.swaps, 0);
    assert_eq!(report.tracked_hpwl, 0.0);
}

#[test]
fn unmapped_cell_warning_renders() {
    let (mut design, _) = generated();
    design.add_node(Node::movable("stray", 50.0, 43.0, 4.0, 10.0));
    let sink = DiagnosticSink::new();
    let mgr = SegmentMgr::with_seed(design, 1, &sink).unwrap();
    assert_eq!(mgr.candidates().len(), CELLS + 1);

    let diags = sink.take_all();
    assert_eq!(diags.len(), 1);
    let text = TerminalRenderer::new(false).render(&diags[0]);
    assert!(text.starts_with("warning[W401]: cell 'stray' is not mapped to any row segment\n"));
    assert!(text.contains("   = note: cell origin is (50.000, 43.000)"));
}

#[test]
fn run_log_renders_in_order() {
    let mut mgr = manager(8);
    let sink = DiagnosticSink::new();
    global_swap(&mut mgr, "-p 1", &sink);

    let log = TerminalRenderer::new(false).render_all(&sink.take_all());
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines[0].starts_with("note[P306]: Pass   1 of global swaps; hpwl is "));
    assert!(lines[1].starts_with("note[P307]: End of global swaps; objective is "));
    assert!(lines[2].starts_with("   = note: placement hash "));
    assert!(lines[3].starts_with("note[P334]: Generator global swap, Cumulative attempts 40,"));
}
