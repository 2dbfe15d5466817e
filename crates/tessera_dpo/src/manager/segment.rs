//! Row segments: maximal legal runs within one row.
//!
//! Each row is cut at the outlines of fixed cells that overlap it and at the
//! x boundaries of region rectangles; the resulting pieces are tagged with
//! the region covering them and adjacent pieces of the same region are
//! merged back together.

use tessera_db::{Architecture, Design, NodeId, Row, RowId, SegmentId, DEFAULT_REGION};

const EPS: f64 = 1e-6;

/// A contiguous legal placement run within one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// The segment's ID.
    pub id: SegmentId,
    /// Row containing the segment.
    pub row: RowId,
    /// Left end.
    pub min_x: f64,
    /// Right end.
    pub max_x: f64,
    /// Region-id of cells allowed here.
    pub region: u32,
    /// Cells currently assigned, sorted by x after a resort.
    pub cells: Vec<NodeId>,
}

impl Segment {
    /// Returns the segment length.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns `true` if `x` lies within the segment span (inclusive).
    pub fn spans(&self, x: f64) -> bool {
        x >= self.min_x && x <= self.max_x
    }
}

/// Builds all segments for a design, numbered row by row left to right.
///
/// Returns the segments and, for each row, the ids of its segments.
pub(crate) fn build_segments(design: &Design) -> (Vec<Segment>, Vec<Vec<SegmentId>>) {
    let arch = &design.arch;
    let mut segments = Vec::new();
    let mut segs_in_row = vec![Vec::new(); arch.row_count()];

    for row in &arch.rows {
        for (min_x, max_x, region) in row_pieces(design, row) {
            let id = SegmentId::from_index(segments.len());
            segs_in_row[row.id.index()].push(id);
            segments.push(Segment {
                id,
                row: row.id,
                min_x,
                max_x,
                region,
                cells: Vec::new(),
            });
        }
    }
    (segments, segs_in_row)
}

fn overlaps_row(row: &Row, bottom: f64, top: f64) -> bool {
    bottom < row.top() - EPS && top > row.bottom + EPS
}

/// Free intervals of a row after removing fixed-cell blockages.
fn free_intervals(design: &Design, row: &Row) -> Vec<(f64, f64)> {
    let mut blocked: Vec<(f64, f64)> = design
        .nodes
        .iter()
        .filter(|n| n.fixed && n.width > EPS && overlaps_row(row, n.bottom(), n.top()))
        .map(|n| (n.left().max(row.xmin), n.right().min(row.xmax)))
        .filter(|(l, r)| r - l > EPS)
        .collect();
    blocked.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut free = Vec::new();
    let mut cursor = row.xmin;
    for (l, r) in blocked {
        if l - cursor > EPS {
            free.push((cursor, l));
        }
        cursor = cursor.max(r);
    }
    if row.xmax - cursor > EPS {
        free.push((cursor, row.xmax));
    }
    free
}

fn region_at(arch: &Architecture, row: &Row, x: f64) -> u32 {
    for region in &arch.regions {
        for rect in &region.rects {
            if overlaps_row(row, rect.ymin, rect.ymax) && x >= rect.xmin && x <= rect.xmax {
                return region.id;
            }
        }
    }
    DEFAULT_REGION
}

fn row_pieces(design: &Design, row: &Row) -> Vec<(f64, f64, u32)> {
    let arch = &design.arch;
    let mut cuts: Vec<f64> = arch
        .regions
        .iter()
        .flat_map(|r| r.rects.iter())
        .filter(|rect| overlaps_row(row, rect.ymin, rect.ymax))
        .flat_map(|rect| [rect.xmin, rect.xmax])
        .collect();
    cuts.sort_by(f64::total_cmp);

    let mut pieces: Vec<(f64, f64, u32)> = Vec::new();
    for (lo, hi) in free_intervals(design, row) {
        let mut start = lo;
        let inner = cuts.iter().copied().filter(|&c| c > lo + EPS && c < hi - EPS);
        for end in inner.chain(std::iter::once(hi)) {
            if end - start <= EPS {
                continue;
            }
            let region = region_at(arch, row, 0.5 * (start + end));
            match pieces.last_mut() {
                Some(last) if last.2 == region && (last.1 - start).abs() <= EPS => last.1 = end,
                _ => pieces.push((start, end, region)),
            }
            start = end;
        }
    }
    pieces
}
