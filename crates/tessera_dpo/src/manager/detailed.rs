//! In-memory segment manager over a [`Design`].

use super::segment::{build_segments, Segment};
use super::{NodeMove, PendingMove, SegmentManager};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tessera_common::{Point, TesseraResult};
use tessera_db::{Design, NodeId, Row, RowId, SegmentId, GEOM_EPS};
use tessera_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Warning code for a movable cell that lies in no row segment.
const UNMAPPED_CELL: u16 = 401;

/// Owns a design, its row segments, the cell-to-segment mapping, the pending
/// change and the random source.
///
/// Only movable single-height cells are mapped; fixed cells become segment
/// boundaries instead.
#[derive(Debug)]
pub struct SegmentMgr<R = StdRng> {
    design: Design,
    segments: Vec<Segment>,
    segs_in_row: Vec<Vec<SegmentId>>,
    node_segs: Vec<Vec<SegmentId>>,
    candidates: Vec<NodeId>,
    pending: PendingMove,
    rng: R,
}

impl SegmentMgr<StdRng> {
    /// Builds a manager whose random source is a [`StdRng`] seeded with
    /// `seed`.
    pub fn with_seed(design: Design, seed: u64, sink: &DiagnosticSink) -> TesseraResult<Self> {
        Self::new(design, StdRng::seed_from_u64(seed), sink)
    }
}

impl<R: RngCore> SegmentMgr<R> {
    /// Builds segments for every row and maps each movable single-height cell
    /// to the segments its outline overlaps.
    ///
    /// Cells that map to no segment are reported as warnings and stay
    /// candidates the generator will skip. Fails if the design's cross
    /// references are inconsistent.
    pub fn new(design: Design, rng: R, sink: &DiagnosticSink) -> TesseraResult<Self> {
        design.check_consistency()?;
        let (segments, segs_in_row) = build_segments(&design);
        let node_count = design.node_count();
        let mut mgr = Self {
            design,
            segments,
            segs_in_row,
            node_segs: vec![Vec::new(); node_count],
            candidates: Vec::new(),
            pending: PendingMove::default(),
            rng,
        };
        mgr.assign_cells(sink);
        mgr.resort_segments();
        Ok(mgr)
    }

    fn assign_cells(&mut self, sink: &DiagnosticSink) {
        for i in 0..self.design.node_count() {
            let id = NodeId::from_index(i);
            let node = self.design.node(id);
            if node.fixed || !self.design.is_single_height(id) {
                continue;
            }
            self.candidates.push(id);

            let mut hits = Vec::new();
            if let Some(row) = self.design.arch.row_at(node.bottom(), GEOM_EPS) {
                for &sid in &self.segs_in_row[row.index()] {
                    let seg = &self.segments[sid.index()];
                    if seg.min_x < node.right() - GEOM_EPS && seg.max_x > node.left() + GEOM_EPS {
                        hits.push(sid);
                    }
                }
            }
            if hits.is_empty() {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::warning(UNMAPPED_CELL),
                        format!("cell '{}' is not mapped to any row segment", node.name),
                    )
                    .with_note(format!("cell origin is ({:.3}, {:.3})", node.x, node.y)),
                );
            }
            for &sid in &hits {
                self.segments[sid.index()].cells.push(id);
            }
            self.node_segs[i] = hits;
        }
    }

    /// Returns all segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consumes the manager and returns the optimized design.
    pub fn into_design(self) -> Design {
        self.design
    }

    /// Returns `true` if every mapped cell sits inside its segment on the
    /// site grid at its row's height and no two cells of a segment overlap.
    pub fn is_legal(&self) -> bool {
        self.segments.iter().all(|seg| {
            let row = self.design.arch.row(seg.row);
            let mut spans: Vec<(f64, f64)> = Vec::with_capacity(seg.cells.len());
            for &c in &seg.cells {
                let node = self.design.node(c);
                let (left, right) = (node.left(), node.right());
                let on_grid = (row.snap_nearest(left) - left).abs() <= GEOM_EPS;
                let on_row = (node.bottom() - row.bottom).abs() <= GEOM_EPS;
                // Cells straddling several segments are only checked against
                // the row, not the segment ends.
                let inside = self.node_segs[c.index()].len() > 1
                    || (left >= seg.min_x - GEOM_EPS && right <= seg.max_x + GEOM_EPS);
                if !(on_grid && on_row && inside) {
                    return false;
                }
                spans.push((left, right));
            }
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            spans.windows(2).all(|w| w[0].1 <= w[1].0 + GEOM_EPS)
        })
    }

    fn row_of(&self, sid: SegmentId) -> &Row {
        self.design.arch.row(self.segments[sid.index()].row)
    }

    fn sort_segment(&mut self, sid: SegmentId) {
        let design = &self.design;
        self.segments[sid.index()]
            .cells
            .sort_by(|&a, &b| design.node(a).x.total_cmp(&design.node(b).x));
    }

    fn is_only_in(&self, node: NodeId, sid: SegmentId) -> bool {
        self.node_segs[node.index()].as_slice() == [sid]
    }

    /// Left/right extents of the cells of `sid`, minus `exclude`, sorted.
    fn occupied(&self, sid: SegmentId, exclude: &[NodeId]) -> Vec<(f64, f64)> {
        let mut spans: Vec<(f64, f64)> = self.segments[sid.index()]
            .cells
            .iter()
            .filter(|c| !exclude.contains(c))
            .map(|&c| {
                let n = self.design.node(c);
                (n.left(), n.right())
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        spans
    }

    /// Finds the free gap of `sid` containing `target_x` and places a cell of
    /// `width` in it as close to `target_x` as possible. Returns the new
    /// centre x.
    fn place_in_gap(
        &self,
        sid: SegmentId,
        width: f64,
        target_x: f64,
        exclude: &[NodeId],
    ) -> Option<f64> {
        let seg = &self.segments[sid.index()];
        let spans = self.occupied(sid, exclude);

        let mut lo = seg.min_x;
        let mut gap = None;
        for (l, r) in spans.into_iter().chain(std::iter::once((seg.max_x, seg.max_x))) {
            if target_x >= lo && target_x <= l {
                gap = Some((lo, l));
                break;
            }
            lo = lo.max(r);
        }
        let (lo, hi) = gap?;
        if hi - lo + GEOM_EPS < width {
            return None;
        }

        let row = self.row_of(sid);
        let want = (target_x - 0.5 * width).max(lo).min(hi - width);
        let mut left = row.snap_nearest(want);
        if left < lo - GEOM_EPS {
            left = row.snap_up(lo);
        }
        if left + width > hi + GEOM_EPS {
            left = row.snap_down(hi - width);
        }
        if left < lo - GEOM_EPS || left + width > hi + GEOM_EPS {
            return None;
        }
        Some(left + 0.5 * width)
    }

    /// Checks that a cell of `width` centred near `center_x` fits in `sid`
    /// without overlapping its cells (minus `exclude`). Returns the snapped
    /// centre x.
    fn fits_at(
        &self,
        sid: SegmentId,
        width: f64,
        center_x: f64,
        exclude: &[NodeId],
    ) -> Option<f64> {
        let seg = &self.segments[sid.index()];
        let left = self.row_of(sid).snap_nearest(center_x - 0.5 * width);
        let right = left + width;
        if left < seg.min_x - GEOM_EPS || right > seg.max_x + GEOM_EPS {
            return None;
        }
        let clash = self
            .occupied(sid, exclude)
            .into_iter()
            .any(|(l, r)| left < r - GEOM_EPS && right > l + GEOM_EPS);
        if clash {
            return None;
        }
        Some(left + 0.5 * width)
    }

    /// The cell of `sid` whose span contains `x`, else the one whose centre
    /// is nearest to `x`.
    fn swap_partner(&self, node: NodeId, sid: SegmentId, x: f64) -> Option<NodeId> {
        let mut nearest: Option<(NodeId, f64)> = None;
        for &c in &self.segments[sid.index()].cells {
            if c == node {
                continue;
            }
            let n = self.design.node(c);
            if x >= n.left() - GEOM_EPS && x <= n.right() + GEOM_EPS {
                return Some(c);
            }
            let dist = (n.x - x).abs();
            if nearest.map_or(true, |(_, best)| dist < best) {
                nearest = Some((c, dist));
            }
        }
        nearest.map(|(c, _)| c)
    }

    fn try_move(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        new: Point,
        new_seg: SegmentId,
    ) -> bool {
        if !self.is_only_in(node, old_seg) {
            return false;
        }
        let n = self.design.node(node);
        if self.segments[new_seg.index()].region != n.region {
            return false;
        }
        let (width, height) = (n.width, n.height);
        let Some(x) = self.place_in_gap(new_seg, width, new.x, &[node]) else {
            return false;
        };
        let y = self.row_of(new_seg).bottom + 0.5 * height;
        self.pending.moves.push(NodeMove {
            node,
            old,
            new: Point::new(x, y),
            old_seg,
            new_seg,
        });
        true
    }
}

impl<R: RngCore> SegmentManager for SegmentMgr<R> {
    fn design(&self) -> &Design {
        &self.design
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }

    fn resort_segments(&mut self) {
        for i in 0..self.segments.len() {
            self.sort_segment(SegmentId::from_index(i));
        }
    }

    fn candidates(&self) -> &[NodeId] {
        &self.candidates
    }

    fn segments_of(&self, node: NodeId) -> &[SegmentId] {
        &self.node_segs[node.index()]
    }

    fn segments_in_row(&self, row: RowId) -> &[SegmentId] {
        &self.segs_in_row[row.index()]
    }

    fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    fn try_move_to_segment(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        new: Point,
        new_seg: SegmentId,
    ) -> bool {
        self.pending.clear();
        old_seg != new_seg && self.try_move(node, old, old_seg, new, new_seg)
    }

    fn try_move_within_segment(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        new: Point,
        new_seg: SegmentId,
    ) -> bool {
        self.pending.clear();
        old_seg == new_seg && self.try_move(node, old, old_seg, new, new_seg)
    }

    fn try_swap(
        &mut self,
        node: NodeId,
        old: Point,
        old_seg: SegmentId,
        target: Point,
        target_seg: SegmentId,
    ) -> bool {
        self.pending.clear();
        if !self.is_only_in(node, old_seg) {
            return false;
        }
        let Some(partner) = self.swap_partner(node, target_seg, target.x) else {
            return false;
        };
        if !self.is_only_in(partner, target_seg) || !self.design.is_single_height(partner) {
            return false;
        }

        let a = self.design.node(node);
        let b = self.design.node(partner);
        if self.segments[target_seg.index()].region != a.region
            || self.segments[old_seg.index()].region != b.region
        {
            return false;
        }

        let exclude = [node, partner];
        let Some(ax) = self.fits_at(target_seg, a.width, b.x, &exclude) else {
            return false;
        };
        let Some(bx) = self.fits_at(old_seg, b.width, a.x, &exclude) else {
            return false;
        };
        if old_seg == target_seg {
            let (al, ar) = (ax - 0.5 * a.width, ax + 0.5 * a.width);
            let (bl, br) = (bx - 0.5 * b.width, bx + 0.5 * b.width);
            if al < br - GEOM_EPS && ar > bl + GEOM_EPS {
                return false;
            }
        }

        let ay = self.row_of(target_seg).bottom + 0.5 * a.height;
        let by = self.row_of(old_seg).bottom + 0.5 * b.height;
        let partner_old = b.position();
        self.pending.moves.push(NodeMove {
            node,
            old,
            new: Point::new(ax, ay),
            old_seg,
            new_seg: target_seg,
        });
        self.pending.moves.push(NodeMove {
            node: partner,
            old: partner_old,
            new: Point::new(bx, by),
            old_seg: target_seg,
            new_seg: old_seg,
        });
        true
    }

    fn pending(&self) -> &PendingMove {
        &self.pending
    }

    fn accept_move(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for m in &pending.moves {
            self.design.set_position(m.node, m.new);
        }
        for m in &pending.moves {
            if m.old_seg != m.new_seg {
                self.segments[m.old_seg.index()].cells.retain(|&c| c != m.node);
                self.segments[m.new_seg.index()].cells.push(m.node);
                self.node_segs[m.node.index()] = vec![m.new_seg];
            }
        }
        for m in &pending.moves {
            self.sort_segment(m.old_seg);
            self.sort_segment(m.new_seg);
        }
    }

    fn reject_move(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_common::Rect;
    use tessera_db::{Architecture, Node, Pin, PinId, Region, EdgeId};

    fn three_rows() -> Design {
        Design::new(Architecture::with_uniform_rows(
            Rect::new(0.0, 0.0, 100.0, 30.0),
            3,
            10.0,
            1.0,
        ))
    }

    fn mgr(design: Design) -> SegmentMgr {
        SegmentMgr::with_seed(design, 7, &DiagnosticSink::new()).unwrap()
    }

    fn seg_of(m: &SegmentMgr, node: NodeId) -> SegmentId {
        m.segments_of(node)[0]
    }

    fn row_seg(m: &SegmentMgr, row: u32) -> SegmentId {
        m.segments_in_row(RowId::from_raw(row))[0]
    }

    #[test]
    fn maps_cells_and_warns_on_unmapped() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 15.0, 4.0, 10.0));
        let off = d.add_node(Node::movable("off", 30.0, 13.0, 4.0, 10.0));
        let big = d.add_node(Node::movable("big", 60.0, 10.0, 4.0, 20.0));
        d.add_node(Node::fixed("pad", 0.0, 0.0, 0.0, 0.0));
        let sink = DiagnosticSink::new();
        let m = SegmentMgr::with_seed(d, 1, &sink).unwrap();

        assert_eq!(m.candidates(), &[a, off]);
        assert_eq!(m.segments_of(a), &[row_seg(&m, 1)]);
        assert!(m.segments_of(off).is_empty());
        assert!(m.segments_of(big).is_empty());

        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.to_string(), "W401");
        assert!(diags[0].message.contains("'off'"));
    }

    #[test]
    fn inconsistent_design_is_rejected() {
        let mut d = three_rows();
        d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        d.pins.push(Pin {
            id: PinId::from_raw(0),
            node: NodeId::from_raw(9),
            edge: EdgeId::from_raw(0),
            dx: 0.0,
            dy: 0.0,
        });
        let err = SegmentMgr::with_seed(d, 1, &DiagnosticSink::new()).unwrap_err();
        assert!(err.to_string().contains("missing node"));
    }

    #[test]
    fn move_to_other_segment_snaps_to_site() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (row_seg(&m, 0), row_seg(&m, 1));

        assert!(m.try_move_to_segment(a, Point::new(12.0, 5.0), s0, Point::new(50.3, 15.0), s1));
        let mv = m.pending().moves[0];
        assert_eq!(mv.new, Point::new(50.0, 15.0));
        assert_eq!((mv.old_seg, mv.new_seg), (s0, s1));
        // Nothing moves before acceptance.
        assert_eq!(m.design().node(a).position(), Point::new(12.0, 5.0));

        m.accept_move();
        assert!(m.pending().is_empty());
        assert_eq!(m.design().node(a).position(), Point::new(50.0, 15.0));
        assert_eq!(m.segments_of(a), &[s1]);
        assert!(m.segment(s0).cells.is_empty());
        assert_eq!(m.segment(s1).cells, vec![a]);
        assert!(m.is_legal());
    }

    #[test]
    fn move_within_segment_requires_same_segment() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (row_seg(&m, 0), row_seg(&m, 1));
        let old = Point::new(12.0, 5.0);

        assert!(!m.try_move_within_segment(a, old, s0, Point::new(60.0, 15.0), s1));
        assert!(!m.try_move_to_segment(a, old, s0, Point::new(60.0, 5.0), s0));
        assert!(m.try_move_within_segment(a, old, s0, Point::new(60.0, 5.0), s0));
        assert_eq!(m.pending().moves[0].new, Point::new(60.0, 5.0));
    }

    #[test]
    fn move_is_clamped_into_its_gap() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 2.0, 15.0, 4.0, 10.0));
        d.add_node(Node::movable("wall", 25.0, 5.0, 10.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (row_seg(&m, 0), row_seg(&m, 1));

        // Gap right of the wall starts at x = 30.
        assert!(m.try_move_to_segment(a, Point::new(2.0, 15.0), s1, Point::new(30.5, 5.0), s0));
        assert_eq!(m.pending().moves[0].new, Point::new(32.0, 5.0));
    }

    #[test]
    fn occupied_target_declines_and_clears_pending() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 15.0, 4.0, 10.0));
        d.add_node(Node::movable("b", 50.0, 5.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (row_seg(&m, 0), row_seg(&m, 1));
        let old = Point::new(12.0, 15.0);

        assert!(m.try_move_to_segment(a, old, s1, Point::new(80.0, 5.0), s0));
        assert!(!m.pending().is_empty());
        assert!(!m.try_move_to_segment(a, old, s1, Point::new(50.0, 5.0), s0));
        assert!(m.pending().is_empty());
    }

    #[test]
    fn region_mismatch_declines_move() {
        let mut arch =
            Architecture::with_uniform_rows(Rect::new(0.0, 0.0, 100.0, 30.0), 3, 10.0, 1.0);
        arch.add_region(Region {
            id: 2,
            rects: vec![Rect::new(0.0, 20.0, 100.0, 30.0)],
        });
        let mut d = Design::new(arch);
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s2) = (row_seg(&m, 0), row_seg(&m, 2));
        assert_eq!(m.segment(s2).region, 2);
        assert!(!m.try_move_to_segment(a, Point::new(12.0, 5.0), s0, Point::new(50.0, 25.0), s2));
        assert!(m.pending().is_empty());
    }

    #[test]
    fn swap_exchanges_origins() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let b = d.add_node(Node::movable("b", 52.0, 15.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (seg_of(&m, a), seg_of(&m, b));

        assert!(m.try_swap(a, Point::new(12.0, 5.0), s0, Point::new(51.0, 15.0), s1));
        assert_eq!(m.pending().moves.len(), 2);
        assert_eq!(m.pending().new_position(a), Some(Point::new(52.0, 15.0)));
        assert_eq!(m.pending().new_position(b), Some(Point::new(12.0, 5.0)));

        m.accept_move();
        assert_eq!(m.design().node(a).position(), Point::new(52.0, 15.0));
        assert_eq!(m.design().node(b).position(), Point::new(12.0, 5.0));
        assert_eq!(m.segments_of(a), &[s1]);
        assert_eq!(m.segments_of(b), &[s0]);
        assert!(m.is_legal());
    }

    #[test]
    fn swap_declines_when_partner_does_not_fit() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 2.0, 5.0, 4.0, 10.0));
        d.add_node(Node::movable("n", 9.0, 5.0, 10.0, 10.0));
        let b = d.add_node(Node::movable("b", 55.0, 15.0, 10.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (seg_of(&m, a), seg_of(&m, b));

        // `b` is 10 wide and would stick out past the row start at a's old spot.
        assert!(!m.try_swap(a, Point::new(2.0, 5.0), s0, Point::new(55.0, 15.0), s1));
        assert!(m.pending().is_empty());
    }

    #[test]
    fn reject_discards_pending() {
        let mut d = three_rows();
        let a = d.add_node(Node::movable("a", 12.0, 5.0, 4.0, 10.0));
        let mut m = mgr(d);
        let (s0, s1) = (row_seg(&m, 0), row_seg(&m, 1));
        assert!(m.try_move_to_segment(a, Point::new(12.0, 5.0), s0, Point::new(50.0, 15.0), s1));
        m.reject_move();
        assert!(m.pending().is_empty());
        assert_eq!(m.design().node(a).position(), Point::new(12.0, 5.0));
        assert_eq!(m.segments_of(a), &[s0]);
    }

    #[test]
    fn resort_orders_cells_by_x() {
        let mut d = three_rows();
        let right = d.add_node(Node::movable("r", 80.0, 5.0, 4.0, 10.0));
        let left = d.add_node(Node::movable("l", 10.0, 5.0, 4.0, 10.0));
        let m = mgr(d);
        assert_eq!(m.segment(row_seg(&m, 0)).cells, vec![left, right]);
        assert!(m.is_legal());
    }
}
