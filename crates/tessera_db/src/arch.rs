//! Chip bounds, placement rows and placement regions.

use crate::ids::RowId;
use serde::{Deserialize, Serialize};
use tessera_common::Rect;

/// Region-id of cells and segments not claimed by any explicit region.
pub const DEFAULT_REGION: u32 = 0;

/// A horizontal placement track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Position in the bottom-up row order.
    pub id: RowId,
    /// Bottom edge.
    pub bottom: f64,
    /// Height of one cell row.
    pub height: f64,
    /// Left end of the row.
    pub xmin: f64,
    /// Right end of the row.
    pub xmax: f64,
    /// Width of one placement site; cell left edges snap to this grid.
    pub site_width: f64,
}

impl Row {
    /// Creates a row. The id is assigned by [`Architecture::add_row`].
    pub fn new(bottom: f64, height: f64, xmin: f64, xmax: f64, site_width: f64) -> Self {
        Self {
            id: RowId::from_raw(0),
            bottom,
            height,
            xmin,
            xmax,
            site_width,
        }
    }

    /// Returns the top edge.
    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    /// Rounds `x` down onto the site grid.
    pub fn snap_down(&self, x: f64) -> f64 {
        if self.site_width <= 0.0 {
            return x;
        }
        self.xmin + ((x - self.xmin) / self.site_width).floor() * self.site_width
    }

    /// Rounds `x` up onto the site grid.
    pub fn snap_up(&self, x: f64) -> f64 {
        if self.site_width <= 0.0 {
            return x;
        }
        self.xmin + ((x - self.xmin) / self.site_width).ceil() * self.site_width
    }

    /// Rounds `x` to the nearest site.
    pub fn snap_nearest(&self, x: f64) -> f64 {
        if self.site_width <= 0.0 {
            return x;
        }
        self.xmin + ((x - self.xmin) / self.site_width).round() * self.site_width
    }
}

/// A placement group: cells tagged with `id` may only occupy segments
/// inside `rects`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Region-id; never [`DEFAULT_REGION`].
    pub id: u32,
    /// Rectangles making up the region.
    pub rects: Vec<Rect>,
}

/// Chip bounds plus rows and regions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Architecture {
    /// Chip (core) bounds.
    pub bounds: Rect,
    /// Rows sorted bottom-up; `rows[i].id == RowId(i)`.
    pub rows: Vec<Row>,
    /// Explicit regions.
    pub regions: Vec<Region>,
}

impl Architecture {
    /// Creates an architecture with no rows.
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            rows: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Creates an architecture with `count` identical rows stacked from the
    /// bottom of `bounds`.
    pub fn with_uniform_rows(bounds: Rect, count: usize, row_height: f64, site_width: f64) -> Self {
        let mut arch = Self::new(bounds);
        for i in 0..count {
            arch.add_row(Row::new(
                bounds.ymin + i as f64 * row_height,
                row_height,
                bounds.xmin,
                bounds.xmax,
                site_width,
            ));
        }
        arch
    }

    /// Adds a row, keeping rows sorted bottom-up, and returns its id.
    pub fn add_row(&mut self, row: Row) -> RowId {
        let bottom = row.bottom;
        self.rows.push(row);
        self.rows.sort_by(|a, b| a.bottom.total_cmp(&b.bottom));
        for (i, r) in self.rows.iter_mut().enumerate() {
            r.id = RowId::from_index(i);
        }
        let pos = self
            .rows
            .iter()
            .position(|r| r.bottom == bottom)
            .unwrap_or(self.rows.len() - 1);
        RowId::from_index(pos)
    }

    /// Adds a region.
    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Returns the row with the given id.
    pub fn row(&self, id: RowId) -> &Row {
        &self.rows[id.index()]
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the height of a single-height row, if there are any rows.
    pub fn row_height(&self) -> Option<f64> {
        self.rows.first().map(|r| r.height)
    }

    /// Returns the row whose bottom edge is closest to `y`.
    ///
    /// Ties go to the lower row. Values outside the row stack clamp to the
    /// first or last row.
    pub fn find_closest_row(&self, y: f64) -> Option<RowId> {
        if self.rows.is_empty() {
            return None;
        }
        let idx = self.rows.partition_point(|r| r.bottom < y);
        if idx == 0 {
            return Some(RowId::from_index(0));
        }
        if idx == self.rows.len() {
            return Some(RowId::from_index(idx - 1));
        }
        let below = y - self.rows[idx - 1].bottom;
        let above = self.rows[idx].bottom - y;
        if below <= above {
            Some(RowId::from_index(idx - 1))
        } else {
            Some(RowId::from_index(idx))
        }
    }

    /// Returns the row whose bottom edge equals `bottom` within `eps`.
    pub fn row_at(&self, bottom: f64, eps: f64) -> Option<RowId> {
        let id = self.find_closest_row(bottom)?;
        if (self.row(id).bottom - bottom).abs() <= eps {
            Some(id)
        } else {
            None
        }
    }
}
