//! Floating-point points and rectangles.
//!
//! [`Rect`] doubles as a bounding-box accumulator: [`Rect::empty`] starts every
//! side at an infinite sentinel so the first [`Rect::expand`] snaps it onto
//! the first point.

use serde::{Deserialize, Serialize};

/// A location in placement coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub xmin: f64,
    /// Bottom edge.
    pub ymin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Top edge.
    pub ymax: f64,
}

impl Rect {
    /// Creates a rectangle from its four sides.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Returns an inverted rectangle ready to accumulate points.
    pub fn empty() -> Self {
        Self {
            xmin: f64::INFINITY,
            ymin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymax: f64::NEG_INFINITY,
        }
    }

    /// Resets all four sides to the accumulation sentinels.
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Returns `true` if no point has been accumulated yet.
    pub fn is_empty(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    /// Grows the rectangle to include `(x, y)`.
    pub fn expand(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
    }

    /// Returns `true` if `(x, y)` lies inside or on the boundary.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Returns `true` if `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.xmin >= self.xmin
            && other.xmax <= self.xmax
            && other.ymin >= self.ymin
            && other.ymax <= self.ymax
    }

    /// Returns the centre point.
    pub fn center(&self) -> Point {
        Point::new(0.5 * (self.xmin + self.xmax), 0.5 * (self.ymin + self.ymax))
    }

    /// Returns the width plus the height (the half perimeter).
    pub fn half_perimeter(&self) -> f64 {
        (self.xmax - self.xmin) + (self.ymax - self.ymin)
    }

    /// Returns the area, or zero for an empty rectangle.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::empty()
    }
}
