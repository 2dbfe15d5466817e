//! Physical netlist model for detailed placement.
//!
//! A [`Design`] holds flat vectors of [`Node`]s (cells), [`Pin`]s and
//! [`Edge`]s (nets) cross-referenced by opaque ids, plus the
//! [`Architecture`]: chip bounds, placement [`Row`]s and placement
//! [`Region`]s. Positions are node centres; pin offsets are relative to the
//! centre.

#![warn(missing_docs)]

pub mod arch;
pub mod data;
pub mod ids;
pub mod stats;

pub use arch::{Architecture, Region, Row, DEFAULT_REGION};
pub use data::{Design, Edge, Node, Pin, GEOM_EPS};
pub use ids::{EdgeId, NodeId, PinId, RowId, SegmentId};
pub use stats::DesignStats;
