//! Shared foundational types used across the Tessera placement workspace.
//!
//! This crate provides the common result type, the floating-point geometry
//! scratch values used by the optimizer, and placement hashing for
//! reproducibility checks.

#![warn(missing_docs)]

pub mod geom;
pub mod hash;
pub mod result;

pub use geom::{Point, Rect};
pub use hash::PlacementHash;
pub use result::{InternalError, TesseraResult};
