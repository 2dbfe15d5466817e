//! Placement fingerprints for reproducibility checks.

use crate::geom::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 fingerprint of a sequence of positions.
///
/// Two runs on the same design with the same seed must produce the same
/// `PlacementHash`. Coordinates are hashed by their exact bit patterns.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementHash([u8; 16]);

impl PlacementHash {
    /// Computes a hash from a raw byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes a hash over positions in iteration order.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut bytes = Vec::new();
        for p in points {
            bytes.extend_from_slice(&p.x.to_bits().to_le_bytes());
            bytes.extend_from_slice(&p.y.to_bits().to_le_bytes());
        }
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for PlacementHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PlacementHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlacementHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
