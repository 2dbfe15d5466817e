//! Opaque ID newtypes for placement entities.
//!
//! All ids are thin `u32` wrappers used as indices into the flat vectors of
//! the design and the segment manager. They are `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Creates an ID from a vector index.
            pub fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the vector index.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// ID of a node (cell).
    NodeId
);

define_id!(
    /// ID of a pin.
    PinId
);

define_id!(
    /// ID of an edge (net).
    EdgeId
);

define_id!(
    /// ID of a placement row; rows are numbered bottom-up.
    RowId
);

define_id!(
    /// ID of a segment owned by the segment manager.
    SegmentId
);
