//! Diagnostic codes: a category letter plus a three-digit number.
//!
//! | Code  | Meaning                                     |
//! |-------|---------------------------------------------|
//! | P306  | global swap pass finished                   |
//! | P307  | global swap run finished                    |
//! | P308  | vertical swap pass finished                 |
//! | P309  | vertical swap run finished                  |
//! | P334  | global swap generator counters              |
//! | P336  | vertical swap generator counters            |
//! | W401  | movable cell outside every row segment      |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which family a code belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// `E`: internal failures.
    Error,
    /// `W`: problems with the input design.
    Warning,
    /// `P`: placement optimizer progress.
    Placement,
}

impl Category {
    /// The prefix letter.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Placement => 'P',
        }
    }
}

/// A code such as `P306`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// Family.
    pub category: Category,
    /// Number within the family.
    pub number: u16,
}

impl DiagnosticCode {
    /// Builds a code from its parts.
    pub fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }

    /// A `P` code.
    pub fn placement(number: u16) -> Self {
        Self::new(Category::Placement, number)
    }

    /// A `W` code.
    pub fn warning(number: u16) -> Self {
        Self::new(Category::Warning, number)
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
