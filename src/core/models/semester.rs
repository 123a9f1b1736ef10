//! Semester slot and classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semesters per academic year (two regular terms plus a summer term)
pub const SEMESTERS_PER_YEAR: u32 = 3;

/// Highest study year accepted from input data
pub const MAX_STUDY_YEAR: u32 = 10;

/// A (year, semester) position in a study program. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SemesterSlot {
    /// Study year, starting at 1
    pub year: u32,
    /// Semester within the year, 1..=3
    pub semester: u32,
}

impl SemesterSlot {
    /// The final semester of the program, reserved for the thesis
    pub const FINAL: Self = Self::new(5, 1);

    /// Create a slot
    #[must_use]
    pub const fn new(year: u32, semester: u32) -> Self {
        Self { year, semester }
    }

    /// The slot immediately after this one; semester 3 wraps to semester 1 of the next year.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.semester >= SEMESTERS_PER_YEAR {
            Self::new(self.year.saturating_add(1), 1)
        } else {
            Self::new(self.year, self.semester + 1)
        }
    }

    /// Classification of this slot
    #[must_use]
    pub fn kind(self) -> SemesterKind {
        if self == Self::FINAL {
            SemesterKind::Final
        } else {
            SemesterKind::Ordinary
        }
    }
}

impl From<(u32, u32)> for SemesterSlot {
    fn from((year, semester): (u32, u32)) -> Self {
        Self::new(year, semester)
    }
}

impl fmt::Display for SemesterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Year {}, Semester {}", self.year, self.semester)
    }
}

/// Whether admission rules are the regular ones or the relaxed final-semester ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemesterKind {
    /// Prerequisites enforced, pass rate ≥ 0.7
    Ordinary,
    /// Prerequisites waived, pass rate ≥ 0.6
    Final,
}

impl SemesterKind {
    /// Minimum peer pass rate for a candidate to be admitted
    #[must_use]
    pub const fn pass_rate_threshold(self) -> f64 {
        match self {
            Self::Ordinary => 0.7,
            Self::Final => 0.6,
        }
    }

    /// Whether prerequisites must be satisfied before recommending a course
    #[must_use]
    pub const fn enforces_prerequisites(self) -> bool {
        matches!(self, Self::Ordinary)
    }
}
