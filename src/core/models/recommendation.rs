//! Recommendation output model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::semester::SemesterSlot;

/// Output group a recommendation is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationGroup {
    /// The graduation thesis in the final semester
    Capstone,
    /// Other courses peers took in the final semester
    FinalSupplemental,
    /// Courses for an ordinary target semester
    Regular,
}

impl fmt::Display for RecommendationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capstone => write!(f, "capstone"),
            Self::FinalSupplemental => write!(f, "final-supplemental"),
            Self::Regular => write!(f, "regular"),
        }
    }
}

/// A single ranked course suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Course code
    pub code: String,
    /// Course name
    pub name: String,
    /// Credit hours
    pub credits: f64,
    /// Number of peer rows for this course in the target semester
    pub frequency: usize,
    /// Mean of peer scores ≥ 5.0, rounded to 2 decimals
    pub avg_score: f64,
    /// Share of peer rows with score ≥ 5.0, as a percentage rounded to 1 decimal
    pub pass_rate: f64,
    /// Semester the course is suggested for
    pub target: SemesterSlot,
    /// Human-readable justification
    pub reason: String,
    /// Output group
    pub group: RecommendationGroup,
}

/// Round to a fixed number of decimals for display
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
