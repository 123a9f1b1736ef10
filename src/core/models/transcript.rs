//! Transcript record model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum score for a course to count as passed (earns credits)
pub const PASSING_SCORE: f64 = 4.0;

/// Minimum score for a peer result to count towards averages and pass rates
pub const PEER_PASS_SCORE: f64 = 5.0;

/// Enrollment status of a transcript row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    /// Completed with a passing result
    Passed,
    /// Completed without a passing result
    Failed,
    /// Currently enrolled
    InProgress,
}

impl FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "passed" | "pass" | "completed" | "đã học" | "đã qua" => Ok(Self::Passed),
            "failed" | "fail" | "không đạt" => Ok(Self::Failed),
            "in progress" | "in_progress" | "enrolled" | "đang học" => Ok(Self::InProgress),
            _ => Err(format!("Unknown course status: {s}")),
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::InProgress => write!(f, "in progress"),
        }
    }
}

/// One course attempt of one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    /// Owning student
    pub student_id: String,
    /// Study year (1-based)
    pub year: u32,
    /// Semester within the year (1..=3)
    pub semester: u32,
    /// Course code
    pub course_code: String,
    /// Credit hours of the course
    pub credits: f64,
    /// Score on a 10-point scale, if graded
    pub score: Option<f64>,
    /// Enrollment status
    pub status: CourseStatus,
    /// Student graduated without delay
    pub on_time: bool,
    /// Student has graduated
    pub graduated: bool,
}

impl TranscriptRecord {
    /// Create a graded record with default flags (not graduated)
    #[must_use]
    pub fn graded(
        student_id: impl Into<String>,
        (year, semester): (u32, u32),
        course_code: impl Into<String>,
        credits: f64,
        score: f64,
    ) -> Self {
        let status = if score >= PASSING_SCORE {
            CourseStatus::Passed
        } else {
            CourseStatus::Failed
        };
        Self {
            student_id: student_id.into(),
            year,
            semester,
            course_code: course_code.into(),
            credits,
            score: Some(score),
            status,
            on_time: false,
            graduated: false,
        }
    }

    /// Mark the record as belonging to an on-time graduate
    #[must_use]
    pub const fn on_time_graduate(mut self) -> Self {
        self.on_time = true;
        self.graduated = true;
        self
    }

    /// Whether this attempt earned the course's credits.
    ///
    /// A present score decides on its own; an ungraded row falls back to its status.
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.score.map_or(self.status == CourseStatus::Passed, |s| {
            s >= PASSING_SCORE
        })
    }

    /// (year, semester) slot of this record
    #[must_use]
    pub const fn slot(&self) -> (u32, u32) {
        (self.year, self.semester)
    }
}
