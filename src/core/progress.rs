//! Credit progress tracking

use crate::core::models::recommendation::round_to;
use crate::core::models::{SemesterSlot, TranscriptRecord};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Credits required to graduate
pub const REQUIRED_CREDITS: f64 = 156.0;
/// Semesters in the standard program
pub const PLANNED_SEMESTERS: u32 = 9;

/// Credit totals and pace for one student. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditSummary {
    /// Credits of passed courses
    pub earned: f64,
    /// Credits required to graduate
    pub required: f64,
    /// `max(0, required - earned)`
    pub remaining: f64,
    /// Earned share of required, in percent (1 decimal)
    pub percentage: f64,
    /// Expected credits per semester (`required / 9`)
    pub per_semester_target: f64,
    /// Distinct semesters with at least one passed course (at least 1 once the student has rows)
    pub semesters_completed: u32,
    /// Semesters left in the standard program
    pub semesters_remaining: u32,
    /// `per_semester_target × semesters_completed`
    pub expected: f64,
    /// `max(0, expected - earned)`
    pub shortfall: f64,
    /// Whether the shortfall is at most half a semester's target
    pub on_pace: bool,
    /// Earned credits per study year
    pub credits_by_year: BTreeMap<u32, f64>,
}

/// Summarize a student's credits.
///
/// Each passed course code counts once, so a retake that passes again does
/// not earn its credits twice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn credit_summary(records: &[TranscriptRecord]) -> CreditSummary {
    let mut counted: BTreeSet<&str> = BTreeSet::new();
    let mut slots: BTreeSet<SemesterSlot> = BTreeSet::new();
    let mut credits_by_year: BTreeMap<u32, f64> = BTreeMap::new();
    let mut earned = 0.0;

    for record in records.iter().filter(|r| r.is_passed()) {
        slots.insert(SemesterSlot::from(record.slot()));
        if counted.insert(record.course_code.as_str()) {
            earned += record.credits;
            *credits_by_year.entry(record.year).or_insert(0.0) += record.credits;
        }
    }

    let slot_count = u32::try_from(slots.len()).unwrap_or(u32::MAX);
    let semesters_completed = if records.is_empty() { 0 } else { slot_count.max(1) };

    let per_semester_target = REQUIRED_CREDITS / f64::from(PLANNED_SEMESTERS);
    let expected = per_semester_target * f64::from(semesters_completed);
    let shortfall = (expected - earned).max(0.0);

    CreditSummary {
        earned,
        required: REQUIRED_CREDITS,
        remaining: (REQUIRED_CREDITS - earned).max(0.0),
        percentage: round_to((earned / REQUIRED_CREDITS * 100.0).min(100.0), 1),
        per_semester_target,
        semesters_completed,
        semesters_remaining: PLANNED_SEMESTERS.saturating_sub(semesters_completed),
        expected,
        shortfall,
        on_pace: shortfall <= 0.5 * per_semester_target,
        credits_by_year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pace_from_seven_semesters() {
        // 120 credits over 7 semesters
        let mut records = Vec::new();
        let slots = [(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3), (3, 1)];
        for (i, slot) in slots.iter().enumerate() {
            let credits = if i < 6 { 17.0 } else { 18.0 };
            records.push(TranscriptRecord::graded("S1", *slot, format!("C{i}"), credits, 7.0));
        }

        let summary = credit_summary(&records);
        assert!((summary.earned - 120.0).abs() < 1e-9);
        assert_eq!(summary.semesters_completed, 7);
        assert_eq!(summary.semesters_remaining, 2);
        assert!((summary.per_semester_target - 17.333).abs() < 1e-3);
        assert!((summary.expected - 121.333).abs() < 1e-3);
        assert!((summary.shortfall - 1.333).abs() < 1e-3);
        assert!(summary.on_pace);
        assert!((summary.remaining - 36.0).abs() < 1e-9);
        assert!((summary.percentage - 76.9).abs() < 1e-9);
    }

    #[test]
    fn test_behind_pace() {
        let records = vec![
            TranscriptRecord::graded("S1", (1, 1), "C1", 3.0, 8.0),
            TranscriptRecord::graded("S1", (1, 2), "C2", 3.0, 8.0),
        ];
        let summary = credit_summary(&records);
        assert!(!summary.on_pace);
    }

    #[test]
    fn test_failed_only_student_counts_one_semester() {
        let records = vec![TranscriptRecord::graded("S1", (1, 1), "C1", 3.0, 2.0)];
        let summary = credit_summary(&records);
        assert!(summary.earned.abs() < f64::EPSILON);
        assert_eq!(summary.semesters_completed, 1);
        assert!((summary.remaining - REQUIRED_CREDITS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_transcript() {
        let summary = credit_summary(&[]);
        assert_eq!(summary.semesters_completed, 0);
        assert_eq!(summary.semesters_remaining, PLANNED_SEMESTERS);
        assert!(summary.on_pace);
    }

    #[test]
    fn test_retake_counts_once_and_by_year() {
        let records = vec![
            TranscriptRecord::graded("S1", (1, 1), "C1", 3.0, 5.0),
            TranscriptRecord::graded("S1", (2, 1), "C1", 3.0, 9.0),
            TranscriptRecord::graded("S1", (2, 1), "C2", 4.0, 9.0),
        ];
        let summary = credit_summary(&records);
        assert!((summary.earned - 7.0).abs() < 1e-9);
        assert_eq!(summary.credits_by_year.get(&1), Some(&3.0));
        assert_eq!(summary.credits_by_year.get(&2), Some(&4.0));
    }
}
