//! Semester-target resolution

use crate::core::models::{SemesterSlot, TranscriptRecord};

/// Latest (year, semester) in which the student passed a course.
///
/// This is the student's current position: failed or in-progress attempts
/// in a later semester do not move it forward.
#[must_use]
pub fn latest_completed_slot(records: &[TranscriptRecord]) -> Option<SemesterSlot> {
    records
        .iter()
        .filter(|r| r.is_passed())
        .map(|r| SemesterSlot::from(r.slot()))
        .max()
}

/// Semesters to recommend for, ascending and without duplicates.
///
/// The next semester is always included. From year 4 on, the final
/// semester (5,1) is added, plus (4,3) while semester 3 of year 4 is still
/// ahead. Third-year students from semester 2 also look ahead to (4,3) and
/// (5,1).
#[must_use]
pub fn resolve_targets(current: SemesterSlot) -> Vec<SemesterSlot> {
    let mut targets = vec![current.next()];

    if current.year == 4 {
        targets.push(SemesterSlot::FINAL);
        if current.semester < 3 {
            targets.push(SemesterSlot::new(4, 3));
        }
    } else if current.year == 3 && current.semester >= 2 {
        targets.push(SemesterSlot::new(4, 3));
        targets.push(SemesterSlot::FINAL);
    }

    targets.sort_unstable();
    targets.dedup();
    crate::debug!("Target semesters for {current}: {targets:?}");
    targets
}
