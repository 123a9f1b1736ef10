//! Candidate aggregation over a peer cohort

use crate::core::models::transcript::PEER_PASS_SCORE;
use crate::core::models::{SemesterKind, SemesterSlot, TranscriptRecord};
use std::collections::BTreeMap;

/// Peer statistics for one course in one target semester
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Course code
    pub code: String,
    /// Target semester
    pub slot: SemesterSlot,
    /// Admission rules that apply to the slot
    pub kind: SemesterKind,
    /// Peer rows for this course in the slot
    pub frequency: usize,
    /// Mean of peer scores ≥ 5.0 (0.0 if none)
    pub avg_score: f64,
    /// Share of peer rows with score ≥ 5.0, in [0, 1]
    pub pass_rate: f64,
    /// Number of peers in the cohort
    pub cohort_size: usize,
}

/// Aggregate cohort rows taken in `slot`, one candidate per course code.
///
/// # Arguments
/// * `cohort_rows` - Transcript rows of the peer cohort (any semester)
/// * `cohort_size` - Number of peers in the cohort
/// * `slot` - Target semester
///
/// # Returns
/// Candidates in course-code order; courses nobody took in `slot` are absent
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_slot(
    cohort_rows: &[TranscriptRecord],
    cohort_size: usize,
    slot: SemesterSlot,
) -> Vec<Candidate> {
    // code -> (rows, passing rows, sum of passing scores)
    let mut stats: BTreeMap<&str, (usize, usize, f64)> = BTreeMap::new();

    for row in cohort_rows.iter().filter(|r| SemesterSlot::from(r.slot()) == slot) {
        let entry = stats.entry(row.course_code.as_str()).or_insert((0, 0, 0.0));
        entry.0 += 1;
        if let Some(score) = row.score.filter(|s| *s >= PEER_PASS_SCORE) {
            entry.1 += 1;
            entry.2 += score;
        }
    }

    let candidates: Vec<Candidate> = stats
        .into_iter()
        .map(|(code, (frequency, passing, sum))| Candidate {
            code: code.to_string(),
            slot,
            kind: slot.kind(),
            frequency,
            avg_score: if passing > 0 { sum / passing as f64 } else { 0.0 },
            pass_rate: passing as f64 / frequency as f64,
            cohort_size,
        })
        .collect();

    crate::debug!("{} candidates for {slot}", candidates.len());
    candidates
}
