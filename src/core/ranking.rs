//! Deduplication, grouping and ranking of admitted candidates

use crate::core::clustering::training::DEFAULT_CAPSTONE_CODE;
use crate::core::filter::AdmittedCandidate;
use crate::core::models::recommendation::round_to;
use crate::core::models::{Recommendation, RecommendationGroup, SemesterKind};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Maximum recommendations returned
pub const DEFAULT_MAX_RESULTS: usize = 15;
/// Maximum courses in the final-semester supplemental group
pub const DEFAULT_SUPPLEMENTAL_LIMIT: usize = 10;

/// Ranking parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingOptions {
    /// Course listed in its own capstone group and exempt from deduplication
    pub capstone_code: String,
    /// Cap on the final list
    pub max_results: usize,
    /// Cap on the final-semester supplemental group
    pub supplemental_limit: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            capstone_code: DEFAULT_CAPSTONE_CODE.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            supplemental_limit: DEFAULT_SUPPLEMENTAL_LIMIT,
        }
    }
}

/// Whether a later occurrence of a course replaces the current pick.
///
/// Against the final semester the final occurrence wins unless the earlier
/// frequency exceeds it by more than 20% of the earlier frequency. Between
/// ordinary semesters the earlier one stays unless the later frequency is
/// more than 20% higher.
#[must_use]
pub const fn later_replaces(earlier: usize, later: usize, later_kind: SemesterKind) -> bool {
    match later_kind {
        SemesterKind::Final => 5 * earlier.saturating_sub(later) <= earlier,
        SemesterKind::Ordinary => 5 * later > 6 * earlier,
    }
}

/// Keep one occurrence per course code (the capstone is handled separately)
fn deduplicate(admitted: Vec<AdmittedCandidate>) -> Vec<AdmittedCandidate> {
    let mut by_code: BTreeMap<String, Vec<AdmittedCandidate>> = BTreeMap::new();
    for item in admitted {
        by_code.entry(item.candidate.code.clone()).or_default().push(item);
    }

    by_code
        .into_values()
        .filter_map(|mut occurrences| {
            occurrences.sort_by_key(|o| o.candidate.slot);
            occurrences.into_iter().reduce(|current, later| {
                if later_replaces(current.candidate.frequency, later.candidate.frequency, later.candidate.kind) {
                    crate::debug!(
                        "{}: {} replaces {}",
                        later.candidate.code,
                        later.candidate.slot,
                        current.candidate.slot
                    );
                    later
                } else {
                    current
                }
            })
        })
        .collect()
}

/// Frequency descending, then average score descending, then code
fn by_popularity(a: &AdmittedCandidate, b: &AdmittedCandidate) -> Ordering {
    b.candidate
        .frequency
        .cmp(&a.candidate.frequency)
        .then_with(|| b.candidate.avg_score.total_cmp(&a.candidate.avg_score))
        .then_with(|| a.candidate.code.cmp(&b.candidate.code))
}

/// Turn admitted candidates into the ordered recommendation list.
///
/// # Arguments
/// * `admitted` - Candidates from every target semester
/// * `options` - Capstone code and list caps
/// * `cohort_label` - How the peer cohort is described in reason text
///
/// # Returns
/// Capstone group, then the final-semester supplemental group, then the
/// remaining semesters in chronological order; at most `max_results` entries
#[must_use]
pub fn rank(admitted: Vec<AdmittedCandidate>, options: &RankingOptions, cohort_label: &str) -> Vec<Recommendation> {
    let (capstone, others): (Vec<_>, Vec<_>) = admitted
        .into_iter()
        .partition(|a| a.candidate.code == options.capstone_code);

    let capstone = capstone.into_iter().min_by(|a, b| {
        // the final-semester occurrence first, then the most common one
        (a.candidate.kind != SemesterKind::Final)
            .cmp(&(b.candidate.kind != SemesterKind::Final))
            .then_with(|| by_popularity(a, b))
    });

    let (mut supplemental, mut regular): (Vec<_>, Vec<_>) = deduplicate(others)
        .into_iter()
        .partition(|a| a.candidate.kind == SemesterKind::Final);

    supplemental.sort_by(by_popularity);
    supplemental.truncate(options.supplemental_limit);
    regular.sort_by(|a, b| a.candidate.slot.cmp(&b.candidate.slot).then_with(|| by_popularity(a, b)));

    let mut out: Vec<Recommendation> = capstone
        .into_iter()
        .map(|a| to_recommendation(a, RecommendationGroup::Capstone, cohort_label))
        .chain(
            supplemental
                .into_iter()
                .map(|a| to_recommendation(a, RecommendationGroup::FinalSupplemental, cohort_label)),
        )
        .chain(
            regular
                .into_iter()
                .map(|a| to_recommendation(a, RecommendationGroup::Regular, cohort_label)),
        )
        .collect();

    out.truncate(options.max_results);
    out
}

fn to_recommendation(admitted: AdmittedCandidate, group: RecommendationGroup, cohort_label: &str) -> Recommendation {
    let AdmittedCandidate { candidate, course } = admitted;
    let avg_score = round_to(candidate.avg_score, 2);
    let reason = format!(
        "Taken by {}/{} similar {cohort_label} with an average score of {avg_score:.2}",
        candidate.frequency, candidate.cohort_size
    );

    Recommendation {
        code: candidate.code,
        name: course.name,
        credits: course.credits,
        frequency: candidate.frequency,
        avg_score,
        pass_rate: round_to(candidate.pass_rate * 100.0, 1),
        target: candidate.slot,
        reason,
        group,
    }
}
