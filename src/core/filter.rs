//! Prerequisite filtering, pass-rate admission and the final-semester relaxation

use crate::core::aggregate::Candidate;
use crate::core::models::{Catalog, CourseCatalogEntry};
use crate::core::store::TranscriptStore;
use std::collections::BTreeSet;

/// A candidate that passed every admission check, joined with its catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedCandidate {
    /// Peer statistics
    pub candidate: Candidate,
    /// Catalog entry (name, credits)
    pub course: CourseCatalogEntry,
}

/// Apply the admission rules to aggregated candidates.
///
/// A candidate is dropped when the student already passed it, when its pass
/// rate is below the slot's threshold, when it is missing from the catalog,
/// or (ordinary slots only) when a prerequisite is missing from `passed` or
/// cannot be looked up. In the final semester prerequisites are only logged.
#[must_use]
pub fn admit(
    candidates: Vec<Candidate>,
    passed: &BTreeSet<String>,
    catalog: &Catalog,
    store: &dyn TranscriptStore,
) -> Vec<AdmittedCandidate> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let code = candidate.code.as_str();
            if passed.contains(code) {
                return None;
            }

            let threshold = candidate.kind.pass_rate_threshold();
            if candidate.pass_rate < threshold {
                crate::debug!(
                    "{code} in {}: pass rate {:.2} below {threshold}",
                    candidate.slot,
                    candidate.pass_rate
                );
                return None;
            }

            let Some(course) = catalog.get(code) else {
                crate::warn!("{code} is not in the course catalog; skipping");
                return None;
            };

            if !prerequisites_allow(&candidate, passed, store) {
                return None;
            }

            Some(AdmittedCandidate {
                course: course.clone(),
                candidate,
            })
        })
        .collect()
}

fn prerequisites_allow(candidate: &Candidate, passed: &BTreeSet<String>, store: &dyn TranscriptStore) -> bool {
    let code = candidate.code.as_str();
    let enforced = candidate.kind.enforces_prerequisites();

    let prerequisites = match store.prerequisites(code) {
        Ok(list) => list,
        Err(e) if enforced => {
            crate::warn!("Prerequisite lookup failed for {code}: {e}; skipping");
            return false;
        }
        Err(e) => {
            crate::warn!("Prerequisite lookup failed for {code}: {e}");
            return true;
        }
    };

    let missing: Vec<&str> = prerequisites
        .iter()
        .filter(|p| !passed.contains(*p))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        return true;
    }

    if enforced {
        crate::debug!("{code}: missing prerequisites {}", missing.join(", "));
        false
    } else {
        crate::debug!(
            "{code} in {}: prerequisites {} waived for the final semester",
            candidate.slot,
            missing.join(", ")
        );
        true
    }
}
