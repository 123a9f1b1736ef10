//! Plan synthesis: replay each cluster representative's transcript as a study plan

use crate::core::clustering::artifact::ModelArtifact;
use crate::core::features::passed_codes;
use crate::core::models::transcript::PASSING_SCORE;
use crate::core::models::{Catalog, LearningPlan, PlannedCourse, SemesterSlot, StudySemesterPlan, TranscriptRecord};
use crate::core::progress::REQUIRED_CREDITS;
use crate::core::semester::latest_completed_slot;
use crate::core::store::TranscriptStore;
use std::collections::BTreeMap;

/// Mean of a student's passing scores, `None` when nothing was passed with a score
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_passing_score(records: &[TranscriptRecord]) -> Option<f64> {
    let scores: Vec<f64> = records
        .iter()
        .filter_map(|r| r.score)
        .filter(|s| *s >= PASSING_SCORE)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// The member of `cluster` with the highest mean passing score.
///
/// Members are visited in student-id order and only a strictly higher mean
/// replaces the current pick, so ties go to the lowest id. Members whose
/// transcript cannot be read are skipped.
#[must_use]
pub fn representative(
    artifact: &ModelArtifact,
    cluster: usize,
    store: &dyn TranscriptStore,
) -> Option<(String, Vec<TranscriptRecord>)> {
    let mut best: Option<(f64, String, Vec<TranscriptRecord>)> = None;

    for member in artifact.members(cluster) {
        let rows = match store.transcript(member) {
            Ok(rows) => rows,
            Err(e) => {
                crate::warn!("Skipping cluster {cluster} member {member}: {e}");
                continue;
            }
        };
        let Some(mean) = mean_passing_score(&rows) else {
            continue;
        };
        if best.as_ref().map_or(true, |(top, _, _)| mean > *top) {
            best = Some((mean, member.to_string(), rows));
        }
    }

    best.map(|(mean, id, rows)| {
        crate::debug!("Cluster {cluster} representative {id} (mean {mean:.2})");
        (id, rows)
    })
}

/// Build the plan for one cluster from the representative's full transcript.
///
/// Every attempt is replayed, failed ones and retakes included. When the
/// student has progress, only semesters strictly after their latest completed
/// semester are kept, and courses they already passed are left out.
#[must_use]
pub fn plan_for_cluster(
    cluster: usize,
    distance: f64,
    representative: Option<(String, Vec<TranscriptRecord>)>,
    student: &[TranscriptRecord],
    catalog: &Catalog,
) -> LearningPlan {
    let mut plan = LearningPlan::empty(cluster, distance, REQUIRED_CREDITS);
    let Some((id, rows)) = representative else {
        return plan;
    };

    let cutoff = latest_completed_slot(student);
    let passed = passed_codes(student);
    let mut semesters: BTreeMap<SemesterSlot, StudySemesterPlan> = BTreeMap::new();

    for row in &rows {
        let slot = SemesterSlot::from(row.slot());
        if cutoff.is_some_and(|c| slot <= c) || passed.contains(&row.course_code) {
            continue;
        }
        let name = catalog
            .get(&row.course_code)
            .map_or_else(|| row.course_code.clone(), |c| c.name.clone());
        semesters
            .entry(slot)
            .or_insert_with(|| StudySemesterPlan::new(slot))
            .add_course(PlannedCourse {
                code: row.course_code.clone(),
                name,
                credits: row.credits,
                score: row.score,
            });
    }

    plan.representative = Some(id);
    for semester in semesters.into_values() {
        plan.push_semester(semester);
    }
    plan
}

/// Plans for every cluster, ascending by distance (ties by cluster id).
#[must_use]
pub fn synthesize_plans(
    artifact: &ModelArtifact,
    distances: &BTreeMap<usize, f64>,
    student: &[TranscriptRecord],
    store: &dyn TranscriptStore,
    catalog: &Catalog,
) -> Vec<LearningPlan> {
    let mut plans: Vec<LearningPlan> = (0..artifact.k)
        .map(|cluster| {
            let distance = distances
                .get(&cluster)
                .copied()
                .unwrap_or(crate::core::distance::SENTINEL_DISTANCE);
            let rep = representative(artifact, cluster, store);
            plan_for_cluster(cluster, distance, rep, student, catalog)
        })
        .collect();

    plans.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.cluster_id.cmp(&b.cluster_id))
    });
    plans
}
