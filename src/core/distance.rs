//! Vector distances and student-to-centroid distances

use crate::core::clustering::artifact::TrainedModel;
use crate::core::models::TranscriptRecord;
use std::collections::BTreeMap;

/// Distance reported for every cluster when no distance can be computed
pub const SENTINEL_DISTANCE: f64 = 999.0;

/// Squared Euclidean distance over the common prefix of two vectors
#[must_use]
pub fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Euclidean distance
///
/// Distance = sqrt(sum((a_i - b_i)^2))
#[must_use]
pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Distances from a student to each centroid, keyed by cluster id.
///
/// # Arguments
/// * `model` - The published model, if any
/// * `records` - The student's transcript rows (empty for an unknown student)
/// * `clusters` - Number of entries to report when no model is available
///
/// # Returns
/// Exactly one entry per cluster; every entry is [`SENTINEL_DISTANCE`] when
/// `model` is `None`
#[must_use]
pub fn cluster_distances(
    model: Option<&TrainedModel>,
    records: &[TranscriptRecord],
    clusters: usize,
) -> BTreeMap<usize, f64> {
    let Some(model) = model else {
        return sentinel_distances(clusters);
    };

    let normalized = model.embed(records);
    model
        .artifact()
        .centroids
        .iter()
        .enumerate()
        .map(|(id, centroid)| (id, euclidean(&normalized, centroid)))
        .collect()
}

/// The all-sentinel mapping used when the model or data is unavailable
#[must_use]
pub fn sentinel_distances(clusters: usize) -> BTreeMap<usize, f64> {
    (0..clusters).map(|id| (id, SENTINEL_DISTANCE)).collect()
}
