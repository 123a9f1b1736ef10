//! Offline model training

use super::artifact::{ModelArtifact, ModelRepository, TrainingMode};
use super::kmeans::{KMeans, DEFAULT_CLUSTERS};
use super::normalization::NormalizationParameters;
use crate::core::error::{AdvisorError, Result};
use crate::core::features::{group_by_student, CourseOrdering};
use crate::core::models::transcript::PEER_PASS_SCORE;
use crate::core::models::{Catalog, TranscriptRecord};
use crate::core::store::{PopulationFilter, TranscriptStore};

/// Default capstone (graduation thesis) course code
pub const DEFAULT_CAPSTONE_CODE: &str = "CT555";

/// Training configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOptions {
    /// Population selection
    pub mode: TrainingMode,
    /// Capstone course used by [`TrainingMode::CapstoneGraduates`]
    pub capstone_code: String,
    /// Clustering parameters
    pub kmeans: KMeans,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            mode: TrainingMode::default(),
            capstone_code: DEFAULT_CAPSTONE_CODE.to_string(),
            kmeans: KMeans::default(),
        }
    }
}

/// Students retained for training, grouped in first-appearance order.
///
/// In capstone mode a student is kept when they graduated on time and have a
/// capstone row with score ≥ 5.0.
#[must_use]
pub fn select_population(
    population: &[TranscriptRecord],
    mode: TrainingMode,
    capstone_code: &str,
) -> Vec<(String, Vec<TranscriptRecord>)> {
    let grouped = group_by_student(population);
    match mode {
        TrainingMode::All => grouped,
        TrainingMode::CapstoneGraduates => grouped
            .into_iter()
            .filter(|(_, rows)| {
                rows.iter().any(|r| {
                    r.graduated
                        && r.on_time
                        && r.course_code == capstone_code
                        && r.score.is_some_and(|s| s >= PEER_PASS_SCORE)
                })
            })
            .collect(),
    }
}

/// Vectorize one training student, rejecting rows that would poison the fit
fn training_vector(ordering: &CourseOrdering, rows: &[TranscriptRecord]) -> std::result::Result<Vec<f64>, String> {
    if let Some(bad) = rows
        .iter()
        .find(|r| !r.credits.is_finite() || r.credits < 0.0)
    {
        return Err(format!(
            "invalid credits {} for {}",
            bad.credits, bad.course_code
        ));
    }
    Ok(ordering.vectorize(rows))
}

/// Fit normalization and K-means on a historical population.
///
/// # Arguments
/// * `population` - Transcript rows of every candidate student
/// * `catalog` - Current catalog; fixes the feature ordering
/// * `options` - Population mode, capstone code and clustering parameters
///
/// # Returns
/// An unpublished artifact (version 0)
///
/// # Errors
/// Returns `Training` unless `k` is [`DEFAULT_CLUSTERS`],
/// `InsufficientTrainingPopulation` when fewer than `k` distinct students
/// remain after filtering, `DataUnavailable` for an empty catalog
pub fn train_model(
    population: &[TranscriptRecord],
    catalog: &Catalog,
    options: &TrainingOptions,
) -> Result<ModelArtifact> {
    if options.kmeans.k != DEFAULT_CLUSTERS {
        return Err(AdvisorError::Training(format!(
            "models must have {DEFAULT_CLUSTERS} clusters, got {}",
            options.kmeans.k
        )));
    }
    if catalog.is_empty() {
        return Err(AdvisorError::data_unavailable("course catalog is empty"));
    }
    let ordering = CourseOrdering::from_catalog(catalog);
    let selected = select_population(population, options.mode, &options.capstone_code);
    crate::debug!(
        "Training population ({}): {} students selected",
        options.mode,
        selected.len()
    );

    let mut ids = Vec::with_capacity(selected.len());
    let mut vectors = Vec::with_capacity(selected.len());
    for (student, rows) in &selected {
        match training_vector(&ordering, rows) {
            Ok(vector) => {
                ids.push(student.clone());
                vectors.push(vector);
            }
            Err(reason) => crate::warn!("Skipping student {student} in training: {reason}"),
        }
    }

    let required = options.kmeans.k;
    if vectors.len() < required {
        return Err(AdvisorError::InsufficientTrainingPopulation {
            found: vectors.len(),
            required,
        });
    }

    let normalization = NormalizationParameters::fit(&vectors)
        .ok_or_else(|| AdvisorError::Training("no vectors to normalize".to_string()))?;
    let normalized: Vec<Vec<f64>> = vectors.iter().map(|v| normalization.transform(v)).collect();

    let fit = options.kmeans.fit(&normalized).map_err(AdvisorError::Training)?;
    crate::info!(
        "Trained {} clusters on {} students (inertia {:.4})",
        required,
        ids.len(),
        fit.inertia
    );

    Ok(ModelArtifact {
        version: 0,
        mode: options.mode,
        k: required,
        dimension: ordering.dimension(),
        course_order: ordering,
        normalization,
        centroids: fit.centroids,
        assignments: ids.into_iter().zip(fit.labels).collect(),
        inertia: fit.inertia,
    })
}

/// Train from a store and publish through a repository.
///
/// # Errors
/// Propagates store, training and repository errors; on any failure the
/// repository's existing artifact is left untouched
pub fn train_and_publish(
    store: &dyn TranscriptStore,
    repository: &dyn ModelRepository,
    options: &TrainingOptions,
) -> Result<ModelArtifact> {
    let catalog = store.course_catalog()?;
    let population = store.historical_population(PopulationFilter::All)?;
    let artifact = train_model(&population, &catalog, options)?;
    repository.save(artifact)
}
