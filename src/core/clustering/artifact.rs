//! Persisted model artifact, its repository, and the published-model slot.

use super::kmeans::DEFAULT_CLUSTERS;
use super::normalization::NormalizationParameters;
use crate::core::error::{AdvisorError, Result};
use crate::core::features::CourseOrdering;
use crate::core::models::{Catalog, TranscriptRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

/// Which students the model was trained on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingMode {
    /// On-time graduates who passed the capstone course with score ≥ 5.0
    #[default]
    CapstoneGraduates,
    /// Every student in the store
    All,
}

impl FromStr for TrainingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capstone-graduates" | "capstone" | "graduates" => Ok(Self::CapstoneGraduates),
            "all" => Ok(Self::All),
            _ => Err(format!(
                "Unknown training mode: {s} (expected 'capstone-graduates' or 'all')"
            )),
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapstoneGraduates => write!(f, "capstone-graduates"),
            Self::All => write!(f, "all"),
        }
    }
}

/// The versioned (centroids, normalization) pair plus everything needed to
/// check it against the current catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Monotonic version; assigned by the repository on save
    pub version: u64,
    /// Population the model was fitted on
    pub mode: TrainingMode,
    /// Number of clusters
    pub k: usize,
    /// Feature dimension (catalog size at training time)
    pub dimension: usize,
    /// Course ordering the vectors were built with
    pub course_order: CourseOrdering,
    /// Normalization fitted on the training population
    pub normalization: NormalizationParameters,
    /// Centroids in normalized space
    pub centroids: Vec<Vec<f64>>,
    /// Cluster of every training student, keyed by student id
    pub assignments: BTreeMap<String, usize>,
    /// Within-cluster sum of squares of the fit
    pub inertia: f64,
}

impl ModelArtifact {
    /// Members of a cluster in student-id order
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .filter(move |&(_, &c)| c == cluster)
            .map(|(id, _)| id.as_str())
    }

    fn mismatch(&self, catalog_dimension: usize, detail: impl Into<String>) -> AdvisorError {
        AdvisorError::ModelMismatch {
            artifact_dimension: self.dimension,
            catalog_dimension,
            detail: detail.into(),
        }
    }
}

/// An artifact validated against the catalog it serves.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    artifact: ModelArtifact,
}

impl TrainedModel {
    /// Validate an artifact against the current catalog.
    ///
    /// # Errors
    /// Returns `ModelMismatch` when the artifact does not hold exactly
    /// [`DEFAULT_CLUSTERS`] clusters, or when the course ordering, the centroid
    /// shapes or the normalization shape disagree with the catalog.
    pub fn new(artifact: ModelArtifact, catalog: &Catalog) -> Result<Self> {
        let catalog_dimension = catalog.len();
        let expected = CourseOrdering::from_catalog(catalog);

        if artifact.k != DEFAULT_CLUSTERS {
            return Err(artifact.mismatch(
                catalog_dimension,
                format!("expected {DEFAULT_CLUSTERS} clusters, artifact has {}", artifact.k),
            ));
        }

        if artifact.dimension != catalog_dimension || artifact.course_order.dimension() != catalog_dimension {
            return Err(artifact.mismatch(catalog_dimension, "dimension differs from catalog"));
        }
        if artifact.course_order != expected {
            return Err(artifact.mismatch(catalog_dimension, "course ordering differs from catalog"));
        }
        if artifact.centroids.len() != artifact.k
            || artifact.centroids.iter().any(|c| c.len() != catalog_dimension)
        {
            return Err(artifact.mismatch(catalog_dimension, "centroid shape is inconsistent"));
        }
        if artifact.normalization.dimension() != catalog_dimension
            || artifact.normalization.scale.len() != catalog_dimension
        {
            return Err(artifact.mismatch(catalog_dimension, "normalization shape is inconsistent"));
        }

        Ok(Self { artifact })
    }

    /// The underlying artifact
    #[must_use]
    pub const fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Course ordering the model expects
    #[must_use]
    pub const fn ordering(&self) -> &CourseOrdering {
        &self.artifact.course_order
    }

    /// Number of clusters
    #[must_use]
    pub const fn k(&self) -> usize {
        self.artifact.k
    }

    /// Vectorize and normalize a student's rows
    #[must_use]
    pub fn embed(&self, records: &[TranscriptRecord]) -> Vec<f64> {
        let raw = self.artifact.course_order.vectorize(records);
        self.artifact.normalization.transform(&raw)
    }
}

/// Storage for model artifacts
pub trait ModelRepository {
    /// Load the current artifact
    ///
    /// # Errors
    /// Returns `ModelUnavailable` if no artifact exists, or an IO/JSON error
    fn load(&self) -> Result<ModelArtifact>;

    /// Persist an artifact as the next version and return what was stored
    ///
    /// # Errors
    /// Returns an IO/JSON error; the previous artifact stays in place on failure
    fn save(&self, artifact: ModelArtifact) -> Result<ModelArtifact>;
}

/// JSON artifact on disk, replaced atomically (temp file + rename).
#[derive(Debug, Clone)]
pub struct FileModelRepository {
    path: PathBuf,
}

impl FileModelRepository {
    /// Repository backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Artifact location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ModelRepository for FileModelRepository {
    fn load(&self) -> Result<ModelArtifact> {
        if !self.path.exists() {
            return Err(AdvisorError::ModelUnavailable {
                path: self.path.clone(),
            });
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, mut artifact: ModelArtifact) -> Result<ModelArtifact> {
        let previous = match self.load() {
            Ok(existing) => existing.version,
            Err(AdvisorError::ModelUnavailable { .. }) => 0,
            Err(e) => {
                crate::warn!(
                    "Existing artifact at {} is unreadable ({e}); versioning from 0",
                    self.path.display()
                );
                0
            }
        };
        artifact.version = previous + 1;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        let content = serde_json::to_string_pretty(&artifact)?;
        if let Err(e) = fs::write(&temp, content).and_then(|()| fs::rename(&temp, &self.path)) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        crate::info!(
            "Published model version {} to {}",
            artifact.version,
            self.path.display()
        );
        Ok(artifact)
    }
}

/// Holder of the currently published model.
///
/// Readers clone the `Arc` and keep using it while a writer publishes a
/// replacement.
#[derive(Debug, Default)]
pub struct ModelSlot {
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl ModelSlot {
    /// An empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot holding `model`
    #[must_use]
    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(model))),
        }
    }

    /// Snapshot of the published model, if any
    #[must_use]
    pub fn current(&self) -> Option<Arc<TrainedModel>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the published model
    pub fn publish(&self, model: TrainedModel) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(model));
    }

    /// Load from a repository and publish, validating against `catalog`
    ///
    /// # Errors
    /// Returns `ModelUnavailable`/`ModelMismatch` or an IO/JSON error; the
    /// slot keeps its previous model on failure
    pub fn load_from(&self, repository: &dyn ModelRepository, catalog: &Catalog) -> Result<u64> {
        let artifact = repository.load()?;
        let model = TrainedModel::new(artifact, catalog)?;
        let version = model.artifact().version;
        self.publish(model);
        Ok(version)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::models::CourseCatalogEntry;
    use tempfile::TempDir;

    pub(crate) fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            CourseCatalogEntry::new("CT100", "Intro", 2.0),
            CourseCatalogEntry::new("CT101", "Programming", 4.0),
        ])
        .expect("unique codes")
    }

    pub(crate) fn artifact() -> ModelArtifact {
        let catalog = catalog();
        ModelArtifact {
            version: 0,
            mode: TrainingMode::All,
            k: DEFAULT_CLUSTERS,
            dimension: 2,
            course_order: CourseOrdering::from_catalog(&catalog),
            normalization: NormalizationParameters {
                mean: vec![1.0, 2.0],
                scale: vec![1.0, 2.0],
            },
            centroids: vec![
                vec![-1.0, -1.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
                vec![2.0, 2.0],
                vec![-2.0, -2.0],
            ],
            assignments: [("S2".to_string(), 1), ("S1".to_string(), 0), ("S3".to_string(), 1)]
                .into_iter()
                .collect(),
            inertia: 0.0,
        }
    }

    #[test]
    fn test_training_mode_parsing() {
        assert_eq!("all".parse::<TrainingMode>(), Ok(TrainingMode::All));
        assert_eq!(
            "Capstone-Graduates".parse::<TrainingMode>(),
            Ok(TrainingMode::CapstoneGraduates)
        );
        assert!("some".parse::<TrainingMode>().is_err());
    }

    #[test]
    fn test_members_in_id_order() {
        let artifact = artifact();
        assert_eq!(artifact.members(1).collect::<Vec<_>>(), vec!["S2", "S3"]);
        assert_eq!(artifact.members(0).collect::<Vec<_>>(), vec!["S1"]);
    }

    #[test]
    fn test_model_rejects_changed_catalog() {
        let grown = Catalog::from_entries(vec![
            CourseCatalogEntry::new("CT100", "Intro", 2.0),
            CourseCatalogEntry::new("CT101", "Programming", 4.0),
            CourseCatalogEntry::new("CT102", "Data Structures", 4.0),
        ])
        .expect("unique codes");

        let err = TrainedModel::new(artifact(), &grown).expect_err("dimension changed");
        assert!(matches!(
            err,
            AdvisorError::ModelMismatch {
                artifact_dimension: 2,
                catalog_dimension: 3,
                ..
            }
        ));

        let renamed = Catalog::from_entries(vec![
            CourseCatalogEntry::new("CT100", "Intro", 2.0),
            CourseCatalogEntry::new("CT199", "Other", 4.0),
        ])
        .expect("unique codes");
        assert!(TrainedModel::new(artifact(), &renamed).is_err());
    }

    #[test]
    fn test_model_requires_five_clusters() {
        let mut three = artifact();
        three.k = 3;
        three.centroids.truncate(3);

        let err = TrainedModel::new(three, &catalog()).expect_err("wrong cluster count");
        assert!(matches!(err, AdvisorError::ModelMismatch { .. }));
        assert!(err.to_string().contains("expected 5 clusters"));
    }

    #[test]
    fn test_embed_normalizes() {
        let model = TrainedModel::new(artifact(), &catalog()).expect("matching catalog");
        let records = vec![TranscriptRecord::graded("S1", (1, 1), "CT101", 4.0, 8.0)];
        assert_eq!(model.embed(&records), vec![-1.0, 1.0]);
    }

    #[test]
    fn test_repository_versions_increase() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileModelRepository::new(dir.path().join("models").join("kmeans.json"));

        assert!(matches!(
            repo.load(),
            Err(AdvisorError::ModelUnavailable { .. })
        ));

        let first = repo.save(artifact()).expect("first save");
        let second = repo.save(artifact()).expect("second save");
        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);

        let loaded = repo.load().expect("artifact on disk");
        assert_eq!(loaded, second);
        assert!(!repo.temp_path().exists());
    }

    #[test]
    fn test_slot_keeps_old_snapshot_for_readers() {
        let slot = ModelSlot::new();
        assert!(slot.current().is_none());

        slot.publish(TrainedModel::new(artifact(), &catalog()).expect("matching catalog"));
        let reader = slot.current().expect("published");

        let mut next = artifact();
        next.version = 7;
        slot.publish(TrainedModel::new(next, &catalog()).expect("matching catalog"));

        assert_eq!(reader.artifact().version, 0);
        assert_eq!(slot.current().expect("published").artifact().version, 7);
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let dir = TempDir::new().expect("temp dir");
        let repo = FileModelRepository::new(dir.path().join("missing.json"));
        let slot = ModelSlot::with_model(TrainedModel::new(artifact(), &catalog()).expect("matching catalog"));

        assert!(slot.load_from(&repo, &catalog()).is_err());
        assert!(slot.current().is_some());
    }
}
