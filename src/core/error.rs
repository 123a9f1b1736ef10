//! Error types for the recommendation and clustering pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout `course_compass::core`.
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Errors raised by the store, the model layer and training.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The transcript store or catalog could not be read.
    #[error("Data unavailable: {message}")]
    DataUnavailable {
        /// What could not be read
        message: String,
    },

    /// No trained model artifact exists at the expected location.
    #[error("Model unavailable: {path}")]
    ModelUnavailable {
        /// Location the artifact was expected at
        path: PathBuf,
    },

    /// The artifact does not match the current catalog.
    #[error("Model mismatch: artifact has {artifact_dimension} dimensions, catalog has {catalog_dimension} ({detail})")]
    ModelMismatch {
        /// Dimensionality recorded in the artifact
        artifact_dimension: usize,
        /// Current catalog size
        catalog_dimension: usize,
        /// Which check failed
        detail: String,
    },

    /// Too few students left after population filtering to train K clusters.
    #[error("Insufficient training population: {found} distinct students, need at least {required}")]
    InsufficientTrainingPopulation {
        /// Distinct students remaining
        found: usize,
        /// Minimum required (the cluster count)
        required: usize,
    },

    /// The clustering fit itself failed.
    #[error("Training failed: {0}")]
    Training(String),

    /// A record failed validation during ingestion.
    #[error("Invalid record at {location}: {message}")]
    InvalidRecord {
        /// File and line, or another human-readable position
        location: String,
        /// Validation failure
        message: String,
    },

    /// IO error while reading data or writing artifacts.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdvisorError {
    /// Create a data-unavailable error
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }

    /// Create an invalid-record error
    pub fn invalid_record(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the model cannot serve requests (as opposed to missing data).
    #[must_use]
    pub const fn is_model_error(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable { .. } | Self::ModelMismatch { .. }
        )
    }
}
