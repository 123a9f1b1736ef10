//! Clustering model: normalization, K-means, offline training and the
//! persisted artifact.

pub mod artifact;
pub mod kmeans;
pub mod normalization;
pub mod training;

pub use artifact::{FileModelRepository, ModelArtifact, ModelRepository, ModelSlot, TrainedModel, TrainingMode};
pub use kmeans::KMeans;
pub use normalization::NormalizationParameters;
pub use training::{train_and_publish, train_model, TrainingOptions};
