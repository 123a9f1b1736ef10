//! Library for `course_compass`
//! Recommends next-semester courses and builds study plans from the
//! transcripts of similar students.

pub mod core;
pub mod logger;

pub use crate::core::config::{Config, ConfigOverrides};
pub use crate::core::error::{AdvisorError, Result};
pub use crate::core::recommender::{RecommendationReport, Recommender, RecommenderOptions};
