//! Core recommendation engine: data models, storage, clustering and query operations

pub mod aggregate;
pub mod clustering;
pub mod config;
pub mod distance;
pub mod error;
pub mod features;
pub mod filter;
pub mod models;
pub mod planner;
pub mod progress;
pub mod ranking;
pub mod recommender;
pub mod semester;
pub mod similarity;
pub mod store;

/// Returns the current version of the `course_compass` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
