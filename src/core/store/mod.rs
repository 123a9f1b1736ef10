//! Transcript store: the read-only data source behind every pipeline stage.

pub mod csv_loader;

use crate::core::error::{AdvisorError, Result};
use crate::core::models::{Catalog, PrerequisiteGraph, TranscriptRecord};

/// Which historical students a population query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationFilter {
    /// Students flagged both on-time and graduated
    OnTimeGraduates,
    /// Every student in the store
    All,
}

/// Read access to reference data and transcripts.
///
/// Implementations return rows in a stable order; population order defines
/// encounter order for similarity tie-breaks.
pub trait TranscriptStore {
    /// The full course catalog
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the catalog cannot be read
    fn course_catalog(&self) -> Result<Catalog>;

    /// Prerequisite codes of a course (empty when none)
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the prerequisite table cannot be read
    fn prerequisites(&self, code: &str) -> Result<Vec<String>>;

    /// All transcript rows of one student (empty for an unknown student)
    ///
    /// # Errors
    /// Returns `DataUnavailable` if transcripts cannot be read
    fn transcript(&self, student_id: &str) -> Result<Vec<TranscriptRecord>>;

    /// Transcript rows of every student matching `filter`
    ///
    /// # Errors
    /// Returns `DataUnavailable` if transcripts cannot be read
    fn historical_population(&self, filter: PopulationFilter) -> Result<Vec<TranscriptRecord>>;
}

/// A store held entirely in memory, typically loaded from CSV files.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    catalog: Catalog,
    prerequisites: PrerequisiteGraph,
    records: Vec<TranscriptRecord>,
}

impl InMemoryStore {
    /// Create a store from already validated data
    #[must_use]
    pub const fn new(
        catalog: Catalog,
        prerequisites: PrerequisiteGraph,
        records: Vec<TranscriptRecord>,
    ) -> Self {
        Self {
            catalog,
            prerequisites,
            records,
        }
    }

    /// Borrow the catalog without cloning
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Borrow the prerequisite graph
    #[must_use]
    pub const fn prerequisite_graph(&self) -> &PrerequisiteGraph {
        &self.prerequisites
    }

    /// Total number of transcript rows
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl TranscriptStore for InMemoryStore {
    fn course_catalog(&self) -> Result<Catalog> {
        if self.catalog.is_empty() {
            return Err(AdvisorError::data_unavailable("course catalog is empty"));
        }
        Ok(self.catalog.clone())
    }

    fn prerequisites(&self, code: &str) -> Result<Vec<String>> {
        Ok(self.prerequisites.prerequisites(code))
    }

    fn transcript(&self, student_id: &str) -> Result<Vec<TranscriptRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    fn historical_population(&self, filter: PopulationFilter) -> Result<Vec<TranscriptRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| match filter {
                PopulationFilter::OnTimeGraduates => r.on_time && r.graduated,
                PopulationFilter::All => true,
            })
            .cloned()
            .collect())
    }
}
