//! The recommender facade: every query operation over a store and a published model.

use crate::core::aggregate::aggregate_slot;
use crate::core::clustering::artifact::{ModelRepository, ModelSlot};
use crate::core::clustering::kmeans::DEFAULT_CLUSTERS;
use crate::core::distance::{self, sentinel_distances};
use crate::core::error::Result;
use crate::core::features::passed_codes;
use crate::core::filter::admit;
use crate::core::models::{Catalog, LearningPlan, Recommendation, TranscriptRecord};
use crate::core::planner::synthesize_plans;
use crate::core::progress::{credit_summary, CreditSummary};
use crate::core::ranking::{rank, RankingOptions};
use crate::core::semester::{latest_completed_slot, resolve_targets};
use crate::core::similarity::{find_peers, MatchMethod, DEFAULT_PEER_COUNT};
use crate::core::store::TranscriptStore;
use serde::Serialize;
use std::collections::BTreeMap;

/// Query-time parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommenderOptions {
    /// Peers kept by the similarity matcher
    pub peer_count: usize,
    /// Capstone code and list caps
    pub ranking: RankingOptions,
}

impl Default for RecommenderOptions {
    fn default() -> Self {
        Self {
            peer_count: DEFAULT_PEER_COUNT,
            ranking: RankingOptions::default(),
        }
    }
}

/// Recommendations together with the student's credit progress
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    /// Student the report is for
    pub student_id: String,
    /// Credit totals and pace
    pub progress: CreditSummary,
    /// Ranked recommendations
    pub recommendations: Vec<Recommendation>,
}

/// Entry point for recommendations, plans and distances.
///
/// Holds the catalog snapshot taken at construction and a [`ModelSlot`] that
/// can be republished while the recommender is in use. Data problems during
/// a query are logged and yield empty results (or sentinel distances); they
/// are never returned as errors.
pub struct Recommender<S: TranscriptStore> {
    store: S,
    catalog: Catalog,
    model: ModelSlot,
    options: RecommenderOptions,
}

impl<S: TranscriptStore> Recommender<S> {
    /// Create a recommender without a published model
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the catalog cannot be read
    pub fn new(store: S, options: RecommenderOptions) -> Result<Self> {
        let catalog = store.course_catalog()?;
        crate::debug!("Recommender ready with {} catalog courses", catalog.len());
        Ok(Self {
            store,
            catalog,
            model: ModelSlot::new(),
            options,
        })
    }

    /// Load the artifact from `repository` and publish it
    ///
    /// # Errors
    /// Returns `ModelUnavailable`/`ModelMismatch`, or an IO/JSON error
    pub fn load_model(&self, repository: &dyn ModelRepository) -> Result<u64> {
        self.model.load_from(repository, &self.catalog)
    }

    /// The slot holding the published model
    #[must_use]
    pub const fn model_slot(&self) -> &ModelSlot {
        &self.model
    }

    /// The catalog snapshot
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn student_records(&self, student_id: &str) -> Option<Vec<TranscriptRecord>> {
        match self.store.transcript(student_id) {
            Ok(records) => Some(records),
            Err(e) => {
                crate::warn!("Transcript for {student_id} unavailable: {e}");
                None
            }
        }
    }

    /// Ranked next-semester recommendations; empty when the student has no
    /// passed courses, no peers match, or data is unavailable.
    #[must_use]
    pub fn recommend(&self, student_id: &str) -> Vec<Recommendation> {
        self.student_records(student_id)
            .map(|records| self.recommend_for(student_id, &records))
            .unwrap_or_default()
    }

    /// Recommendations plus credit progress
    #[must_use]
    pub fn recommend_with_progress(&self, student_id: &str) -> RecommendationReport {
        let records = self.student_records(student_id).unwrap_or_default();
        RecommendationReport {
            student_id: student_id.to_string(),
            progress: credit_summary(&records),
            recommendations: self.recommend_for(student_id, &records),
        }
    }

    /// Credit progress of a student
    ///
    /// # Errors
    /// Returns `DataUnavailable` if the transcript cannot be read
    pub fn credit_summary(&self, student_id: &str) -> Result<CreditSummary> {
        Ok(credit_summary(&self.store.transcript(student_id)?))
    }

    fn recommend_for(&self, student_id: &str, records: &[TranscriptRecord]) -> Vec<Recommendation> {
        let passed = passed_codes(records);
        let Some(current) = latest_completed_slot(records) else {
            crate::debug!("{student_id} has no passed courses; nothing to recommend");
            return Vec::new();
        };
        let targets = resolve_targets(current);

        let peers = match find_peers(&self.store, student_id, records, self.options.peer_count) {
            Ok(peers) if !peers.is_empty() => peers,
            Ok(_) => {
                crate::debug!("No peers found for {student_id}");
                return Vec::new();
            }
            Err(e) => {
                crate::warn!("Peer population unavailable: {e}");
                return Vec::new();
            }
        };

        let mut cohort_rows = Vec::new();
        for peer in &peers.peers {
            match self.store.transcript(&peer.student_id) {
                Ok(rows) => cohort_rows.extend(rows),
                Err(e) => crate::warn!("Skipping peer {}: {e}", peer.student_id),
            }
        }
        let cohort_size = peers.peers.len();

        let candidates = targets
            .iter()
            .flat_map(|slot| aggregate_slot(&cohort_rows, cohort_size, *slot))
            .collect();
        let admitted = admit(candidates, &passed, &self.catalog, &self.store);

        let label = match peers.method {
            MatchMethod::Jaccard => "on-time graduates",
            MatchMethod::Cosine => "students",
        };
        let recommendations = rank(admitted, &self.options.ranking, label);
        crate::info!(
            "{} recommendations for {student_id} from {cohort_size} peers",
            recommendations.len()
        );
        recommendations
    }

    /// Euclidean distance to every centroid; all sentinel when the model or
    /// the transcript is unavailable
    #[must_use]
    pub fn cluster_distances(&self, student_id: &str) -> BTreeMap<usize, f64> {
        let Some(model) = self.model.current() else {
            crate::warn!("No model published; reporting sentinel distances");
            return sentinel_distances(DEFAULT_CLUSTERS);
        };
        let Some(records) = self.student_records(student_id) else {
            return sentinel_distances(model.k());
        };
        distance::cluster_distances(Some(&*model), &records, model.k())
    }

    /// One plan per cluster ordered by distance; empty without a model
    #[must_use]
    pub fn learning_plans(&self, student_id: &str) -> Vec<LearningPlan> {
        let Some(model) = self.model.current() else {
            crate::warn!("No model published; no learning plans available");
            return Vec::new();
        };
        let Some(records) = self.student_records(student_id) else {
            return Vec::new();
        };
        let distances = distance::cluster_distances(Some(&*model), &records, model.k());
        synthesize_plans(model.artifact(), &distances, &records, &self.store, &self.catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AdvisorError;
    use crate::core::models::{CourseCatalogEntry, PrerequisiteGraph};
    use crate::core::store::{InMemoryStore, PopulationFilter};

    fn store() -> InMemoryStore {
        let catalog = Catalog::from_entries(vec![
            CourseCatalogEntry::new("CT100", "Intro", 2.0),
            CourseCatalogEntry::new("CT101", "Programming", 4.0),
        ])
        .expect("unique codes");
        let mut records = Vec::new();
        for i in 0..3 {
            let id = format!("G{i}");
            records.push(TranscriptRecord::graded(id.clone(), (1, 1), "CT100", 2.0, 8.0).on_time_graduate());
            records.push(TranscriptRecord::graded(id, (1, 2), "CT101", 4.0, 7.0).on_time_graduate());
        }
        records.push(TranscriptRecord::graded("ME", (1, 1), "CT100", 2.0, 6.0));
        records.push(TranscriptRecord::graded("FAIL", (1, 1), "CT100", 2.0, 2.0));
        InMemoryStore::new(catalog, PrerequisiteGraph::new(), records)
    }

    #[test]
    fn test_recommends_next_semester_course() {
        let recommender = Recommender::new(store(), RecommenderOptions::default()).expect("catalog");
        let recs = recommender.recommend("ME");

        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].code, "CT101");
        assert_eq!(recs[0].frequency, 3);
        assert!((recs[0].pass_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_passed_courses_no_recommendations() {
        let recommender = Recommender::new(store(), RecommenderOptions::default()).expect("catalog");
        assert!(recommender.recommend("FAIL").is_empty());
        assert!(recommender.recommend("UNKNOWN").is_empty());
    }

    #[test]
    fn test_without_model_distances_are_sentinel_and_plans_empty() {
        let recommender = Recommender::new(store(), RecommenderOptions::default()).expect("catalog");
        let distances = recommender.cluster_distances("ME");
        assert_eq!(distances.len(), 5);
        assert!(distances.values().all(|d| (*d - distance::SENTINEL_DISTANCE).abs() < f64::EPSILON));
        assert!(recommender.learning_plans("ME").is_empty());
    }

    struct OfflineStore(InMemoryStore);

    impl TranscriptStore for OfflineStore {
        fn course_catalog(&self) -> Result<Catalog> {
            self.0.course_catalog()
        }
        fn prerequisites(&self, code: &str) -> Result<Vec<String>> {
            self.0.prerequisites(code)
        }
        fn transcript(&self, _student_id: &str) -> Result<Vec<TranscriptRecord>> {
            Err(AdvisorError::data_unavailable("transcript service offline"))
        }
        fn historical_population(&self, _filter: PopulationFilter) -> Result<Vec<TranscriptRecord>> {
            Err(AdvisorError::data_unavailable("transcript service offline"))
        }
    }

    #[test]
    fn test_unavailable_data_is_not_fatal() {
        let recommender = Recommender::new(OfflineStore(store()), RecommenderOptions::default()).expect("catalog");
        assert!(recommender.recommend("ME").is_empty());
        assert_eq!(recommender.cluster_distances("ME").len(), 5);

        let report = recommender.recommend_with_progress("ME");
        assert!(report.recommendations.is_empty());
        assert!(report.progress.earned.abs() < f64::EPSILON);
        assert!(recommender.credit_summary("ME").is_err());
    }
}
