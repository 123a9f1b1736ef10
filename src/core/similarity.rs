//! Peer-similarity matching
//!
//! Jaccard similarity over passed-course sets against on-time graduates is
//! the primary matcher; cosine similarity over course→score vectors against
//! the whole population is used only when Jaccard finds nobody.

use crate::core::error::Result;
use crate::core::features::{group_by_student, passed_codes};
use crate::core::models::TranscriptRecord;
use crate::core::store::{PopulationFilter, TranscriptStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Default number of peers kept
pub const DEFAULT_PEER_COUNT: usize = 10;

/// How a peer set was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchMethod {
    /// Set similarity against on-time graduates
    Jaccard,
    /// Vector similarity against the whole population
    Cosine,
}

/// One matched peer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerMatch {
    /// Peer student id
    pub student_id: String,
    /// Similarity in (0, 1]
    pub similarity: f64,
}

/// Peers found for a query student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeerSet {
    /// Matcher that produced the peers
    pub method: MatchMethod,
    /// Peers by descending similarity
    pub peers: Vec<PeerMatch>,
}

impl PeerSet {
    /// Peer ids
    #[must_use]
    pub fn ids(&self) -> BTreeSet<String> {
        self.peers.iter().map(|p| p.student_id.clone()).collect()
    }

    /// Whether nobody matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// Jaccard similarity |A ∩ B| / |A ∪ B|; 0 when both sets are empty
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Cosine similarity of two sparse vectors keyed by course code.
///
/// Cosine similarity = (A · B) / (||A|| × ||B||); 0 when either norm is 0
#[must_use]
pub fn cosine(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(code, x)| b.get(code).map(|y| x * y))
        .sum();
    let norm_a = a.values().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.values().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Top peers by Jaccard similarity of passed-course sets.
///
/// Peers are ranked by similarity descending; equal similarities keep
/// population order. Only similarities above zero are returned.
#[must_use]
pub fn jaccard_peers(
    student_id: &str,
    query: &[TranscriptRecord],
    population: &[TranscriptRecord],
    top_n: usize,
) -> Vec<PeerMatch> {
    let query_set = passed_codes(query);
    if query_set.is_empty() {
        return Vec::new();
    }

    let scored = group_by_student(population)
        .into_iter()
        .filter(|(id, _)| id != student_id)
        .map(|(id, rows)| PeerMatch {
            similarity: jaccard(&query_set, &passed_codes(&rows)),
            student_id: id,
        });
    rank(scored, top_n)
}

/// Top peers by cosine similarity of course→score vectors (0 where untaken).
///
/// Only defined for students with at least one passed course.
#[must_use]
pub fn cosine_peers(
    student_id: &str,
    query: &[TranscriptRecord],
    population: &[TranscriptRecord],
    top_n: usize,
) -> Vec<PeerMatch> {
    if passed_codes(query).is_empty() {
        return Vec::new();
    }
    let query_vector = score_vector(query);

    let scored = group_by_student(population)
        .into_iter()
        .filter(|(id, _)| id != student_id)
        .map(|(id, rows)| PeerMatch {
            similarity: cosine(&query_vector, &score_vector(&rows)),
            student_id: id,
        });
    rank(scored, top_n)
}

/// Find peers with Jaccard first and cosine as fallback.
///
/// # Errors
/// Returns `DataUnavailable` if a population cannot be read
pub fn find_peers(
    store: &dyn TranscriptStore,
    student_id: &str,
    query: &[TranscriptRecord],
    top_n: usize,
) -> Result<PeerSet> {
    let graduates = store.historical_population(PopulationFilter::OnTimeGraduates)?;
    let peers = jaccard_peers(student_id, query, &graduates, top_n);
    if !peers.is_empty() {
        crate::debug!("Matched {} peers by Jaccard similarity", peers.len());
        return Ok(PeerSet {
            method: MatchMethod::Jaccard,
            peers,
        });
    }

    let everyone = store.historical_population(PopulationFilter::All)?;
    let peers = cosine_peers(student_id, query, &everyone, top_n);
    crate::debug!("Jaccard found no peers; cosine fallback matched {}", peers.len());
    Ok(PeerSet {
        method: MatchMethod::Cosine,
        peers,
    })
}

/// Mean score per graded course
#[allow(clippy::cast_precision_loss)]
fn score_vector(records: &[TranscriptRecord]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for record in records {
        if let Some(score) = record.score {
            let entry = sums.entry(record.course_code.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(code, (sum, count))| (code, sum / count as f64))
        .collect()
}

fn rank(scored: impl Iterator<Item = PeerMatch>, top_n: usize) -> Vec<PeerMatch> {
    let mut matches: Vec<PeerMatch> = scored.filter(|m| m.similarity > 0.0).collect();
    // stable: ties keep encounter order
    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches.truncate(top_n);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| (*c).to_string()).collect()
    }

    fn rows(id: &str, passed: &[&str]) -> Vec<TranscriptRecord> {
        passed
            .iter()
            .map(|code| TranscriptRecord::graded(id, (1, 1), *code, 3.0, 8.0).on_time_graduate())
            .collect()
    }

    #[test]
    fn test_jaccard() {
        assert!((jaccard(&set(&["A", "B"]), &set(&["B", "C"])) - 1.0 / 3.0).abs() < 1e-12);
        assert!(jaccard(&set(&[]), &set(&[])).abs() < f64::EPSILON);
        assert!((jaccard(&set(&["A"]), &set(&["A"])) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cosine() {
        let a: BTreeMap<String, f64> = [("A".to_string(), 1.0)].into_iter().collect();
        let b: BTreeMap<String, f64> = [("A".to_string(), 2.0), ("B".to_string(), 0.0)]
            .into_iter()
            .collect();
        let c: BTreeMap<String, f64> = [("B".to_string(), 5.0)].into_iter().collect();

        assert!((cosine(&a, &b) - 1.0).abs() < 1e-12);
        assert!(cosine(&a, &c).abs() < f64::EPSILON);
    }

    #[test]
    fn test_jaccard_peers_rank_and_ties() {
        let query = rows("ME", &["A", "B"]);
        let mut population = rows("P1", &["A"]);
        population.extend(rows("P2", &["A", "B"]));
        population.extend(rows("P0", &["B"]));
        population.extend(rows("P3", &["Z"]));
        population.extend(rows("ME", &["A", "B"]));

        let peers = jaccard_peers("ME", &query, &population, 10);
        let ids: Vec<&str> = peers.iter().map(|p| p.student_id.as_str()).collect();
        // P1 and P0 tie at 0.5; P1 appears first
        assert_eq!(ids, vec!["P2", "P1", "P0"]);
    }

    #[test]
    fn test_top_n_limits_peers() {
        let query = rows("ME", &["A"]);
        let population: Vec<TranscriptRecord> =
            (0..15).flat_map(|i| rows(&format!("P{i}"), &["A"])).collect();
        assert_eq!(jaccard_peers("ME", &query, &population, 10).len(), 10);
    }

    #[test]
    fn test_no_passed_courses_no_peers() {
        let failed = vec![TranscriptRecord::graded("ME", (1, 1), "A", 3.0, 2.0)];
        let population = rows("P1", &["A"]);
        assert!(jaccard_peers("ME", &failed, &population, 10).is_empty());
        assert!(cosine_peers("ME", &failed, &population, 10).is_empty());
    }

    #[test]
    fn test_cosine_peers_use_scores() {
        let query = rows("ME", &["A"]);
        let mut population = vec![TranscriptRecord::graded("P1", (1, 1), "A", 3.0, 3.0)];
        population.push(TranscriptRecord::graded("P2", (1, 1), "B", 3.0, 9.0));

        let peers = cosine_peers("ME", &query, &population, 10);
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].student_id, "P1");
    }
}
