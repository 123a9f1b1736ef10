//! Feature vectorization of transcripts over a fixed course ordering.

use crate::core::models::{Catalog, TranscriptRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The global course ordering that fixes vector dimensions.
///
/// Always lexicographic by code; persisted alongside the model so inference
/// can detect a catalog that changed since training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CourseOrdering {
    codes: Vec<String>,
    index: HashMap<String, usize>,
}

impl From<Vec<String>> for CourseOrdering {
    fn from(codes: Vec<String>) -> Self {
        Self::from_codes(codes)
    }
}

impl From<CourseOrdering> for Vec<String> {
    fn from(ordering: CourseOrdering) -> Self {
        ordering.codes
    }
}

impl CourseOrdering {
    /// Ordering of the given catalog
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_codes(catalog.codes().map(str::to_string).collect())
    }

    /// Ordering over explicit codes (sorted and deduplicated)
    #[must_use]
    pub fn from_codes(codes: Vec<String>) -> Self {
        let codes: Vec<String> = codes.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let index = codes
            .iter()
            .enumerate()
            .map(|(i, code)| (code.clone(), i))
            .collect();
        Self { codes, index }
    }

    /// Number of dimensions
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.codes.len()
    }

    /// Codes in dimension order
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Dimension of a course code
    #[must_use]
    pub fn position(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    /// Vectorize one student's rows.
    ///
    /// Entry i is the credits of course i if the student passed it, else 0.
    /// Courses outside the ordering are ignored. An empty transcript yields the
    /// zero vector.
    #[must_use]
    pub fn vectorize(&self, records: &[TranscriptRecord]) -> Vec<f64> {
        let mut vector = vec![0.0; self.dimension()];
        for record in records.iter().filter(|r| r.is_passed()) {
            if let Some(i) = self.position(&record.course_code) {
                vector[i] = record.credits;
            }
        }
        vector
    }
}

/// Group population rows by student, preserving first-appearance order.
#[must_use]
pub fn group_by_student(records: &[TranscriptRecord]) -> Vec<(String, Vec<TranscriptRecord>)> {
    let mut order: Vec<(String, Vec<TranscriptRecord>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *slots.entry(record.student_id.as_str()).or_insert_with(|| {
            order.push((record.student_id.clone(), Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(record.clone());
    }

    order
}

/// Codes of the courses a student has passed
#[must_use]
pub fn passed_codes(records: &[TranscriptRecord]) -> BTreeSet<String> {
    records
        .iter()
        .filter(|r| r.is_passed())
        .map(|r| r.course_code.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::CourseCatalogEntry;

    fn ordering() -> CourseOrdering {
        let catalog = Catalog::from_entries(vec![
            CourseCatalogEntry::new("CT101", "Programming", 4.0),
            CourseCatalogEntry::new("CT100", "Intro", 2.0),
            CourseCatalogEntry::new("TN010", "Math", 3.0),
        ])
        .expect("unique codes");
        CourseOrdering::from_catalog(&catalog)
    }

    #[test]
    fn test_vector_uses_credits_of_passed_courses() {
        let records = vec![
            TranscriptRecord::graded("S1", (1, 1), "CT100", 2.0, 8.0),
            TranscriptRecord::graded("S1", (1, 1), "TN010", 3.0, 2.0),
            TranscriptRecord::graded("S1", (1, 2), "XX999", 3.0, 9.0),
        ];

        assert_eq!(ordering().vectorize(&records), vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unknown_student_is_zero_vector() {
        let ordering = ordering();
        let vector = ordering.vectorize(&[]);
        assert_eq!(vector.len(), ordering.dimension());
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_vectorize_is_deterministic() {
        let ordering = ordering();
        let records = vec![
            TranscriptRecord::graded("S1", (1, 2), "CT101", 4.0, 7.0),
            TranscriptRecord::graded("S1", (1, 1), "CT100", 2.0, 8.0),
        ];
        assert_eq!(ordering.vectorize(&records), ordering.vectorize(&records));
    }

    #[test]
    fn test_position_after_deserialization() {
        let json = serde_json::to_string(&ordering()).expect("serializable");
        let restored: CourseOrdering = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(json, r#"["CT100","CT101","TN010"]"#);
        assert_eq!(restored, ordering());
        assert_eq!(restored.position("TN010"), Some(2));
        assert_eq!(restored.position("ZZ000"), None);
    }

    #[test]
    fn test_group_by_student_keeps_first_appearance_order() {
        let records = vec![
            TranscriptRecord::graded("B2", (1, 1), "CT100", 2.0, 8.0),
            TranscriptRecord::graded("A1", (1, 1), "CT100", 2.0, 8.0),
            TranscriptRecord::graded("B2", (1, 2), "CT101", 4.0, 8.0),
        ];
        let grouped = group_by_student(&records);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "B2");
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[1].0, "A1");
    }
}
