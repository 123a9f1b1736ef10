//! Course catalog model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A course in the reference catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseCatalogEntry {
    /// Unique course code (e.g., "CT101")
    pub code: String,

    /// Course name (e.g., "Introduction to Programming")
    pub name: String,

    /// Credit hours
    pub credits: f64,

    /// Course type (e.g., "required", "elective")
    pub course_type: String,

    /// Free-form note
    pub note: Option<String>,
}

impl CourseCatalogEntry {
    /// Create a new catalog entry
    ///
    /// # Arguments
    /// * `code` - Unique course code
    /// * `name` - Full course name
    /// * `credits` - Credit hours
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, credits: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            credits,
            course_type: String::new(),
            note: None,
        }
    }

    /// Set the course type
    #[must_use]
    pub fn with_type(mut self, course_type: impl Into<String>) -> Self {
        self.course_type = course_type.into();
        self
    }
}

/// Immutable course catalog with a deterministic (lexicographic by code) ordering.
///
/// The ordering defines the dimensions of every feature vector, so it must be
/// identical between training and inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: BTreeMap<String, CourseCatalogEntry>,
}

impl Catalog {
    /// Build a catalog from entries.
    ///
    /// # Errors
    /// Returns the first duplicated course code if codes are not unique.
    pub fn from_entries(
        entries: impl IntoIterator<Item = CourseCatalogEntry>,
    ) -> Result<Self, String> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let code = entry.code.clone();
            if map.insert(code.clone(), entry).is_some() {
                return Err(code);
            }
        }
        Ok(Self { entries: map })
    }

    /// Look up a course by code
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&CourseCatalogEntry> {
        self.entries.get(code)
    }

    /// Whether the catalog contains a course
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Number of courses (the feature dimension)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Course codes in catalog order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in catalog order
    pub fn entries(&self) -> impl Iterator<Item = &CourseCatalogEntry> {
        self.entries.values()
    }
}
