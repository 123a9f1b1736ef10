//! Directed graph of course prerequisites

use std::collections::{BTreeMap, BTreeSet};

/// Prerequisite relationships between catalog courses.
///
/// Two adjacency maps are kept:
/// - `requires`: course -> courses that must be passed first
/// - `unlocks`: course -> courses that list it as a prerequisite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteGraph {
    requires: BTreeMap<String, BTreeSet<String>>,
    unlocks: BTreeMap<String, BTreeSet<String>>,
}

impl PrerequisiteGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prerequisite relationship
    ///
    /// # Arguments
    /// * `course` - Course that requires the prerequisite
    /// * `prerequisite` - Course that must be passed first
    ///
    /// # Returns
    /// `false` if the edge was already present or is a self-loop
    pub fn add_prerequisite(&mut self, course: &str, prerequisite: &str) -> bool {
        if course == prerequisite {
            return false;
        }
        let inserted = self
            .requires
            .entry(course.to_string())
            .or_default()
            .insert(prerequisite.to_string());
        self.unlocks
            .entry(prerequisite.to_string())
            .or_default()
            .insert(course.to_string());
        inserted
    }

    /// Prerequisites of a course in code order (empty when it has none)
    #[must_use]
    pub fn prerequisites(&self, course: &str) -> Vec<String> {
        self.requires
            .get(course)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Courses that require the given course
    #[must_use]
    pub fn dependents(&self, course: &str) -> Vec<String> {
        self.unlocks
            .get(course)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether every prerequisite of `course` is in `passed`
    #[must_use]
    pub fn is_satisfied(&self, course: &str, passed: &BTreeSet<String>) -> bool {
        self.requires
            .get(course)
            .map_or(true, |set| set.is_subset(passed))
    }

    /// Number of prerequisite edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.requires.values().map(BTreeSet::len).sum()
    }
}

impl std::fmt::Display for PrerequisiteGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Prerequisites ({} edges):", self.edge_count())?;
        for (course, prereqs) in &self.requires {
            let list: Vec<&str> = prereqs.iter().map(String::as_str).collect();
            writeln!(f, "  {course} → {}", list.join(", "))?;
        }
        Ok(())
    }
}
