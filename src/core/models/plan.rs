//! Learning plan model

use serde::{Deserialize, Serialize};

use super::semester::SemesterSlot;

/// A course placed in a plan semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCourse {
    /// Course code
    pub code: String,
    /// Course name (from the catalog, or the code when the catalog lacks it)
    pub name: String,
    /// Credit hours
    pub credits: f64,
    /// Score the representative student obtained, if graded
    pub score: Option<f64>,
}

/// One semester of a study plan.
///
/// `credits` always equals the sum of the listed courses' credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySemesterPlan {
    /// (year, semester) this entry covers
    pub slot: SemesterSlot,
    /// Courses in the order the representative took them
    pub courses: Vec<PlannedCourse>,
    /// Sum of the courses' credits
    pub credits: f64,
}

impl StudySemesterPlan {
    /// Create an empty semester
    #[must_use]
    pub const fn new(slot: SemesterSlot) -> Self {
        Self {
            slot,
            courses: Vec::new(),
            credits: 0.0,
        }
    }

    /// Append a course and update the credit sum
    pub fn add_course(&mut self, course: PlannedCourse) {
        self.credits += course.credits;
        self.courses.push(course);
    }

    /// Number of courses in the semester
    #[must_use]
    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

/// A cluster's study plan, replayed from its representative student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlan {
    /// Cluster the plan belongs to (0..K)
    pub cluster_id: usize,
    /// Euclidean distance from the student to the cluster centroid
    pub distance: f64,
    /// Representative student whose transcript is replayed, if the cluster has members
    pub representative: Option<String>,
    /// Semesters in ascending (year, semester) order
    pub semesters: Vec<StudySemesterPlan>,
    /// Credits across all listed semesters
    pub total_credits: f64,
    /// Credits required for graduation
    pub target_credits: f64,
}

impl LearningPlan {
    /// Create an empty plan for a cluster
    #[must_use]
    pub const fn empty(cluster_id: usize, distance: f64, target_credits: f64) -> Self {
        Self {
            cluster_id,
            distance,
            representative: None,
            semesters: Vec::new(),
            total_credits: 0.0,
            target_credits,
        }
    }

    /// Whether the plan lists no semesters
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.semesters.is_empty()
    }

    /// Append a semester, skipping empty ones
    pub fn push_semester(&mut self, semester: StudySemesterPlan) {
        if semester.courses.is_empty() {
            return;
        }
        self.total_credits += semester.credits;
        self.semesters.push(semester);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, credits: f64) -> PlannedCourse {
        PlannedCourse {
            code: code.to_string(),
            name: code.to_string(),
            credits,
            score: Some(8.0),
        }
    }

    #[test]
    fn test_semester_credit_sum() {
        let mut semester = StudySemesterPlan::new(SemesterSlot::new(1, 1));
        semester.add_course(course("CT100", 2.0));
        semester.add_course(course("CT101", 4.0));

        assert_eq!(semester.course_count(), 2);
        assert!((semester.credits - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_plan_skips_empty_semesters() {
        let mut plan = LearningPlan::empty(2, 1.5, 156.0);
        assert!(plan.is_empty());

        plan.push_semester(StudySemesterPlan::new(SemesterSlot::new(1, 1)));
        assert!(plan.is_empty());

        let mut semester = StudySemesterPlan::new(SemesterSlot::new(1, 2));
        semester.add_course(course("CT101", 4.0));
        plan.push_semester(semester);

        assert_eq!(plan.semesters.len(), 1);
        assert!((plan.total_credits - 4.0).abs() < f64::EPSILON);
    }
}
