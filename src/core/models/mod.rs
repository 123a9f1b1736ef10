//! Data models for `course_compass`

pub mod course;
pub mod dag;
pub mod plan;
pub mod recommendation;
pub mod semester;
pub mod transcript;

pub use course::{Catalog, CourseCatalogEntry};
pub use dag::PrerequisiteGraph;
pub use plan::{LearningPlan, PlannedCourse, StudySemesterPlan};
pub use recommendation::{Recommendation, RecommendationGroup};
pub use semester::{SemesterKind, SemesterSlot};
pub use transcript::{CourseStatus, TranscriptRecord};
