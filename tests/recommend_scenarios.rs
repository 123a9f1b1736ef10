//! End-to-end recommendation scenarios over an in-memory store

use course_compass::core::models::{
    Catalog, CourseCatalogEntry, PrerequisiteGraph, RecommendationGroup, SemesterSlot, TranscriptRecord,
};
use course_compass::core::semester::resolve_targets;
use course_compass::core::store::InMemoryStore;
use course_compass::{Recommender, RecommenderOptions};
use std::collections::BTreeSet;

fn catalog() -> Catalog {
    Catalog::from_entries(vec![
        CourseCatalogEntry::new("CT100", "Introduction to Computing", 2.0),
        CourseCatalogEntry::new("CT101", "Programming Fundamentals", 4.0),
        CourseCatalogEntry::new("CT150", "Numerical Methods", 3.0),
        CourseCatalogEntry::new("MA101", "Calculus", 3.0),
        CourseCatalogEntry::new("CT400", "Software Engineering", 3.0),
        CourseCatalogEntry::new("CT450", "Cloud Computing", 3.0),
        CourseCatalogEntry::new("CT555", "Graduation Thesis", 10.0),
    ])
    .expect("unique codes")
}

fn prerequisites() -> PrerequisiteGraph {
    let mut graph = PrerequisiteGraph::new();
    graph.add_prerequisite("CT101", "CT100");
    graph.add_prerequisite("CT150", "MA101");
    graph.add_prerequisite("CT555", "CT400");
    graph
}

fn recommender(records: Vec<TranscriptRecord>) -> Recommender<InMemoryStore> {
    let store = InMemoryStore::new(catalog(), prerequisites(), records);
    Recommender::new(store, RecommenderOptions::default()).expect("catalog is not empty")
}

fn peer(id: &str, slot: (u32, u32), code: &str, credits: f64, score: f64) -> TranscriptRecord {
    TranscriptRecord::graded(id, slot, code, credits, score).on_time_graduate()
}

/// Ten on-time graduates who passed CT100 in (1,1) and took CT101 in (1,2):
/// nine scored 8.0 and one failed.
fn first_year_population() -> Vec<TranscriptRecord> {
    let mut records = Vec::new();
    for i in 0..10 {
        let id = format!("G{i:02}");
        records.push(peer(&id, (1, 1), "CT100", 2.0, 7.5));
        let score = if i == 9 { 3.0 } else { 8.0 };
        records.push(peer(&id, (1, 2), "CT101", 4.0, score));
    }
    records
}

#[test]
fn test_first_year_student_gets_programming_next() {
    let mut records = first_year_population();
    records.push(TranscriptRecord::graded("S001", (1, 1), "CT100", 2.0, 7.0));

    let recs = recommender(records).recommend("S001");

    assert_eq!(recs.len(), 1);
    let r = &recs[0];
    assert_eq!(r.code, "CT101");
    assert_eq!(r.target, SemesterSlot::new(1, 2));
    assert_eq!(r.frequency, 10);
    assert!((r.pass_rate - 90.0).abs() < 1e-9);
    assert!((r.avg_score - 8.0).abs() < 1e-9);
    assert_eq!(r.group, RecommendationGroup::Regular);
    assert!(r.reason.starts_with("Taken by 10/10 similar on-time graduates"));
}

#[test]
fn test_student_without_passed_courses_gets_nothing() {
    let mut records = first_year_population();
    records.push(TranscriptRecord::graded("S002", (1, 1), "CT100", 2.0, 2.5));

    let recommender = recommender(records);
    assert!(recommender.recommend("S002").is_empty());
    assert!(recommender.recommend("NOBODY").is_empty());
}

#[test]
fn test_recommend_is_idempotent() {
    let mut records = first_year_population();
    records.push(TranscriptRecord::graded("S001", (1, 1), "CT100", 2.0, 7.0));
    let recommender = recommender(records);

    assert_eq!(recommender.recommend("S001"), recommender.recommend("S001"));
}

#[test]
fn test_ordinary_semester_requires_prerequisites() {
    let mut records = first_year_population();
    for i in 0..10 {
        records.push(peer(&format!("G{i:02}"), (1, 2), "CT150", 3.0, 7.0));
    }
    records.push(TranscriptRecord::graded("S001", (1, 1), "CT100", 2.0, 7.0));

    let recs = recommender(records).recommend("S001");
    let codes: Vec<&str> = recs.iter().map(|r| r.code.as_str()).collect();
    // CT150 needs MA101, which S001 has not passed
    assert_eq!(codes, vec!["CT101"]);
}

#[test]
fn test_fourth_year_first_semester_targets() {
    assert_eq!(
        resolve_targets(SemesterSlot::new(4, 1)),
        vec![SemesterSlot::new(4, 2), SemesterSlot::new(4, 3), SemesterSlot::FINAL]
    );
}

#[test]
fn test_failed_attempt_does_not_advance_current_semester() {
    let mut records = first_year_population();
    records.push(TranscriptRecord::graded("S003", (1, 1), "CT100", 2.0, 7.0));
    // a failed course in (1,2) leaves the student positioned at (1,1)
    records.push(TranscriptRecord::graded("S003", (1, 2), "CT150", 3.0, 3.0));

    let recs = recommender(records).recommend("S003");

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].code, "CT101");
    assert_eq!(recs[0].target, SemesterSlot::new(1, 2));
    assert_eq!(recs[0].frequency, 10);
}

/// Ten graduates who share the student's history. `earlier` of them took
/// CT450 in (4,3) and `final_count` others took it in (5,1).
fn late_population(earlier: usize, final_count: usize) -> Vec<TranscriptRecord> {
    let mut records = Vec::new();
    for i in 0..10 {
        let id = format!("G{i:02}");
        records.push(peer(&id, (1, 1), "CT100", 2.0, 7.0));
        records.push(peer(&id, (4, 2), "CT400", 3.0, 7.0));
        if i < earlier {
            records.push(peer(&id, (4, 3), "CT450", 3.0, 7.0));
        } else if i < earlier + final_count {
            records.push(peer(&id, (5, 1), "CT450", 3.0, 7.0));
        }
    }
    records.push(TranscriptRecord::graded("S010", (1, 1), "CT100", 2.0, 7.0));
    records.push(TranscriptRecord::graded("S010", (4, 2), "CT400", 3.0, 7.0));
    records
}

#[test]
fn test_final_semester_wins_within_twenty_percent() {
    let recs = recommender(late_population(5, 4)).recommend("S010");
    let cloud: Vec<_> = recs.iter().filter(|r| r.code == "CT450").collect();

    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].target, SemesterSlot::FINAL);
    assert_eq!(cloud[0].frequency, 4);
    assert_eq!(cloud[0].group, RecommendationGroup::FinalSupplemental);
}

#[test]
fn test_earlier_semester_wins_beyond_twenty_percent() {
    let recs = recommender(late_population(6, 4)).recommend("S010");
    let cloud: Vec<_> = recs.iter().filter(|r| r.code == "CT450").collect();

    assert_eq!(cloud.len(), 1);
    assert_eq!(cloud[0].target, SemesterSlot::new(4, 3));
    assert_eq!(cloud[0].group, RecommendationGroup::Regular);
}

#[test]
fn test_final_semester_waives_prerequisites_for_capstone() {
    let mut records = Vec::new();
    for i in 0..10 {
        let id = format!("G{i:02}");
        records.push(peer(&id, (1, 1), "CT100", 2.0, 7.0));
        records.push(peer(&id, (4, 2), "MA101", 3.0, 7.0));
        records.push(peer(&id, (5, 1), "CT555", 10.0, 8.5));
    }
    // the student never passed CT400, the thesis prerequisite
    records.push(TranscriptRecord::graded("S020", (1, 1), "CT100", 2.0, 7.0));
    records.push(TranscriptRecord::graded("S020", (4, 2), "MA101", 3.0, 7.0));

    let recs = recommender(records).recommend("S020");

    assert_eq!(recs[0].code, "CT555");
    assert_eq!(recs[0].group, RecommendationGroup::Capstone);
    assert_eq!(recs[0].target, SemesterSlot::FINAL);
}

#[test]
fn test_capstone_listed_once_preferring_final_semester() {
    let mut records = Vec::new();
    for i in 0..10 {
        let id = format!("G{i:02}");
        records.push(peer(&id, (1, 1), "CT100", 2.0, 7.0));
        records.push(peer(&id, (4, 2), "CT400", 3.0, 7.0));
        // most peers took the thesis early, the rest in the final semester
        let slot = if i < 7 { (4, 3) } else { (5, 1) };
        records.push(peer(&id, slot, "CT555", 10.0, 8.5));
    }
    records.push(TranscriptRecord::graded("S030", (1, 1), "CT100", 2.0, 7.0));
    records.push(TranscriptRecord::graded("S030", (4, 2), "CT400", 3.0, 7.0));

    let recs = recommender(records).recommend("S030");
    let thesis: Vec<_> = recs.iter().filter(|r| r.code == "CT555").collect();

    assert_eq!(thesis.len(), 1);
    assert_eq!(thesis[0].group, RecommendationGroup::Capstone);
    assert_eq!(thesis[0].target, SemesterSlot::FINAL);
    assert_eq!(thesis[0].frequency, 3);
    assert_eq!(recs[0].code, "CT555");
}

#[test]
fn test_no_duplicate_codes_and_no_passed_courses() {
    let mut records = late_population(5, 4);
    for i in 0..10 {
        let id = format!("G{i:02}");
        records.push(peer(&id, (4, 3), "CT150", 3.0, 7.0));
        records.push(peer(&id, (5, 1), "CT150", 3.0, 7.0));
        records.push(peer(&id, (4, 3), "CT100", 2.0, 7.0));
    }
    let recs = recommender(records).recommend("S010");

    let codes: Vec<&str> = recs.iter().map(|r| r.code.as_str()).collect();
    let unique: BTreeSet<&str> = codes.iter().copied().collect();
    assert_eq!(codes.len(), unique.len());
    assert!(!codes.contains(&"CT100"));
}

#[test]
fn test_cohort_falls_back_to_whole_population() {
    // nobody graduated on time, so peers come from the cosine matcher
    let mut records = Vec::new();
    for i in 0..4 {
        let id = format!("P{i}");
        records.push(TranscriptRecord::graded(id.clone(), (1, 1), "CT100", 2.0, 7.0));
        records.push(TranscriptRecord::graded(id, (1, 2), "CT101", 4.0, 8.0));
    }
    records.push(TranscriptRecord::graded("S001", (1, 1), "CT100", 2.0, 7.0));

    let recs = recommender(records).recommend("S001");
    assert_eq!(recs.len(), 1);
    assert!(recs[0].reason.contains("similar students"));
    assert!(recs[0].reason.starts_with("Taken by 4/4"));
}

#[test]
fn test_report_bundles_progress() {
    let mut records = first_year_population();
    records.push(TranscriptRecord::graded("S001", (1, 1), "CT100", 2.0, 7.0));
    let report = recommender(records).recommend_with_progress("S001");

    assert_eq!(report.student_id, "S001");
    assert!((report.progress.earned - 2.0).abs() < 1e-9);
    assert_eq!(report.progress.semesters_completed, 1);
    assert_eq!(report.recommendations.len(), 1);
}
