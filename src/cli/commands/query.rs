//! Handlers for the per-student query commands

use crate::args::StudentQuery;
use course_compass::core::clustering::FileModelRepository;
use course_compass::core::models::{LearningPlan, Recommendation};
use course_compass::core::progress::CreditSummary;
use course_compass::core::store::InMemoryStore;
use course_compass::{error, verbose, warn, Config, Recommender};
use serde::Serialize;
use std::collections::BTreeMap;

/// Build a recommender from config, publishing the model if one is saved.
///
/// A missing or mismatched model is reported but not fatal: recommendations
/// do not need it, and the model-backed queries degrade on their own.
fn open(config: &Config) -> Option<Recommender<InMemoryStore>> {
    let store = match super::load_store(config) {
        Ok(store) => store,
        Err(message) => {
            eprintln!("{message}");
            return None;
        }
    };

    let recommender = match Recommender::new(store, config.recommender_options()) {
        Ok(recommender) => recommender,
        Err(e) => {
            error!("Failed to initialize recommender: {e}");
            eprintln!("✗ {e}");
            return None;
        }
    };

    let repository = FileModelRepository::new(&config.model.artifact_file);
    match recommender.load_model(&repository) {
        Ok(version) => verbose!("Using model v{version} from {}", repository.path().display()),
        Err(e) => warn!("{e}; run `coursecompass train` first"),
    }
    Some(recommender)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            eprintln!("✗ Failed to serialize output: {e}");
            false
        }
    }
}

/// `recommend STUDENT [--progress] [--json]`
pub fn recommend(config: &Config, query: &StudentQuery, with_progress: bool) -> bool {
    let Some(recommender) = open(config) else {
        return false;
    };

    if with_progress {
        let report = recommender.recommend_with_progress(&query.student_id);
        if query.json {
            return print_json(&report);
        }
        print_progress(&report.student_id, &report.progress);
        println!();
        print_recommendations(&report.recommendations);
        return true;
    }

    let recommendations = recommender.recommend(&query.student_id);
    if query.json {
        return print_json(&recommendations);
    }
    print_recommendations(&recommendations);
    true
}

/// `plans STUDENT [--json]`
pub fn plans(config: &Config, query: &StudentQuery) -> bool {
    let Some(recommender) = open(config) else {
        return false;
    };
    let plans = recommender.learning_plans(&query.student_id);
    if query.json {
        return print_json(&plans);
    }
    if plans.is_empty() {
        println!("No learning plans available (is a model trained?)");
        return true;
    }
    for plan in &plans {
        print_plan(plan);
    }
    true
}

/// `distances STUDENT [--json]`
pub fn distances(config: &Config, query: &StudentQuery) -> bool {
    let Some(recommender) = open(config) else {
        return false;
    };
    let distances: BTreeMap<usize, f64> = recommender.cluster_distances(&query.student_id);
    if query.json {
        return print_json(&distances);
    }
    println!("{:<10} {:>10}", "Cluster", "Distance");
    for (cluster, distance) in &distances {
        println!("{cluster:<10} {distance:>10.4}");
    }
    true
}

/// `progress STUDENT [--json]`
pub fn progress(config: &Config, query: &StudentQuery) -> bool {
    let Some(recommender) = open(config) else {
        return false;
    };
    match recommender.credit_summary(&query.student_id) {
        Ok(summary) if query.json => print_json(&summary),
        Ok(summary) => {
            print_progress(&query.student_id, &summary);
            true
        }
        Err(e) => {
            error!("Progress for {} failed: {e}", query.student_id);
            eprintln!("✗ {e}");
            false
        }
    }
}

fn print_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("No recommendations");
        return;
    }
    println!(
        "{:<20} {:<18} {:<8} {:<40} {:>7} {:>5} {:>6} {:>6}",
        "Group", "Semester", "Code", "Name", "Credits", "Freq", "Avg", "Pass%"
    );
    for r in recommendations {
        println!(
            "{:<20} {:<18} {:<8} {:<40} {:>7} {:>5} {:>6.2} {:>6.1}",
            r.group.to_string(),
            r.target.to_string(),
            r.code,
            r.name,
            r.credits,
            r.frequency,
            r.avg_score,
            r.pass_rate
        );
        verbose!("  {}", r.reason);
    }
}

fn print_progress(student_id: &str, summary: &CreditSummary) {
    println!("=== Credit progress for {student_id} ===");
    println!(
        "Earned:     {:.1} / {:.0} ({:.1}%)",
        summary.earned, summary.required, summary.percentage
    );
    println!("Remaining:  {:.1}", summary.remaining);
    println!(
        "Semesters:  {} completed, {} remaining",
        summary.semesters_completed, summary.semesters_remaining
    );
    println!(
        "Pace:       expected {:.1} at {:.2}/semester, shortfall {:.1} ({})",
        summary.expected,
        summary.per_semester_target,
        summary.shortfall,
        if summary.on_pace { "on pace" } else { "behind" }
    );
    for (year, credits) in &summary.credits_by_year {
        println!("  Year {year}: {credits:.1}");
    }
}

fn print_plan(plan: &LearningPlan) {
    println!(
        "\n=== Cluster {} (distance {:.4}) ===",
        plan.cluster_id, plan.distance
    );
    let Some(representative) = &plan.representative else {
        println!("  No representative student");
        return;
    };
    println!(
        "  Following {representative}: {:.1} credits planned, {:.0} required",
        plan.total_credits, plan.target_credits
    );
    for semester in &plan.semesters {
        println!("  {} ({:.1} credits)", semester.slot, semester.credits);
        for course in &semester.courses {
            println!("    {:<8} {:<40} {:>5}", course.code, course.name, course.credits);
        }
    }
}
