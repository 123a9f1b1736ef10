//! Train command handler

use course_compass::core::clustering::{train_and_publish, FileModelRepository, TrainingMode};
use course_compass::{error, info, Config};

/// Train a model from the configured transcripts and save it to the
/// configured artifact path.
///
/// # Arguments
/// * `config` - Data and model settings
/// * `mode` - Population override (`--mode`)
/// * `seed` - Seed override (`--seed`)
/// * `restarts` - Restart override (`--restarts`)
/// * `verbose` - Whether to print cluster sizes
///
/// # Returns
/// `true` when a new artifact was written
pub fn run(
    config: &Config,
    mode: Option<TrainingMode>,
    seed: Option<u64>,
    restarts: Option<usize>,
    verbose: bool,
) -> bool {
    let mut options = match config.training_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("✗ Invalid [model] configuration: {e}");
            return false;
        }
    };
    if let Some(mode) = mode {
        options.mode = mode;
    }
    if let Some(seed) = seed {
        options.kmeans = options.kmeans.with_seed(seed);
    }
    if let Some(restarts) = restarts {
        options.kmeans = options.kmeans.with_restarts(restarts);
    }

    let store = match super::load_store(config) {
        Ok(store) => store,
        Err(message) => {
            eprintln!("{message}");
            return false;
        }
    };

    let repository = FileModelRepository::new(&config.model.artifact_file);
    info!(
        "Training {} clusters on {} population (seed {})",
        options.kmeans.k, options.mode, options.kmeans.seed
    );

    match train_and_publish(&store, &repository, &options) {
        Ok(artifact) => {
            println!(
                "✓ Model v{} trained on {} students ({} clusters, inertia {:.3})",
                artifact.version,
                artifact.assignments.len(),
                artifact.k,
                artifact.inertia
            );
            println!("  Saved to: {}", repository.path().display());
            if verbose {
                for cluster in 0..artifact.k {
                    println!("  Cluster {cluster}: {} students", artifact.members(cluster).count());
                }
            }
            true
        }
        Err(e) => {
            error!("Training failed: {e}");
            eprintln!("✗ Training failed: {e}");
            false
        }
    }
}
