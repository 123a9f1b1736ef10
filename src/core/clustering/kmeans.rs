//! K-means with k-means++ seeding and seeded restarts
//!
//! Objective: minimize the within-cluster sum of squares
//!
//! ```text
//! J = Σ_k Σ_{x ∈ C_k} ||x - μ_k||²
//! ```
//!
//! Every restart draws from one `StdRng` seeded once, so the same input and
//! seed always produce the same centroids.

use crate::core::distance::squared_euclidean;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of clusters used by the recommender
pub const DEFAULT_CLUSTERS: usize = 5;
/// Independent restarts; the lowest-inertia run is kept
pub const DEFAULT_RESTARTS: usize = 10;
/// Iteration cap per restart
pub const DEFAULT_MAX_ITER: usize = 300;
/// Convergence threshold on the total squared centroid shift
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// Seed for reproducible training
pub const DEFAULT_SEED: u64 = 42;

/// K-means configuration
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Number of clusters
    pub k: usize,
    /// Number of restarts
    pub restarts: usize,
    /// Maximum iterations per restart
    pub max_iter: usize,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTERS,
            restarts: DEFAULT_RESTARTS,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Result of a fit
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// One centroid per cluster
    pub centroids: Vec<Vec<f64>>,
    /// Cluster of each input point
    pub labels: Vec<usize>,
    /// Within-cluster sum of squares
    pub inertia: f64,
    /// Iterations used by the winning restart
    pub iterations: usize,
}

impl KMeans {
    /// K-means with `k` clusters and default settings
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Set the seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of restarts (at least one is always run)
    #[must_use]
    pub const fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    /// Set the iteration cap
    #[must_use]
    pub const fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Fit on equally sized points.
    ///
    /// # Errors
    /// Returns a message if there are fewer points than clusters, `k` is 0,
    /// or the points differ in length.
    pub fn fit(&self, data: &[Vec<f64>]) -> Result<KMeansFit, String> {
        if self.k == 0 {
            return Err("k must be at least 1".to_string());
        }
        if data.len() < self.k {
            return Err(format!(
                "k={} cannot exceed sample count={}",
                self.k,
                data.len()
            ));
        }
        let dimension = data[0].len();
        if let Some(bad) = data.iter().find(|p| p.len() != dimension) {
            return Err(format!(
                "dimension mismatch: expected {dimension}, got {}",
                bad.len()
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for restart in 0..self.restarts.max(1) {
            let fit = self.run_once(data, &mut rng);
            crate::debug!(
                "k-means restart {restart}: inertia {:.4} after {} iterations",
                fit.inertia,
                fit.iterations
            );
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.ok_or_else(|| "no restart produced a result".to_string())
    }

    fn run_once(&self, data: &[Vec<f64>], rng: &mut StdRng) -> KMeansFit {
        let mut centroids = plus_plus_init(data, self.k, rng);
        let mut labels = vec![0; data.len()];
        let mut iterations = 0;

        for iteration in 1..=self.max_iter {
            iterations = iteration;
            assign(data, &centroids, &mut labels);

            let updated = update_centroids(data, &labels, &centroids);
            let shift: f64 = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| squared_euclidean(old, new))
                .sum();
            centroids = updated;

            if shift <= self.tolerance {
                break;
            }
        }

        assign(data, &centroids, &mut labels);
        let inertia = data
            .iter()
            .zip(&labels)
            .map(|(point, &label)| squared_euclidean(point, &centroids[label]))
            .sum();

        KMeansFit {
            centroids,
            labels,
            inertia,
            iterations,
        }
    }
}

/// Index of the nearest centroid (first on ties) and its squared distance
#[must_use]
pub fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_euclidean(point, c)))
        .fold((0, f64::INFINITY), |best, cur| {
            if cur.1 < best.1 {
                cur
            } else {
                best
            }
        })
}

/// k-means++ seeding: first centroid uniform, the rest drawn with
/// probability proportional to squared distance from the nearest chosen one.
fn plus_plus_init(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = data.iter().map(|p| nearest(p, &centroids).1).collect();
        let total: f64 = weights.iter().sum();

        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            weights
                .iter()
                .position(|&w| {
                    target -= w;
                    target < 0.0
                })
                .unwrap_or(data.len() - 1)
        } else {
            // all remaining points coincide with a centroid
            rng.gen_range(0..data.len())
        };
        centroids.push(data[chosen].clone());
    }

    centroids
}

fn assign(data: &[Vec<f64>], centroids: &[Vec<f64>], labels: &mut [usize]) {
    for (label, point) in labels.iter_mut().zip(data) {
        *label = nearest(point, centroids).0;
    }
}

/// Mean of each cluster's members. An empty cluster takes the point that
/// is currently farthest from its own centroid.
#[allow(clippy::cast_precision_loss)]
fn update_centroids(data: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dimension = data[0].len();
    let mut sums = vec![vec![0.0; dimension]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &label) in data.iter().zip(labels) {
        counts[label] += 1;
        for (s, v) in sums[label].iter_mut().zip(point) {
            *s += v;
        }
    }

    let mut taken = vec![false; data.len()];
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            if count > 0 {
                return sum.into_iter().map(|s| s / count as f64).collect::<Vec<f64>>();
            }
            let farthest = data
                .iter()
                .zip(labels)
                .enumerate()
                .filter(|(i, _)| !taken[*i])
                .map(|(i, (point, &label))| (i, squared_euclidean(point, &previous[label])))
                .fold((0, f64::NEG_INFINITY), |best, cur| {
                    if cur.1 > best.1 {
                        cur
                    } else {
                        best
                    }
                })
                .0;
            taken[farthest] = true;
            data[farthest].clone()
        })
        .collect()
}
