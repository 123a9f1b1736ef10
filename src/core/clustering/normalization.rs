//! Zero-mean / unit-variance feature scaling

use serde::{Deserialize, Serialize};

/// Per-dimension mean and scale fitted on a training population.
///
/// Scale is the population standard deviation; dimensions with zero
/// variance get scale 1.0 so they map to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParameters {
    /// Per-dimension mean
    pub mean: Vec<f64>,
    /// Per-dimension scale
    pub scale: Vec<f64>,
}

impl NormalizationParameters {
    /// Fit parameters on equally sized vectors.
    ///
    /// Returns `None` when `data` is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(data: &[Vec<f64>]) -> Option<Self> {
        let first = data.first()?;
        let dimension = first.len();
        let n = data.len() as f64;

        let mut mean = vec![0.0; dimension];
        for row in data {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut variance = vec![0.0; dimension];
        for row in data {
            for ((var, v), m) in variance.iter_mut().zip(row).zip(&mean) {
                *var += (v - m).powi(2);
            }
        }

        let scale = variance
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Some(Self { mean, scale })
    }

    /// Dimensionality the parameters were fitted on
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Normalize one vector
    #[must_use]
    pub fn transform(&self, vector: &[f64]) -> Vec<f64> {
        vector
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}
