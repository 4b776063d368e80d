//! Summary statistics over hop ratios

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

/// Descriptive statistics of a sample of ratios.
///
/// An empty sample summarizes to all zeros so the result stays
/// JSON-serializable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (0.0 for fewer than two values)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl RatioStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let std_dev = if values.len() > 1 {
            values.iter().std_dev()
        } else {
            0.0
        };

        Self {
            count: values.len(),
            mean: values.iter().mean(),
            median: Data::new(values.to_vec()).median(),
            std_dev,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}
