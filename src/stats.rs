// src/stats.rs
//! Descriptive statistics over matched unit prices.

use serde::{Deserialize, Serialize};

/// Immutable price summary. Every float is rounded to 2 decimals once, here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    #[serde(rename = "quantidade")]
    pub count: usize,
    #[serde(rename = "media")]
    pub mean: f64,
    #[serde(rename = "mediana")]
    pub median: f64,
    #[serde(rename = "minimo")]
    pub min: f64,
    #[serde(rename = "maximo")]
    pub max: f64,
    /// Sample standard deviation (n - 1); 0 when fewer than two values.
    #[serde(rename = "desvio_padrao")]
    pub stdev: f64,
}

impl PriceStats {
    /// Coefficient of variation, `None` when the mean is not positive.
    pub fn variation(&self) -> Option<f64> {
        (self.mean > 0.0).then(|| self.stdev / self.mean)
    }
}

/// Summarize a set of prices. An empty set gives the all-zero summary.
pub fn summarize(prices: &[f64]) -> PriceStats {
    if prices.is_empty() {
        return PriceStats::default();
    }

    let n = prices.len();
    let mean = prices.iter().sum::<f64>() / n as f64;

    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    let stdev = if n < 2 {
        0.0
    } else {
        let ss: f64 = prices.iter().map(|p| (p - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };

    PriceStats {
        count: n,
        mean: round2(mean),
        median: round2(median),
        min: round2(sorted[0]),
        max: round2(sorted[n - 1]),
        stdev: round2(stdev),
    }
}

pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
