// src/harvest/config.rs
use std::time::Duration;

use serde::Deserialize;

use super::HarvestError;

pub const DEFAULT_BASE_URL: &str = "https://pncp.gov.br/api";

/// Harvester settings. Immutable once handed to a `Harvester`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub base_url: String,
    pub timeout_secs: f64,
    /// Additional attempts after the first one.
    pub max_retries: u32,
    /// Outbound calls per second, shared by first attempts and retries.
    pub qps_limit: f64,
    /// Delay before retry `k` is `backoff_base_secs * 2^k`.
    pub backoff_base_secs: f64,
    /// Hard ceiling on pages per `fetch_all`.
    pub max_pages: u32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 20.0,
            max_retries: 3,
            qps_limit: 2.0,
            backoff_base_secs: 1.0,
            max_pages: 1000,
        }
    }
}

impl HarvestConfig {
    pub fn validate(&self) -> Result<(), HarvestError> {
        if !(self.qps_limit.is_finite() && self.qps_limit > 0.0) {
            return Err(HarvestError::Config(format!(
                "qps_limit must be a positive number, got {}",
                self.qps_limit
            )));
        }
        if Duration::try_from_secs_f64(1.0 / self.qps_limit).is_err() {
            return Err(HarvestError::Config(format!(
                "qps_limit {} gives a call interval too long to represent",
                self.qps_limit
            )));
        }
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(HarvestError::Config(format!(
                "timeout_secs must be a positive number, got {}",
                self.timeout_secs
            )));
        }
        if Duration::try_from_secs_f64(self.timeout_secs).is_err() {
            return Err(HarvestError::Config(format!(
                "timeout_secs {} is too large",
                self.timeout_secs
            )));
        }
        if !(self.backoff_base_secs.is_finite() && self.backoff_base_secs >= 0.0) {
            return Err(HarvestError::Config(format!(
                "backoff_base_secs must be >= 0, got {}",
                self.backoff_base_secs
            )));
        }
        // the longest wait is the one before the last retry
        let last = self.max_retries.saturating_sub(1);
        if Duration::try_from_secs_f64(self.backoff_base_secs * backoff_factor(last)).is_err() {
            return Err(HarvestError::Config(format!(
                "backoff_base_secs {} overflows after {} retries",
                self.backoff_base_secs, self.max_retries
            )));
        }
        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be > 0".into()));
        }
        if self.base_url.trim().is_empty() {
            return Err(HarvestError::Config("base_url is empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        saturating_secs(self.timeout_secs)
    }

    /// Minimum spacing between two outbound calls.
    pub fn min_interval(&self) -> Duration {
        saturating_secs(1.0 / self.qps_limit)
    }

    /// Delay before retry `attempt` (0-indexed).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        saturating_secs(self.backoff_base_secs * backoff_factor(attempt))
    }
}

// exponent capped at 2^20
fn backoff_factor(attempt: u32) -> f64 {
    2f64.powi(attempt.min(20) as i32)
}

/// Seconds as a `Duration`; values `validate` would reject clamp to
/// zero (negative, NaN) or `Duration::MAX` (too large).
fn saturating_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_polite() {
        let cfg = HarvestConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.min_interval(), Duration::from_millis(500));
        assert_eq!(cfg.timeout(), Duration::from_secs(20));
    }

    #[test]
    fn backoff_doubles() {
        let cfg = HarvestConfig::default();
        let delays: Vec<_> = (0..4).map(|k| cfg.backoff_delay(k)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
    }

    #[test]
    fn rejects_non_positive_rate() {
        for qps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = HarvestConfig {
                qps_limit: qps,
                ..Default::default()
            };
            assert!(matches!(cfg.validate(), Err(HarvestError::Config(_))), "{qps}");
        }
    }

    #[test]
    fn rejects_values_a_duration_cannot_hold() {
        let tiny_rate = HarvestConfig {
            qps_limit: 1e-300,
            ..Default::default()
        };
        assert!(matches!(tiny_rate.validate(), Err(HarvestError::Config(_))));

        let huge_backoff = HarvestConfig {
            backoff_base_secs: 1e300,
            ..Default::default()
        };
        assert!(matches!(huge_backoff.validate(), Err(HarvestError::Config(_))));

        let huge_timeout = HarvestConfig {
            timeout_secs: 1e300,
            ..Default::default()
        };
        assert!(matches!(huge_timeout.validate(), Err(HarvestError::Config(_))));

        // base fits on its own but not once doubled for the last retry
        let doubled_past_max = HarvestConfig {
            backoff_base_secs: u64::MAX as f64 / 4.0,
            max_retries: 5,
            ..Default::default()
        };
        assert!(matches!(doubled_past_max.validate(), Err(HarvestError::Config(_))));
        let single_try = HarvestConfig {
            max_retries: 0,
            ..doubled_past_max
        };
        assert!(single_try.validate().is_ok());
    }

    #[test]
    fn durations_saturate_instead_of_panicking() {
        let cfg = HarvestConfig {
            qps_limit: 1e-300,
            backoff_base_secs: 1e300,
            timeout_secs: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(cfg.min_interval(), Duration::MAX);
        assert_eq!(cfg.backoff_delay(3), Duration::MAX);
        assert_eq!(cfg.timeout(), Duration::MAX);

        let negative = HarvestConfig {
            backoff_base_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(negative.backoff_delay(0), Duration::ZERO);
    }

    #[test]
    fn harvester_rejects_unrepresentable_rate() {
        let cfg = HarvestConfig {
            qps_limit: 1e-300,
            ..Default::default()
        };
        assert!(matches!(
            super::super::Harvester::new(cfg),
            Err(HarvestError::Config(_))
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: HarvestConfig = toml::from_str("qps_limit = 5.0\nmax_retries = 1").unwrap();
        assert_eq!(cfg.qps_limit, 5.0);
        assert_eq!(cfg.max_retries, 1);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
