// src/compliance.rs
//! Rule-based compliance advisor.
//!
//! Rules are evaluated independently and in a fixed order; zero or more may
//! fire. Thresholds live in [`CompliancePolicy`] so boundary values can be
//! exercised in tests and tuned from config.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::Item;
use crate::stats::PriceStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Risk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertCode {
    #[serde(rename = "AMOSTRA_INSUFICIENTE")]
    InsufficientSample,
    #[serde(rename = "RECENCIA_BAIXA")]
    LowRecency,
    #[serde(rename = "ALTA_VARIABILIDADE")]
    HighVariability,
}

impl AlertCode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCode::InsufficientSample => "AMOSTRA_INSUFICIENTE",
            AlertCode::LowRecency => "RECENCIA_BAIXA",
            AlertCode::HighVariability => "ALTA_VARIABILIDADE",
        }
    }
}

impl std::fmt::Display for AlertCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Risk => "risk",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAlert {
    #[serde(rename = "nivel")]
    pub severity: Severity,
    #[serde(rename = "codigo")]
    pub code: AlertCode,
    #[serde(rename = "mensagem")]
    pub message: String,
}

/// Tunable thresholds for the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompliancePolicy {
    /// Fewer matched items than this fires `AMOSTRA_INSUFICIENTE`.
    pub min_sample: usize,
    /// Awards older than this many days (before "today") count as stale.
    pub recency_window_days: i64,
    /// Stale fraction strictly above this fires `RECENCIA_BAIXA`.
    pub stale_ratio_limit: f64,
    /// Coefficient of variation strictly above this fires `ALTA_VARIABILIDADE`.
    pub variability_limit: f64,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self {
            min_sample: 3,
            recency_window_days: 180,
            stale_ratio_limit: 0.4,
            variability_limit: 0.5,
        }
    }
}

/// Evaluate every rule against `items`/`stats` as of `today`.
///
/// `today` is the evaluation date; the recency rule depends on it, so the
/// result must be computed per query and never cached.
pub fn advise(
    items: &[Item],
    stats: &PriceStats,
    today: NaiveDate,
    policy: &CompliancePolicy,
) -> Vec<ComplianceAlert> {
    let mut alerts = Vec::new();

    if items.len() < policy.min_sample {
        alerts.push(ComplianceAlert {
            severity: Severity::Warning,
            code: AlertCode::InsufficientSample,
            message: format!(
                "A amostra contém menos de {} evidências. Recomenda-se ampliar o período ou filtros.",
                policy.min_sample
            ),
        });
    }

    if !items.is_empty() {
        let cutoff = today - Duration::days(policy.recency_window_days);
        let stale = items.iter().filter(|i| i.award_date() < cutoff).count();
        if stale as f64 / items.len() as f64 > policy.stale_ratio_limit {
            alerts.push(ComplianceAlert {
                severity: Severity::Warning,
                code: AlertCode::LowRecency,
                message: format!(
                    "Mais de {:.0}% dos registros são antigos (>{} dias). Avalie atualização da cesta.",
                    policy.stale_ratio_limit * 100.0,
                    policy.recency_window_days
                ),
            });
        }
    }

    if stats
        .variation()
        .is_some_and(|cv| cv > policy.variability_limit)
    {
        alerts.push(ComplianceAlert {
            severity: Severity::Risk,
            code: AlertCode::HighVariability,
            message: "Alta dispersão de preços detectada. Revise outliers e comparabilidade dos itens."
                .to_string(),
        });
    }

    alerts
}

/// [`advise`] against the current local date.
pub fn advise_now(
    items: &[Item],
    stats: &PriceStats,
    policy: &CompliancePolicy,
) -> Vec<ComplianceAlert> {
    advise(items, stats, chrono::Local::now().date_naive(), policy)
}
