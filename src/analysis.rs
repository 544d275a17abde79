// src/analysis.rs
//! One price-research query end to end: validate, search, summarize, advise.

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;

use crate::compliance::{self, ComplianceAlert, CompliancePolicy};
use crate::model::{FilterError, Item, SearchFilters};
use crate::repository::RecordSource;
use crate::stats::{self, PriceStats};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingAnalysis {
    #[serde(rename = "itens")]
    pub items: Vec<Item>,
    #[serde(rename = "estatisticas")]
    pub stats: PriceStats,
    #[serde(rename = "alertas")]
    pub alerts: Vec<ComplianceAlert>,
}

/// Run a query against `source` as of `today`. Nothing is cached: identical
/// queries recompute from scratch.
pub fn analyze(
    source: &dyn RecordSource,
    filters: &SearchFilters,
    policy: &CompliancePolicy,
    today: NaiveDate,
) -> Result<PricingAnalysis, FilterError> {
    filters.validate()?;
    counter!("search_queries_total").increment(1);

    let items = source.search(filters);
    let prices: Vec<f64> = items.iter().map(Item::unit_price).collect();
    let stats = stats::summarize(&prices);
    let alerts = compliance::advise(&items, &stats, today, policy);

    tracing::info!(
        target: "search",
        matched = items.len(),
        alerts = alerts.len(),
        "pricing analysis done"
    );

    Ok(PricingAnalysis {
        items,
        stats,
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::AlertCode;
    use crate::repository::InMemoryRepository;

    #[test]
    fn demo_cement_query() {
        let repo = InMemoryRepository::demo();
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let out = analyze(
            &repo,
            &SearchFilters::new("cimento"),
            &CompliancePolicy::default(),
            today,
        )
        .unwrap();

        assert_eq!(out.items.len(), 3);
        assert_eq!(out.stats.count, 3);
        assert_eq!(out.stats.mean, 38.07);
        let codes: Vec<_> = out.alerts.iter().map(|a| a.code).collect();
        assert_eq!(codes, vec![AlertCode::LowRecency]);
    }

    #[test]
    fn invalid_filters_never_reach_the_source() {
        let repo = InMemoryRepository::demo();
        let mut f = SearchFilters::new("cimento");
        f.price_min = Some(40.0);
        f.price_max = Some(1.0);
        let today = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let err = analyze(&repo, &f, &CompliancePolicy::default(), today).unwrap_err();
        assert!(matches!(err, FilterError::PriceRange { .. }));
    }
}
