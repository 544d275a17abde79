// src/search.rs
//! Search orchestration: fuzzy term match plus structured filters.
//!
//! Stable filter over the input order; truncation to `limit` happens only
//! after every predicate ran. Org, modality and status match by normalized
//! substring; only the term goes through the fuzzy matcher.

use crate::matcher::Matcher;
use crate::model::{Item, SearchFilters};
use crate::normalize::normalize;

/// Pre-normalized view of the filters, built once per query.
struct Predicates<'a> {
    filters: &'a SearchFilters,
    term: String,
    org: Option<String>,
    modality: Option<String>,
    status: Option<String>,
}

impl<'a> Predicates<'a> {
    fn new(filters: &'a SearchFilters) -> Self {
        Self {
            filters,
            term: normalize(&filters.term),
            org: filters.org.as_deref().map(normalize),
            modality: filters.modality.as_deref().map(normalize),
            status: filters.status.as_deref().map(normalize),
        }
    }

    fn accept(&self, matcher: &Matcher, item: &Item) -> bool {
        let f = self.filters;
        matcher.matches_normalized(&self.term, item.normalized_description())
            && f.date_start.map_or(true, |start| item.award_date() >= start)
            && f.date_end.map_or(true, |end| item.award_date() <= end)
            && self
                .org
                .as_deref()
                .map_or(true, |org| normalize(item.org()).contains(org))
            && self
                .modality
                .as_deref()
                .map_or(true, |m| normalize(item.modality()).contains(m))
            && self
                .status
                .as_deref()
                .map_or(true, |s| normalize(item.status()).contains(s))
            && f.price_min.map_or(true, |min| item.unit_price() >= min)
            && f.price_max.map_or(true, |max| item.unit_price() <= max)
    }
}

/// Filter `items` by `filters`, preserving input order, capped at `limit`.
pub fn search(items: &[Item], filters: &SearchFilters, matcher: &Matcher) -> Vec<Item> {
    let preds = Predicates::new(filters);
    let out: Vec<Item> = items
        .iter()
        .filter(|item| preds.accept(matcher, item))
        .take(filters.limit)
        .cloned()
        .collect();

    tracing::debug!(
        target: "search",
        candidates = items.len(),
        returned = out.len(),
        limit = filters.limit,
        "search filtered"
    );
    out
}
