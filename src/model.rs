// src/model.rs
//! Award records and search queries.
//!
//! Wire names follow the PNCP vocabulary (`descricao`, `valor_unitario`,
//! `termo`, `limite`, ...); Rust field names are English.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// Fields of an award record as they arrive from a source, before the
/// normalized description is derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub id: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "valor_unitario")]
    pub unit_price: f64,
    #[serde(rename = "orgao")]
    pub org: String,
    #[serde(rename = "modalidade")]
    pub modality: String,
    pub status: String,
    #[serde(rename = "data_homologacao")]
    pub award_date: NaiveDate,
    #[serde(rename = "fornecedor")]
    pub supplier: String,
    #[serde(rename = "link_origem")]
    pub source_link: String,
}

/// One historical award. Immutable: the normalized description is computed
/// once from the raw description when the item is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NewItem")]
pub struct Item {
    id: String,
    #[serde(rename = "descricao")]
    description: String,
    #[serde(rename = "descricao_normalizada")]
    normalized_description: String,
    #[serde(rename = "unidade")]
    unit: String,
    #[serde(rename = "valor_unitario")]
    unit_price: f64,
    #[serde(rename = "orgao")]
    org: String,
    #[serde(rename = "modalidade")]
    modality: String,
    status: String,
    #[serde(rename = "data_homologacao")]
    award_date: NaiveDate,
    #[serde(rename = "fornecedor")]
    supplier: String,
    #[serde(rename = "link_origem")]
    source_link: String,
}

impl From<NewItem> for Item {
    fn from(n: NewItem) -> Self {
        Self {
            normalized_description: normalize(&n.description),
            id: n.id,
            description: n.description,
            unit: n.unit,
            // prices are non-negative by contract
            unit_price: n.unit_price.max(0.0),
            org: n.org,
            modality: n.modality,
            status: n.status,
            award_date: n.award_date,
            supplier: n.supplier,
            source_link: n.source_link,
        }
    }
}

impl Item {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn normalized_description(&self) -> &str {
        &self.normalized_description
    }
    pub fn unit(&self) -> &str {
        &self.unit
    }
    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }
    pub fn org(&self) -> &str {
        &self.org
    }
    pub fn modality(&self) -> &str {
        &self.modality
    }
    pub fn status(&self) -> &str {
        &self.status
    }
    pub fn award_date(&self) -> NaiveDate {
        self.award_date
    }
    pub fn supplier(&self) -> &str {
        &self.supplier
    }
    pub fn source_link(&self) -> &str {
        &self.source_link
    }
}

pub const DEFAULT_LIMIT: usize = 100;

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// A price-research query. Only `term` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(rename = "termo")]
    pub term: String,
    #[serde(rename = "data_inicio", default)]
    pub date_start: Option<NaiveDate>,
    #[serde(rename = "data_fim", default)]
    pub date_end: Option<NaiveDate>,
    #[serde(rename = "orgao", default)]
    pub org: Option<String>,
    #[serde(rename = "modalidade", default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "valor_min", default)]
    pub price_min: Option<f64>,
    #[serde(rename = "valor_max", default)]
    pub price_max: Option<f64>,
    #[serde(rename = "limite", default = "default_limit")]
    pub limit: usize,
}

impl SearchFilters {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            date_start: None,
            date_end: None,
            org: None,
            modality: None,
            status: None,
            price_min: None,
            price_max: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Reject contradictory or out-of-range bounds. Called at the boundary
    /// (API, analysis service) before the filters reach the search pipeline.
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.limit == 0 {
            return Err(FilterError::ZeroLimit);
        }
        if let (Some(start), Some(end)) = (self.date_start, self.date_end) {
            if start > end {
                return Err(FilterError::DateRange { start, end });
            }
        }
        for bound in [self.price_min, self.price_max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(FilterError::PriceBound(bound));
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(FilterError::PriceRange { min, max });
            }
        }
        Ok(())
    }
}

/// Caller-contract violations in [`SearchFilters`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("data_inicio {start} is after data_fim {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("valor_min {min} is greater than valor_max {max}")]
    PriceRange { min: f64, max: f64 },

    #[error("price bound {0} must be a non-negative number")]
    PriceBound(f64),

    #[error("limite must be a positive integer")]
    ZeroLimit,
}
