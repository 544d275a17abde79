// src/repository.rs
//! Record sources. The core only needs `search(filters) -> items`;
//! `InMemoryRepository` is the demo stand-in for an indexed store.

use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::matcher::Matcher;
use crate::model::{Item, NewItem, SearchFilters};
use crate::search;

pub trait RecordSource: Send + Sync {
    fn search(&self, filters: &SearchFilters) -> Vec<Item>;
}

#[derive(Debug)]
pub struct InMemoryRepository {
    items: RwLock<Vec<Item>>,
    matcher: Matcher,
}

impl InMemoryRepository {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
            matcher: Matcher::default(),
        }
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// The three cement awards used by the demo server.
    pub fn demo() -> Self {
        Self::new(demo_items())
    }

    /// Load a JSON array of award records (PNCP wire names).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading seed items from {}", path.display()))?;
        let items: Vec<Item> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing seed items from {}", path.display()))?;
        tracing::info!(
            target: "search",
            count = items.len(),
            path = %path.display(),
            "seed items loaded"
        );
        Ok(Self::new(items))
    }

    pub fn push(&self, item: Item) {
        self.items
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::demo()
    }
}

impl RecordSource for InMemoryRepository {
    fn search(&self, filters: &SearchFilters) -> Vec<Item> {
        let items = self.items.read().unwrap_or_else(|e| e.into_inner());
        search::search(&items, filters, &self.matcher)
    }
}

fn demo_items() -> Vec<Item> {
    let rows = [
        (
            "PNCP-001",
            "Cimento CP II 50kg",
            38.2,
            "Prefeitura Municipal Alfa",
            "Pregão Eletrônico",
            (2025, 7, 8),
            "Fornecedor A",
        ),
        (
            "PNCP-002",
            "Cimento Portland CP2 50 KG",
            40.1,
            "Prefeitura Municipal Beta",
            "Concorrência",
            (2025, 5, 12),
            "Fornecedor B",
        ),
        (
            "PNCP-003",
            "Cimento CP II saco 50kg",
            35.9,
            "Governo Estadual Gama",
            "Pregão Eletrônico",
            (2024, 12, 10),
            "Fornecedor C",
        ),
    ];

    rows.into_iter()
        .filter_map(|(id, desc, price, org, modality, (y, m, d), supplier)| {
            Some(Item::from(NewItem {
                id: id.to_string(),
                description: desc.to_string(),
                unit: "saco".to_string(),
                unit_price: price,
                org: org.to_string(),
                modality: modality.to_string(),
                status: "concluida".to_string(),
                award_date: NaiveDate::from_ymd_opt(y, m, d)?,
                supplier: supplier.to_string(),
                source_link: format!("https://pncp.gov.br/app/editais/{id}"),
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_has_three_cement_awards() {
        let repo = InMemoryRepository::demo();
        assert_eq!(repo.len(), 3);
        let out = repo.search(&SearchFilters::new("cimento"));
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].id(), "PNCP-001");
    }

    #[test]
    fn pushed_items_become_searchable() {
        let repo = InMemoryRepository::new(Vec::new());
        assert!(repo.is_empty());
        repo.push(demo_items().remove(1));
        let out = repo.search(&SearchFilters::new("portland"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id(), "PNCP-002");
    }

    #[test]
    fn loads_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        let json = serde_json::to_string(&demo_items()).unwrap();
        std::fs::write(&path, json).unwrap();

        let repo = InMemoryRepository::from_json_file(&path).unwrap();
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn missing_seed_file_is_an_error() {
        let err = InMemoryRepository::from_json_file(Path::new("/nonexistent/items.json"))
            .unwrap_err();
        assert!(err.to_string().contains("reading seed items"));
    }
}
