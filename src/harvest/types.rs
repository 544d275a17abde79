// src/harvest/types.rs
use std::collections::BTreeMap;

use serde_json::Value;

/// Query parameters of one page request; ordered so requests are reproducible.
pub type Params = BTreeMap<String, String>;

/// One failed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid JSON body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Transport failures and non-2xx statuses are transient; a body we
    /// cannot decode will not improve on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Status(_) | TransportError::Network(_))
    }
}

/// Performs a single GET against the upstream API and decodes the JSON body.
/// No retry or throttling here; the `Harvester` owns both.
#[async_trait::async_trait]
pub trait PageTransport: Send + Sync {
    async fn get_json(&self, path: &str, params: &Params) -> Result<Value, TransportError>;
}

#[async_trait::async_trait]
impl<T: PageTransport + ?Sized> PageTransport for std::sync::Arc<T> {
    async fn get_json(&self, path: &str, params: &Params) -> Result<Value, TransportError> {
        (**self).get_json(path, params).await
    }
}
