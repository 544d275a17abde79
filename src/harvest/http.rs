// src/harvest/http.rs
//! reqwest-backed transport.

use serde_json::Value;

use super::config::HarvestConfig;
use super::types::{PageTransport, Params, TransportError};
use super::HarvestError;

pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: &HarvestConfig) -> Result<Self, HarvestError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pncp-pricing/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| HarvestError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl PageTransport for HttpTransport {
    async fn get_json(&self, path: &str, params: &Params) -> Result<Value, TransportError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(params)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
