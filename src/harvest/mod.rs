// src/harvest/mod.rs
//! Polite paginated harvester for the PNCP API.
//!
//! Per request: throttle → send → success | retryable failure → backoff →
//! send again | fatal failure. Pagination walks `pagina = 1, 2, ...` and
//! stops at the first page whose `data` array is empty or missing, or at
//! the configured page ceiling.

pub mod config;
pub mod http;
pub mod limiter;
pub mod types;

use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::{debug, info, warn};

pub use config::HarvestConfig;
pub use http::HttpTransport;
pub use limiter::RateLimiter;
pub use types::{PageTransport, Params, TransportError};

/// Query parameter carrying the 1-based page counter.
pub const PAGE_PARAM: &str = "pagina";

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error("invalid harvest config: {0}")]
    Config(String),

    #[error("GET {path} (page {}) failed after {attempts} attempt(s): {source}", page_label(.page))]
    Request {
        path: String,
        page: Option<u32>,
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

fn page_label(page: &Option<u32>) -> String {
    page.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
}

pub struct Harvester<T = HttpTransport> {
    cfg: HarvestConfig,
    transport: T,
    limiter: Arc<RateLimiter>,
}

impl Harvester<HttpTransport> {
    /// Harvester over HTTP with its own rate limiter.
    pub fn new(cfg: HarvestConfig) -> Result<Self, HarvestError> {
        cfg.validate()?;
        let transport = HttpTransport::new(&cfg)?;
        Ok(Self::from_parts(cfg, transport))
    }
}

impl<T: PageTransport> Harvester<T> {
    /// Harvester over a custom transport with its own rate limiter.
    pub fn with_transport(cfg: HarvestConfig, transport: T) -> Result<Self, HarvestError> {
        cfg.validate()?;
        Ok(Self::from_parts(cfg, transport))
    }

    fn from_parts(cfg: HarvestConfig, transport: T) -> Self {
        let limiter = Arc::new(RateLimiter::new(cfg.min_interval()));
        Self {
            cfg,
            transport,
            limiter,
        }
    }

    /// Replace the private limiter with one shared across harvesters, so
    /// they draw from a single rate budget.
    pub fn with_shared_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.cfg
    }

    /// One logical GET with throttling and retry/backoff.
    pub async fn fetch_page(&self, path: &str, params: &Params) -> Result<Value, HarvestError> {
        self.request(path, params, None).await
    }

    /// Fetch every page of `path`, concatenating the `data` arrays.
    pub async fn fetch_all(
        &self,
        path: &str,
        initial_params: &Params,
    ) -> Result<Vec<Value>, HarvestError> {
        let mut params = initial_params.clone();
        let mut records = Vec::new();
        let mut page: u32 = 1;

        loop {
            if page > self.cfg.max_pages {
                warn!(
                    target: "harvest",
                    path,
                    max_pages = self.cfg.max_pages,
                    records = records.len(),
                    "page ceiling reached; stopping pagination"
                );
                break;
            }

            params.insert(PAGE_PARAM.to_string(), page.to_string());
            let payload = self.request(path, &params, Some(page)).await?;

            let data = match payload.get("data") {
                Some(Value::Array(items)) if !items.is_empty() => items.clone(),
                _ => {
                    debug!(target: "harvest", path, page, "empty page; end of stream");
                    break;
                }
            };

            counter!("harvest_pages_total").increment(1);
            debug!(target: "harvest", path, page, count = data.len(), "page fetched");
            records.extend(data);
            page += 1;
        }

        info!(
            target: "harvest",
            path,
            pages = page - 1,
            records = records.len(),
            "harvest finished"
        );
        Ok(records)
    }

    async fn request(
        &self,
        path: &str,
        params: &Params,
        page: Option<u32>,
    ) -> Result<Value, HarvestError> {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await;
            counter!("harvest_requests_total").increment(1);

            match self.transport.get_json(path, params).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.cfg.max_retries => {
                    let delay = self.cfg.backoff_delay(attempt);
                    warn!(
                        target: "harvest",
                        path,
                        page = ?page,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed; backing off"
                    );
                    counter!("harvest_retries_total").increment(1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    counter!("harvest_failures_total").increment(1);
                    return Err(HarvestError::Request {
                        path: path.to_string(),
                        page,
                        attempts: attempt + 1,
                        source: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Replays canned results and records when each call happened.
    struct Scripted {
        replies: Mutex<VecDeque<Result<Value, TransportError>>>,
        calls: Mutex<Vec<(Instant, Params)>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Value, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl PageTransport for Scripted {
        async fn get_json(&self, _path: &str, params: &Params) -> Result<Value, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), params.clone()));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(serde_json::json!({ "data": [] })))
        }
    }

    fn cfg() -> HarvestConfig {
        HarvestConfig {
            base_url: "http://unused".into(),
            max_retries: 2,
            qps_limit: 2.0,
            backoff_base_secs: 1.0,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn decode_errors_are_not_retried() {
        let script = Scripted::new(vec![Err(TransportError::Decode("eof".into()))]);
        let h = Harvester::with_transport(cfg(), script).unwrap();
        let err = h.fetch_page("x", &Params::new()).await.unwrap_err();
        match err {
            HarvestError::Request { attempts, page, .. } => {
                assert_eq!(attempts, 1);
                assert_eq!(page, None);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(h.transport.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_report_page_and_attempts() {
        let script = Scripted::new(vec![
            Ok(serde_json::json!({ "data": [1] })),
            Err(TransportError::Status(503)),
            Err(TransportError::Status(503)),
            Err(TransportError::Network("reset".into())),
        ]);
        let h = Harvester::with_transport(cfg(), script).unwrap();
        let err = h.fetch_all("itens", &Params::new()).await.unwrap_err();
        let msg = err.to_string();
        match err {
            HarvestError::Request {
                page, attempts, ref source, ..
            } => {
                assert_eq!(page, Some(2));
                assert_eq!(attempts, 3);
                assert_eq!(*source, TransportError::Network("reset".into()));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(msg.contains("GET itens (page 2) failed after 3 attempt(s)"), "{msg}");
    }

    #[tokio::test(start_paused = true)]
    async fn page_ceiling_stops_endless_upstream() {
        let replies = (0..10)
            .map(|i| Ok(serde_json::json!({ "data": [i] })))
            .collect();
        let script = Scripted::new(replies);
        let h = Harvester::with_transport(
            HarvestConfig {
                max_pages: 3,
                ..cfg()
            },
            script,
        )
        .unwrap();
        let out = h.fetch_all("x", &Params::new()).await.unwrap();
        assert_eq!(out, vec![serde_json::json!(0), serde_json::json!(1), serde_json::json!(2)]);
        assert_eq!(h.transport.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_or_non_array_data_ends_pagination() {
        let script = Scripted::new(vec![
            Ok(serde_json::json!({ "data": ["a"] })),
            Ok(serde_json::json!({ "data": "nope" })),
        ]);
        let h = Harvester::with_transport(cfg(), script).unwrap();
        assert_eq!(h.fetch_all("x", &Params::new()).await.unwrap().len(), 1);

        let script = Scripted::new(vec![Ok(serde_json::json!({ "total": 0 }))]);
        let h = Harvester::with_transport(cfg(), script).unwrap();
        assert!(h.fetch_all("x", &Params::new()).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn initial_params_are_kept_and_page_overrides() {
        let script = Scripted::new(vec![Ok(serde_json::json!({ "data": [] }))]);
        let h = Harvester::with_transport(cfg(), script).unwrap();
        let mut params = Params::new();
        params.insert("uf".into(), "SP".into());
        params.insert(PAGE_PARAM.into(), "7".into());
        h.fetch_all("x", &params).await.unwrap();

        let calls = h.transport.calls.lock().unwrap();
        assert_eq!(calls[0].1.get("uf").map(String::as_str), Some("SP"));
        assert_eq!(calls[0].1.get(PAGE_PARAM).map(String::as_str), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_fails_on_first_error() {
        let script = Scripted::new(vec![Err(TransportError::Status(500))]);
        let h = Harvester::with_transport(
            HarvestConfig {
                max_retries: 0,
                ..cfg()
            },
            script,
        )
        .unwrap();
        let t0 = Instant::now();
        assert!(h.fetch_page("x", &Params::new()).await.is_err());
        assert_eq!(t0.elapsed(), Duration::ZERO);
    }
}
