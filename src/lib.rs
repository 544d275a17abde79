// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod metrics;

// Core pipeline: normalize → match → search → stats → compliance
pub mod analysis;
pub mod compliance;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod repository;
pub mod search;
pub mod stats;

// Upstream acquisition
pub mod harvest;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::compliance::{advise, AlertCode, ComplianceAlert, CompliancePolicy, Severity};
pub use crate::harvest::{HarvestConfig, HarvestError, Harvester};
pub use crate::matcher::{matches, Matcher};
pub use crate::model::{FilterError, Item, NewItem, SearchFilters};
pub use crate::normalize::normalize;
pub use crate::repository::{InMemoryRepository, RecordSource};
pub use crate::stats::{summarize, PriceStats};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins; otherwise
/// `pncp_pricing=info,warn`. `PRICING_LOG_JSON=1` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pncp_pricing=info,harvest=info,search=info,warn"));

    let json = std::env::var("PRICING_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}
