// src/api.rs
//! Thin HTTP surface over the core: `/health`, `/api/search`, `/api/report`.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::analysis::{self, PricingAnalysis};
use crate::compliance::CompliancePolicy;
use crate::model::{FilterError, SearchFilters};
use crate::report;
use crate::repository::{InMemoryRepository, RecordSource};

#[derive(Clone)]
pub struct AppState {
    source: Arc<dyn RecordSource>,
    policy: CompliancePolicy,
}

impl AppState {
    pub fn new(source: Arc<dyn RecordSource>, policy: CompliancePolicy) -> Self {
        Self { source, policy }
    }

    /// Demo state: in-memory cement awards, default policy.
    pub fn demo() -> Self {
        Self::new(Arc::new(InMemoryRepository::demo()), CompliancePolicy::default())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", post(search_items))
        .route("/api/report", post(generate_report))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Serialize)]
struct SearchResponse {
    #[serde(rename = "filtros")]
    filters: SearchFilters,
    #[serde(rename = "gerado_em")]
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    analysis: PricingAnalysis,
}

#[derive(Serialize)]
struct ReportResponse {
    conteudo_markdown: String,
    gerado_em: DateTime<Utc>,
}

struct ApiError(FilterError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::info!(target: "api", error = %self.0, "rejected filters");
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

fn run(state: &AppState, filters: &SearchFilters) -> Result<PricingAnalysis, ApiError> {
    let today = chrono::Local::now().date_naive();
    analysis::analyze(state.source.as_ref(), filters, &state.policy, today).map_err(ApiError)
}

async fn search_items(
    State(state): State<AppState>,
    Json(filters): Json<SearchFilters>,
) -> Result<Json<SearchResponse>, ApiError> {
    let analysis = run(&state, &filters)?;
    Ok(Json(SearchResponse {
        filters,
        generated_at: Utc::now(),
        analysis,
    }))
}

async fn generate_report(
    State(state): State<AppState>,
    Json(filters): Json<SearchFilters>,
) -> Result<Json<ReportResponse>, ApiError> {
    let analysis = run(&state, &filters)?;
    let now = Utc::now();
    let md = report::render_markdown(
        &filters.term,
        &analysis.items,
        &analysis.stats,
        &analysis.alerts,
        now,
    );
    Ok(Json(ReportResponse {
        conteudo_markdown: md,
        gerado_em: now,
    }))
}
