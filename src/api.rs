use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::config::{EngineConfig, ServerConfig};
use crate::engine::{Evaluation, EvaluationRequest, EvidenceEngine};
use crate::error::ValidationError;
use crate::record::EvaluationRecord;
use crate::stance::{EvidenceItem, StanceReport};
use crate::verdict::ScoreBreakdown;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EvidenceEngine>,
    pub limits: ServerConfig,
}

impl AppState {
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self {
            engine: Arc::new(EvidenceEngine::from_config(cfg)),
            limits: cfg.server.clone(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/score", post(score))
        .route("/stance", post(stance))
        .route("/evaluate", post(evaluate))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Router with default config (for tests and embedding).
pub fn router() -> Router {
    create_router(AppState::from_config(&EngineConfig::default()))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::unprocessable(e.to_string())
    }
}

/// Body that is not JSON, or not the expected shape, still answers `{error}`.
impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        Self {
            status: r.status(),
            message: r.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct StanceReq {
    claim: String,
    #[serde(default)]
    evidence: Vec<EvidenceItem>,
}

async fn score(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ScoreBreakdown>, ApiError> {
    let Json(body) = payload?;
    // range checks happen inside the engine so rejections are counted
    let record: EvaluationRecord = serde_json::from_value(body).map_err(ValidationError::from)?;
    Ok(Json(state.engine.score(&record)?))
}

async fn stance(
    State(state): State<AppState>,
    payload: Result<Json<StanceReq>, JsonRejection>,
) -> Result<Json<StanceReport>, ApiError> {
    let Json(body) = payload?;
    check_limits(&state.limits, &body.claim, body.evidence.len())?;
    Ok(Json(state.engine.analyze_stance(&body.claim, &body.evidence)))
}

async fn evaluate(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<Evaluation>, ApiError> {
    let Json(body) = payload?;
    let req: EvaluationRequest =
        serde_json::from_value(body).map_err(ValidationError::from)?;
    check_limits(&state.limits, &req.claim, req.evidence.len())?;
    Ok(Json(state.engine.evaluate(&req)?))
}

fn check_limits(limits: &ServerConfig, claim: &str, evidence_items: usize) -> Result<(), ApiError> {
    if claim.trim().is_empty() {
        return Err(ApiError::unprocessable("claim must not be empty"));
    }
    let chars = claim.chars().count();
    if chars > limits.max_claim_chars {
        return Err(ApiError::unprocessable(format!(
            "claim is {chars} characters, limit is {}",
            limits.max_claim_chars
        )));
    }
    if evidence_items > limits.max_evidence_items {
        return Err(ApiError::unprocessable(format!(
            "{evidence_items} evidence items, limit is {}",
            limits.max_evidence_items
        )));
    }
    Ok(())
}
