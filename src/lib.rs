// src/lib.rs
// Public library surface for the binary, integration tests and reuse.

pub mod api;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod record;
pub mod rubric;
pub mod stance;
pub mod verdict;

mod redact;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::engine::{Evaluation, EvaluationRequest, EvidenceEngine};
pub use crate::error::ValidationError;
pub use crate::record::{EvaluationRecord, StudyRecord};
pub use crate::rubric::RubricEngine;
pub use crate::stance::{ConsensusSummary, StanceAnalyzer, StanceResult};
pub use crate::verdict::{ConfidenceLevel, Label, ScoreBreakdown};

use tracing::info;

/// Build the full HTTP app from `ENGINE_CONFIG_PATH` (or defaults).
/// Metrics are not mounted here; the binary installs the recorder once.
pub fn app() -> anyhow::Result<axum::Router> {
    let cfg = config::EngineConfig::load()?;
    info!(
        target: "config",
        similarity = ?cfg.stance.similarity,
        max_claim_chars = cfg.server.max_claim_chars,
        "engine config loaded"
    );
    Ok(api::create_router(api::AppState::from_config(&cfg)))
}
