//! # Evidence Engine
//! End-to-end pipeline: evidence items → stance report → consensus merged
//! into the evaluation record → rubric score.
//!
//! Collaborators (similarity backend, clock) are injected at construction;
//! there is no process-wide state. The engine is `Send + Sync` and can be
//! shared behind an `Arc` by any number of callers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, SimilarityBackend, StanceConfig};
use crate::error::ValidationError;
use crate::record::EvaluationRecord;
use crate::redact::anon_hash;
use crate::rubric::RubricEngine;
use crate::stance::{
    ConsensusSummary, DynSimilarity, EvidenceItem, StanceAnalyzer, StanceReport, StanceResult,
    TermVectorSimilarity,
};
use crate::verdict::ScoreBreakdown;

/// Claim, its retrieved evidence, and the externally prepared record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub claim: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceItem>,
    pub record: EvaluationRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub stances: Vec<StanceResult>,
    pub consensus: ConsensusSummary,
    pub score: ScoreBreakdown,
}

pub struct EvidenceEngine {
    stance: StanceAnalyzer,
    rubric: RubricEngine,
}

impl EvidenceEngine {
    pub fn new(stance: StanceAnalyzer, rubric: RubricEngine) -> Self {
        Self { stance, rubric }
    }

    /// Build from config with the system clock.
    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let similarity = similarity_backend(&cfg.stance);
        info!(
            target: "engine",
            similarity = similarity.as_ref().map_or("none", |s| s.name()),
            min_evidence_chars = cfg.stance.min_evidence_chars,
            "evidence engine ready"
        );
        Self::new(
            StanceAnalyzer::new(similarity, cfg.stance.clone()),
            RubricEngine::new(clock),
        )
    }

    pub fn stance(&self) -> &StanceAnalyzer {
        &self.stance
    }

    pub fn analyze_stance(&self, claim: &str, evidence: &[EvidenceItem]) -> StanceReport {
        self.stance.analyze(claim, evidence)
    }

    pub fn score(&self, record: &EvaluationRecord) -> Result<ScoreBreakdown, ValidationError> {
        self.rubric.score(record)
    }

    /// Full pipeline. The caller's record is not modified; the consensus is
    /// merged into a copy before scoring.
    pub fn evaluate(&self, req: &EvaluationRequest) -> Result<Evaluation, ValidationError> {
        let report = self.stance.analyze(&req.claim, &req.evidence);

        let mut record = req.record.clone();
        record.consensus = Some(report.summary.clone());
        let score = self.rubric.score(&record)?;

        info!(
            target: "engine",
            claim_id = %anon_hash(&req.claim),
            evidence = report.summary.total,
            overall = report.summary.overall_stance.as_str(),
            total = score.total_score,
            label = score.label.as_str(),
            "claim evaluated"
        );

        Ok(Evaluation {
            stances: report.evidence,
            consensus: report.summary,
            score,
        })
    }
}

fn similarity_backend(cfg: &StanceConfig) -> Option<DynSimilarity> {
    match cfg.similarity {
        SimilarityBackend::TermVector => Some(Arc::new(TermVectorSimilarity)),
        SimilarityBackend::None => None,
    }
}
