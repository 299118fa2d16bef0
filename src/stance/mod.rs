//! Stance & consensus: classify each evidence item against a claim, then
//! aggregate into a consensus summary.
//!
//! Classification never fails from the caller's point of view: short
//! evidence is forced neutral, and a failing similarity backend is replaced
//! by the keyword strategy for that item.

pub mod classifier;
pub mod consensus;
pub mod patterns;
pub mod similarity;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::StanceConfig;
use crate::redact::anon_hash;

pub use classifier::{KeywordClassifier, ModelClassifier, Stance, StanceClassifier, StanceResult};
pub use consensus::{aggregate, ConsensusSummary};
pub use similarity::{DynSimilarity, Similarity, SimilarityError, TermVectorSimilarity};

/// One retrieved evidence item as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub body: String,
}

impl EvidenceItem {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// "{title}. {abstract}", trimmed.
    pub fn text(&self) -> String {
        format!("{}. {}", self.title, self.body).trim().to_string()
    }
}

/// Per-item stances (input order) plus their consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceReport {
    pub evidence: Vec<StanceResult>,
    pub summary: ConsensusSummary,
}

pub struct StanceAnalyzer {
    primary: Option<Box<dyn StanceClassifier>>,
    fallback: KeywordClassifier,
    cfg: StanceConfig,
}

impl StanceAnalyzer {
    /// Model path when a similarity backend is supplied, keywords otherwise.
    pub fn new(similarity: Option<DynSimilarity>, cfg: StanceConfig) -> Self {
        let primary = similarity
            .map(|s| Box::new(ModelClassifier::new(s)) as Box<dyn StanceClassifier>);
        Self {
            primary,
            fallback: KeywordClassifier,
            cfg,
        }
    }

    /// Custom primary strategy; keywords remain the fallback.
    pub fn with_classifier(primary: Box<dyn StanceClassifier>, cfg: StanceConfig) -> Self {
        Self {
            primary: Some(primary),
            fallback: KeywordClassifier,
            cfg,
        }
    }

    pub fn keyword_only() -> Self {
        Self::new(None, StanceConfig::default())
    }

    pub fn strategy_name(&self) -> &'static str {
        self.primary
            .as_ref()
            .map_or(self.fallback.name(), |p| p.name())
    }

    pub fn classify(&self, claim: &str, evidence: &str) -> StanceResult {
        let result = self.classify_inner(claim, evidence);
        metrics::counter!("stance_classified_total", "stance" => result.stance.as_str())
            .increment(1);
        result
    }

    fn classify_inner(&self, claim: &str, evidence: &str) -> StanceResult {
        if evidence.chars().count() < self.cfg.min_evidence_chars {
            metrics::counter!("stance_short_evidence_total").increment(1);
            return StanceResult::neutral(
                self.cfg.short_evidence_confidence,
                "Evidence text is too short to assess.",
            );
        }

        let Some(primary) = &self.primary else {
            return self.fallback.decide(claim, evidence);
        };

        match primary.classify(claim, evidence) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    target: "stance",
                    claim_id = %anon_hash(claim),
                    strategy = primary.name(),
                    error = %e,
                    "similarity failed, using keyword fallback"
                );
                metrics::counter!("stance_fallback_total").increment(1);
                self.fallback.decide(claim, evidence)
            }
        }
    }

    /// Classify every item and aggregate.
    pub fn analyze(&self, claim: &str, items: &[EvidenceItem]) -> StanceReport {
        let evidence: Vec<StanceResult> = items
            .iter()
            .map(|it| self.classify(claim, &it.text()))
            .collect();
        let summary = aggregate(&evidence);
        debug!(
            target: "stance",
            claim_id = %anon_hash(claim),
            strategy = self.strategy_name(),
            total = summary.total,
            overall = summary.overall_stance.as_str(),
            confidence = summary.confidence,
            "stance consensus"
        );
        StanceReport { evidence, summary }
    }
}
