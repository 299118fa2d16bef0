//! Stance classification strategies.
//!
//! [`ModelClassifier`] uses a similarity backend plus the keyword-pair
//! rules; [`KeywordClassifier`] uses keyword overlap plus the same rules and
//! never fails. The analyzer picks the model path when a backend is
//! configured and drops to keywords on any error.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::patterns::{contradiction_score, extract_keywords, preprocess, support_score};
use super::similarity::{DynSimilarity, SimilarityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Support,
    Contradict,
    Neutral,
}

impl Stance {
    pub fn as_str(self) -> &'static str {
        match self {
            Stance::Support => "support",
            Stance::Contradict => "contradict",
            Stance::Neutral => "neutral",
        }
    }
}

/// Relation of one evidence item to the claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceResult {
    pub stance: Stance,
    /// Always within [0, 1].
    pub confidence: f32,
    pub reasoning: String,
}

impl StanceResult {
    pub fn new(stance: Stance, confidence: f32, reasoning: impl Into<String>) -> Self {
        Self {
            stance,
            confidence: clamp01(confidence),
            reasoning: reasoning.into(),
        }
    }

    pub fn neutral(confidence: f32, reasoning: impl Into<String>) -> Self {
        Self::new(Stance::Neutral, confidence, reasoning)
    }
}

pub trait StanceClassifier: Send + Sync {
    fn classify(&self, claim: &str, evidence: &str) -> Result<StanceResult, SimilarityError>;

    /// Strategy name for logs.
    fn name(&self) -> &'static str;
}

/// Similarity-driven decision table.
pub struct ModelClassifier {
    similarity: DynSimilarity,
}

impl ModelClassifier {
    pub fn new(similarity: DynSimilarity) -> Self {
        Self { similarity }
    }
}

impl StanceClassifier for ModelClassifier {
    fn classify(&self, claim: &str, evidence: &str) -> Result<StanceResult, SimilarityError> {
        let sim = self
            .similarity
            .similarity(&preprocess(claim), &preprocess(evidence))?;
        if !sim.is_finite() {
            return Err(SimilarityError::NonFinite);
        }
        let contra = contradiction_score(claim, evidence);
        let support = support_score(claim, evidence);
        Ok(decide_with_similarity(contra, support, sim))
    }

    fn name(&self) -> &'static str {
        self.similarity.name()
    }
}

/// First matching row wins.
pub fn decide_with_similarity(contra: f32, support: f32, sim: f32) -> StanceResult {
    if contra > 0.7 {
        StanceResult::new(
            Stance::Contradict,
            contra,
            "Evidence asserts the opposite of the claim.",
        )
    } else if support > 0.6 && sim > 0.3 {
        StanceResult::new(
            Stance::Support,
            support.min(sim + 0.2),
            format!("Evidence asserts the same direction as the claim (similarity {sim:.2})."),
        )
    } else if sim > 0.5 {
        StanceResult::new(
            Stance::Support,
            sim,
            format!("Evidence closely matches the claim (similarity {sim:.2})."),
        )
    } else if sim < 0.1 {
        StanceResult::neutral(0.8 - sim, "Evidence is unrelated to the claim.")
    } else {
        StanceResult::neutral(0.5, "Evidence neither supports nor contradicts the claim.")
    }
}

/// Keyword-overlap decision table; used when no similarity backend is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn decide(&self, claim: &str, evidence: &str) -> StanceResult {
        let overlap = keyword_overlap(claim, evidence);
        let contra = contradiction_score(claim, evidence);
        let support = support_score(claim, evidence);
        decide_with_overlap(contra, support, overlap)
    }
}

impl StanceClassifier for KeywordClassifier {
    fn classify(&self, claim: &str, evidence: &str) -> Result<StanceResult, SimilarityError> {
        Ok(self.decide(claim, evidence))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

pub fn decide_with_overlap(contra: f32, support: f32, overlap: f32) -> StanceResult {
    if contra > 0.7 {
        StanceResult::new(Stance::Contradict, contra, "Keyword rules detected a contradiction.")
    } else if support > 0.6 {
        StanceResult::new(Stance::Support, support, "Keyword rules detected support.")
    } else if overlap > 0.3 {
        StanceResult::new(
            Stance::Support,
            overlap,
            format!("Keyword overlap {overlap:.2}."),
        )
    } else {
        StanceResult::neutral(0.5, "Relation to the claim is unclear.")
    }
}

/// |common keywords| / |claim keywords|, denominator at least 1.
pub fn keyword_overlap(claim: &str, evidence: &str) -> f32 {
    let claim_kw: HashSet<String> = extract_keywords(claim).into_iter().collect();
    let evidence_kw: HashSet<String> = extract_keywords(evidence).into_iter().collect();
    let common = claim_kw.intersection(&evidence_kw).count();
    common as f32 / claim_kw.len().max(1) as f32
}

fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
