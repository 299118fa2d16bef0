//! Input data model for the rubric: study records, the evaluation record and
//! its flag maps.
//!
//! Required fields and closed domains are enforced by serde at the boundary
//! (`EvaluationRecord::from_json` / `from_value`); numeric ranges are checked
//! by `EvaluationRecord::validate`. Flag maps are open: unknown names are
//! carried along and simply never consulted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::stance::ConsensusSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Intervention,
    Diagnostic,
    Exposure,
    Mechanistic,
    Policy,
    Other,
}

impl ClaimType {
    /// Claim types whose causal framing demands randomized evidence.
    pub fn needs_randomized_evidence(self) -> bool {
        matches!(self, ClaimType::Intervention | ClaimType::Diagnostic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Supports,
    PartiallySupports,
    Neutral,
    Contradicts,
    Insufficient,
}

impl Alignment {
    pub fn is_supportive(self) -> bool {
        matches!(self, Alignment::Supports | Alignment::PartiallySupports)
    }

    pub fn is_adverse(self) -> bool {
        matches!(self, Alignment::Contradicts | Alignment::Insufficient)
    }
}

/// GRADE certainty of the body of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    High,
    Moderate,
    Low,
    VeryLow,
}

impl Certainty {
    pub fn is_strong(self) -> bool {
        matches!(self, Certainty::High | Certainty::Moderate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticMatch {
    Exact,
    Minor,
    Major,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectDirection {
    Increase,
    Decrease,
    NoIncrease,
    Mixed,
    NotReported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetractionStatus {
    #[serde(rename = "none")]
    NotRetracted,
    Retracted,
    ExpressionOfConcern,
    Unknown,
}

/// One retrieved study as handed over by the literature search stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    /// Free-text design descriptor ("randomized controlled trial", "cohort", ...).
    #[serde(default)]
    pub design: String,
    pub effect_direction: EffectDirection,
    pub retraction_status: RetractionStatus,
    #[serde(default)]
    pub primary_outcomes: Vec<String>,
}

impl StudyRecord {
    pub fn new(design: impl Into<String>, effect_direction: EffectDirection) -> Self {
        Self {
            design: design.into(),
            effect_direction,
            retraction_status: RetractionStatus::NotRetracted,
            primary_outcomes: Vec::new(),
        }
    }

    /// Builder: attach reported primary outcomes.
    pub fn with_outcomes<I, S>(mut self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_outcomes = outcomes.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_outcomes(&self) -> bool {
        self.primary_outcomes.iter().any(|o| !o.trim().is_empty())
    }
}

/// A flag is either a plain boolean or a small integer severity. Any other
/// JSON value is kept as-is and reads as unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Level(i64),
    Other(serde_json::Value),
}

impl FlagValue {
    pub fn severity(&self) -> i64 {
        match *self {
            FlagValue::Bool(true) => 1,
            FlagValue::Bool(false) => 0,
            FlagValue::Level(n) => n,
            FlagValue::Other(_) => 0,
        }
    }
}

/// Name → flag mapping. Absent and unknown names read as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagMap(BTreeMap<String, FlagValue>);

impl FlagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a boolean flag.
    pub fn with(mut self, name: impl Into<String>, on: bool) -> Self {
        self.0.insert(name.into(), FlagValue::Bool(on));
        self
    }

    /// Builder: set a severity flag.
    pub fn with_level(mut self, name: impl Into<String>, level: i64) -> Self {
        self.0.insert(name.into(), FlagValue::Level(level));
        self
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.severity(name) > 0
    }

    pub fn is_any_set(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.is_set(n))
    }

    pub fn severity(&self, name: &str) -> i64 {
        self.0.get(name).map_or(0, FlagValue::severity)
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for FlagMap {
    fn from_iter<T: IntoIterator<Item = (K, bool)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), FlagValue::Bool(v)))
                .collect(),
        )
    }
}

/// Recognised flag names, grouped by the map they belong to.
pub mod flags {
    // stats_integrity_flags
    pub const CI_PRESENT: &str = "ci_present";
    pub const ABS_RISK_PRESENT: &str = "abs_risk_present";
    pub const RR_ABS_CONFUSED: &str = "rr_abs_confused";
    pub const UNIT_ERRORS: &str = "unit_errors";

    // completeness_checks; each entry lists accepted spellings
    pub const COVERAGE: [&[&str]; 6] = [
        &["targets"],
        &["dose"],
        &["effect"],
        &["harms"],
        &["contraindications", "contraind"],
        &["heterogeneity"],
    ];

    // balance_flags
    pub const MENTIONS_COUNTEREVIDENCE: &str = "mentions_counterevidence";
    pub const BIAS_TO_BENEFIT: &str = "bias_to_benefit";

    // safety_flags
    pub const ADVERSE_EVENTS_QUANTIFIED: &str = "adverse_events_quantified";
    pub const HIGH_RISK_GROUPS: &str = "high_risk_groups";
    pub const CLINICAL_GUIDANCE: &str = "clinical_guidance";

    // bonus_flags
    pub const UNCERTAINTY_TRANSPARENCY: &str = "uncertainty_transparency";
    pub const NNT_NNH: &str = "nnt_nnh";
    pub const EXTERNAL_VALIDATION: &str = "external_validation";
    pub const TRIANGULATION: &str = "triangulation";

    // penalties_flags
    pub const FABRICATED: &str = "fabricated";
    pub const RETRACTED_AS_MAJOR: &str = "retracted_as_major";
    pub const PREDATORY_MAJOR: &str = "predatory_major";
    pub const MAJOR_SAFETY_OMISSION: &str = "major_safety_omission";
    pub const CAUSATION_MISUSE: &str = "causation_misuse";
    pub const CHERRY_PICK: &str = "cherry_pick";
    pub const GUIDELINE_MISQUOTE: &str = "guideline_misquote";
    pub const TOO_OLD_ONLY: &str = "too_old_only";
    pub const SCALE_EXAGGERATION: &str = "scale_exaggeration";
    pub const TERM_MISUSE: &str = "term_misuse";
    pub const OVERGENERALIZATION: &str = "overgeneralization";
    pub const FEAR_APPEAL: &str = "fear_appeal";
}

/// The single input of the rubric engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub claim_type: ClaimType,
    pub alignment_to_claim: Alignment,
    #[serde(rename = "GRADE_certainty")]
    pub grade_certainty: Certainty,
    /// Relative errors of the claim's numbers; empty for non-numeric claims.
    pub numeric_diffs: Vec<f64>,
    pub semantic_exact_if_non_numeric: SemanticMatch,
    pub included_studies: Vec<StudyRecord>,
    #[serde(default)]
    pub stats_integrity_flags: FlagMap,
    #[serde(default)]
    pub completeness_checks: FlagMap,
    #[serde(default)]
    pub balance_flags: FlagMap,
    #[serde(default)]
    pub safety_flags: FlagMap,
    #[serde(default)]
    pub bonus_flags: FlagMap,
    #[serde(default)]
    pub penalties_flags: FlagMap,
    pub citation_verifiability_rate: f64,
    #[serde(default)]
    pub newest_key_evidence_year: Option<i32>,
    #[serde(default)]
    pub guideline_year: Option<i32>,
    /// Signed adjustment to the certainty tone.
    pub language_assertiveness_score: i32,
    /// 0 (none) ..= 5 (extreme). Anything else scores as a neutral 6.
    pub exaggeration_level: i32,
    /// Stance consensus merged in by the pipeline, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus: Option<ConsensusSummary>,
}

impl EvaluationRecord {
    /// Minimal record: no numbers, exact semantics, no studies, no flags.
    pub fn new(claim_type: ClaimType, alignment: Alignment, certainty: Certainty) -> Self {
        Self {
            claim_type,
            alignment_to_claim: alignment,
            grade_certainty: certainty,
            numeric_diffs: Vec::new(),
            semantic_exact_if_non_numeric: SemanticMatch::Exact,
            included_studies: Vec::new(),
            stats_integrity_flags: FlagMap::new(),
            completeness_checks: FlagMap::new(),
            balance_flags: FlagMap::new(),
            safety_flags: FlagMap::new(),
            bonus_flags: FlagMap::new(),
            penalties_flags: FlagMap::new(),
            citation_verifiability_rate: 0.0,
            newest_key_evidence_year: None,
            guideline_year: None,
            language_assertiveness_score: 0,
            exaggeration_level: 0,
            consensus: None,
        }
    }

    /// Parse and validate a JSON record.
    pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
        let rec: Self = serde_json::from_str(raw)?;
        rec.validate()?;
        Ok(rec)
    }

    /// Same as `from_json`, for an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ValidationError> {
        let rec: Self = serde_json::from_value(value)?;
        rec.validate()?;
        Ok(rec)
    }

    /// Range checks serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, &value) in self.numeric_diffs.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteNumericDiff { index });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeNumericDiff { index, value });
            }
        }
        let rate = self.citation_verifiability_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ValidationError::VerifiabilityOutOfRange(rate));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_json() -> serde_json::Value {
        json!({
            "claim_type": "intervention",
            "alignment_to_claim": "supports",
            "GRADE_certainty": "moderate",
            "numeric_diffs": [],
            "semantic_exact_if_non_numeric": "minor",
            "included_studies": [
                {"design": "cohort", "effect_direction": "increase", "retraction_status": "none"}
            ],
            "citation_verifiability_rate": 0.5,
            "language_assertiveness_score": -1,
            "exaggeration_level": 2
        })
    }

    #[test]
    fn parses_minimal_record_with_default_flags() {
        let rec = EvaluationRecord::from_value(minimal_json()).unwrap();
        assert_eq!(rec.grade_certainty, Certainty::Moderate);
        assert_eq!(
            rec.included_studies[0].retraction_status,
            RetractionStatus::NotRetracted
        );
        assert!(!rec.penalties_flags.is_set(flags::FABRICATED));
        assert_eq!(rec.newest_key_evidence_year, None);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut v = minimal_json();
        v.as_object_mut().unwrap().remove("GRADE_certainty");
        let err = EvaluationRecord::from_value(v).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(ref m) if m.contains("GRADE_certainty")));
    }

    #[test]
    fn out_of_domain_enum_is_rejected() {
        let mut v = minimal_json();
        v["claim_type"] = json!("anecdote");
        assert!(matches!(
            EvaluationRecord::from_value(v),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn negative_diff_and_bad_rate_are_rejected() {
        let mut v = minimal_json();
        v["numeric_diffs"] = json!([0.1, -0.2]);
        assert_eq!(
            EvaluationRecord::from_value(v).unwrap_err(),
            ValidationError::NegativeNumericDiff { index: 1, value: -0.2 }
        );

        let mut v = minimal_json();
        v["citation_verifiability_rate"] = json!(1.5);
        assert_eq!(
            EvaluationRecord::from_value(v).unwrap_err(),
            ValidationError::VerifiabilityOutOfRange(1.5)
        );
    }

    #[test]
    fn flags_accept_bools_levels_and_unknown_names() {
        let mut v = minimal_json();
        v["bonus_flags"] = json!({"nnt_nnh": 2, "triangulation": true, "made_up": 9});
        let rec = EvaluationRecord::from_value(v).unwrap();
        assert_eq!(rec.bonus_flags.severity(flags::NNT_NNH), 2);
        assert_eq!(rec.bonus_flags.severity(flags::TRIANGULATION), 1);
        assert_eq!(rec.bonus_flags.severity(flags::EXTERNAL_VALIDATION), 0);
    }

    #[test]
    fn free_form_flag_values_read_as_unset() {
        let mut v = minimal_json();
        v["penalties_flags"] = json!({
            "reviewer_note": "checked twice",
            "cherry_pick": null,
            "fear_appeal": {"why": "tone"},
            "term_misuse": 1.5
        });
        let rec = EvaluationRecord::from_value(v).unwrap();
        for name in ["reviewer_note", flags::CHERRY_PICK, flags::FEAR_APPEAL, flags::TERM_MISUSE] {
            assert_eq!(rec.penalties_flags.severity(name), 0, "{name}");
        }
    }

    #[test]
    fn exaggeration_level_accepts_negatives() {
        let mut v = minimal_json();
        v["exaggeration_level"] = json!(-1);
        let rec = EvaluationRecord::from_value(v).unwrap();
        assert_eq!(rec.exaggeration_level, -1);
    }
}
