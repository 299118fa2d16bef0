//! verdict.rs: output shape of the rubric: axis breakdown, bonus/penalty
//! ledgers, total score, label and confidence.
//!
//! Serialized keys are stable; downstream consumers (persistence, export)
//! read them by name.

use serde::{Deserialize, Serialize};

/// Final categorical label, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "True")]
    True,
    #[serde(rename = "Mostly True")]
    MostlyTrue,
    #[serde(rename = "Mixed/Context")]
    MixedContext,
    #[serde(rename = "Unsupported")]
    Unsupported,
    #[serde(rename = "Misleading")]
    Misleading,
    #[serde(rename = "Harmful")]
    Harmful,
    /// Only produced by the fabrication short-circuit.
    #[serde(rename = "False")]
    False,
}

impl Label {
    /// Descending thresholds on the clamped total.
    pub fn from_total(total: i32) -> Self {
        match total {
            t if t >= 90 => Label::True,
            t if t >= 85 => Label::MostlyTrue,
            t if t >= 60 => Label::MixedContext,
            t if t >= 30 => Label::Unsupported,
            t if t >= 10 => Label::Misleading,
            _ => Label::Harmful,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::True => "True",
            Label::MostlyTrue => "Mostly True",
            Label::MixedContext => "Mixed/Context",
            Label::Unsupported => "Unsupported",
            Label::Misleading => "Misleading",
            Label::Harmful => "Harmful",
            Label::False => "False",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScientificAccuracy {
    pub facts: i32,
    pub causality: i32,
    pub stats: i32,
    pub cap_applied: bool,
    pub subtotal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceBase {
    pub quality: i32,
    pub appropriateness_verifiability_recency: i32,
    pub cap_applied: bool,
    pub subtotal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub certainty_tone: i32,
    pub no_exaggeration: i32,
    pub cap_applied: bool,
    pub subtotal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessSafety {
    pub coverage: i32,
    pub balance: i32,
    pub safety: i32,
    pub cap_applied: bool,
    pub subtotal: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBreakdown {
    #[serde(rename = "A_scientific_accuracy")]
    pub scientific_accuracy: ScientificAccuracy,
    #[serde(rename = "B_evidence_base")]
    pub evidence_base: EvidenceBase,
    #[serde(rename = "C_expression")]
    pub expression: Expression,
    #[serde(rename = "D_completeness_safety")]
    pub completeness_safety: CompletenessSafety,
}

impl AxisBreakdown {
    pub fn base(&self) -> i32 {
        self.scientific_accuracy.subtotal
            + self.evidence_base.subtotal
            + self.expression.subtotal
            + self.completeness_safety.subtotal
    }
}

/// One bonus (positive) or penalty (negative) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub points: i32,
}

impl LedgerItem {
    pub fn bonus(kind: impl Into<String>, points: i32) -> Self {
        Self {
            kind: kind.into(),
            points: points.abs(),
        }
    }

    pub fn penalty(kind: impl Into<String>, points: i32) -> Self {
        Self {
            kind: kind.into(),
            points: -points.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score_breakdown: AxisBreakdown,
    pub base: i32,
    pub bonus: Vec<LedgerItem>,
    pub penalties: Vec<LedgerItem>,
    /// Always within 0..=100.
    pub total_score: i32,
    pub label: Label,
    pub confidence: ConfidenceLevel,
}

impl ScoreBreakdown {
    pub fn bonus_points(&self) -> i32 {
        self.bonus.iter().map(|b| b.points).sum()
    }

    /// Sum of penalty costs as a positive number.
    pub fn penalty_points(&self) -> i32 {
        self.penalties.iter().map(|p| -p.points).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds_are_inclusive() {
        assert_eq!(Label::from_total(100), Label::True);
        assert_eq!(Label::from_total(90), Label::True);
        assert_eq!(Label::from_total(89), Label::MostlyTrue);
        assert_eq!(Label::from_total(85), Label::MostlyTrue);
        assert_eq!(Label::from_total(84), Label::MixedContext);
        assert_eq!(Label::from_total(60), Label::MixedContext);
        assert_eq!(Label::from_total(30), Label::Unsupported);
        assert_eq!(Label::from_total(10), Label::Misleading);
        assert_eq!(Label::from_total(9), Label::Harmful);
        assert_eq!(Label::from_total(0), Label::Harmful);
    }

    #[test]
    fn serialized_shape_uses_stable_keys() {
        let b = ScoreBreakdown {
            score_breakdown: AxisBreakdown {
                scientific_accuracy: ScientificAccuracy {
                    facts: 15,
                    causality: 15,
                    stats: 10,
                    cap_applied: false,
                    subtotal: 40,
                },
                evidence_base: EvidenceBase {
                    quality: 13,
                    appropriateness_verifiability_recency: 9,
                    cap_applied: false,
                    subtotal: 22,
                },
                expression: Expression {
                    certainty_tone: 10,
                    no_exaggeration: 10,
                    cap_applied: false,
                    subtotal: 20,
                },
                completeness_safety: CompletenessSafety {
                    coverage: 7,
                    balance: 4,
                    safety: 4,
                    cap_applied: false,
                    subtotal: 15,
                },
            },
            base: 97,
            bonus: vec![LedgerItem::bonus("nnt_nnh", 3)],
            penalties: vec![LedgerItem::penalty("fear_appeal", 2)],
            total_score: 98,
            label: Label::MixedContext,
            confidence: ConfidenceLevel::Medium,
        };

        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["score_breakdown"]["A_scientific_accuracy"]["subtotal"], 40);
        assert_eq!(v["score_breakdown"]["D_completeness_safety"]["safety"], 4);
        assert_eq!(v["bonus"][0]["type"], "nnt_nnh");
        assert_eq!(v["penalties"][0]["points"], -2);
        assert_eq!(v["label"], "Mixed/Context");
        assert_eq!(v["confidence"], "medium");
        assert_eq!(b.penalty_points(), 2);
    }
}
