//! # Rubric Scoring Engine
//! Pure, deterministic mapping `EvaluationRecord` → `ScoreBreakdown`.
//! No I/O apart from reading the current year from the injected clock.
//!
//! Order: four axes (with their conditional caps) → forced structural caps
//! for retracted/predatory evidence → fabrication short-circuit → bonus and
//! penalty ledgers → clamped total → label and confidence.

pub mod axes;
pub mod design;

use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::record::{flags, EvaluationRecord};
use crate::stance::Stance;
use crate::verdict::{AxisBreakdown, ConfidenceLevel, Label, LedgerItem, ScoreBreakdown};

pub const MAX_TOTAL: i32 = 100;
pub const MAX_BONUS: i32 = 10;
const STRUCTURAL_ACCURACY_CAP: i32 = 20;
const STRUCTURAL_QUALITY_CAP: i32 = 7;
const FABRICATED_COST: i32 = 100;

/// (flag, per-item cap)
const BONUSES: [(&str, i64); 4] = [
    (flags::UNCERTAINTY_TRANSPARENCY, 3),
    (flags::NNT_NNH, 3),
    (flags::EXTERNAL_VALIDATION, 2),
    (flags::TRIANGULATION, 2),
];

/// (flags that trigger it, ledger type, cost)
const PENALTIES: [(&[&str], &str, i32); 10] = [
    (
        &[flags::RETRACTED_AS_MAJOR, flags::PREDATORY_MAJOR],
        "retracted_or_predatory_major",
        50,
    ),
    (&[flags::MAJOR_SAFETY_OMISSION], flags::MAJOR_SAFETY_OMISSION, 15),
    (&[flags::CAUSATION_MISUSE], flags::CAUSATION_MISUSE, 10),
    (&[flags::CHERRY_PICK], flags::CHERRY_PICK, 10),
    (&[flags::GUIDELINE_MISQUOTE], flags::GUIDELINE_MISQUOTE, 7),
    (&[flags::TOO_OLD_ONLY], flags::TOO_OLD_ONLY, 6),
    (&[flags::SCALE_EXAGGERATION], flags::SCALE_EXAGGERATION, 4),
    (&[flags::TERM_MISUSE], flags::TERM_MISUSE, 3),
    (&[flags::OVERGENERALIZATION], flags::OVERGENERALIZATION, 3),
    (&[flags::FEAR_APPEAL], flags::FEAR_APPEAL, 2),
];

#[derive(Clone)]
pub struct RubricEngine {
    clock: Arc<dyn Clock>,
}

impl Default for RubricEngine {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RubricEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Validate, then score. Either a complete breakdown or an error.
    pub fn score(&self, rec: &EvaluationRecord) -> Result<ScoreBreakdown, ValidationError> {
        if let Err(e) = rec.validate() {
            metrics::counter!("rubric_rejected_total").increment(1);
            return Err(e);
        }
        Ok(score_at(rec, self.clock.current_year()))
    }
}

/// Score a record that has already been validated, against a fixed year.
pub fn score_at(rec: &EvaluationRecord, current_year: i32) -> ScoreBreakdown {
    let mut accuracy = axes::scientific_accuracy(rec);
    let mut evidence = axes::evidence_base(rec, current_year);
    let expression = axes::expression(rec);
    let completeness = axes::completeness_safety(rec);

    let p = &rec.penalties_flags;
    if p.is_any_set(&[flags::RETRACTED_AS_MAJOR, flags::PREDATORY_MAJOR]) {
        accuracy.subtotal = accuracy.subtotal.min(STRUCTURAL_ACCURACY_CAP);
        accuracy.cap_applied = true;
        evidence.quality = evidence.quality.min(STRUCTURAL_QUALITY_CAP);
        evidence.cap_applied = true;
        evidence.subtotal = evidence.quality + evidence.appropriateness_verifiability_recency;
    }

    let axes = AxisBreakdown {
        scientific_accuracy: accuracy,
        evidence_base: evidence,
        expression,
        completeness_safety: completeness,
    };
    let base = axes.base();

    if p.is_set(flags::FABRICATED) {
        metrics::counter!("rubric_fabricated_total").increment(1);
        debug!(target: "rubric", base, "fabricated evidence, score forced to 0");
        return finish(ScoreBreakdown {
            score_breakdown: axes,
            base,
            bonus: Vec::new(),
            penalties: vec![LedgerItem::penalty(flags::FABRICATED, FABRICATED_COST)],
            total_score: 0,
            label: Label::False,
            confidence: ConfidenceLevel::High,
        });
    }

    let bonus = bonus_ledger(rec);
    let penalties = penalty_ledger(rec);
    let bonus_pts = bonus.iter().map(|b| b.points).sum::<i32>().min(MAX_BONUS);
    let penalty_pts: i32 = penalties.iter().map(|p| -p.points).sum();

    let total_score = (base + bonus_pts - penalty_pts).clamp(0, MAX_TOTAL);
    let label = Label::from_total(total_score);
    let confidence = confidence(rec);

    debug!(
        target: "rubric",
        base,
        bonus = bonus_pts,
        penalties = penalty_pts,
        total = total_score,
        label = label.as_str(),
        "scored record"
    );

    finish(ScoreBreakdown {
        score_breakdown: axes,
        base,
        bonus,
        penalties,
        total_score,
        label,
        confidence,
    })
}

fn finish(out: ScoreBreakdown) -> ScoreBreakdown {
    metrics::counter!("rubric_scored_total", "label" => out.label.as_str()).increment(1);
    metrics::histogram!("rubric_total_score").record(f64::from(out.total_score));
    out
}

fn bonus_ledger(rec: &EvaluationRecord) -> Vec<LedgerItem> {
    BONUSES
        .iter()
        .filter_map(|&(name, cap)| {
            let severity = rec.bonus_flags.severity(name);
            (severity > 0).then(|| LedgerItem::bonus(name, severity.min(cap) as i32))
        })
        .collect()
}

fn penalty_ledger(rec: &EvaluationRecord) -> Vec<LedgerItem> {
    PENALTIES
        .iter()
        .filter(|(triggers, _, _)| rec.penalties_flags.is_any_set(triggers))
        .map(|&(_, kind, cost)| LedgerItem::penalty(kind, cost))
        .collect()
}

/// Agreement signal for confidence: a merged stance consensus that took a
/// side (support or contradict), study effect-direction consistency
/// otherwise. A neutral consensus, e.g. only short or off-topic evidence,
/// says nothing about agreement and never raises confidence.
pub fn consistency_signal(rec: &EvaluationRecord) -> f64 {
    match &rec.consensus {
        Some(c) if c.total > 0 && c.overall_stance != Stance::Neutral => f64::from(c.confidence),
        _ => design::consistency(&rec.included_studies),
    }
}

pub fn confidence(rec: &EvaluationRecord) -> ConfidenceLevel {
    let strong = rec.grade_certainty.is_strong();
    let cons = consistency_signal(rec);
    let ver = rec.citation_verifiability_rate;
    if strong && cons >= 0.7 && ver >= 0.8 {
        ConfidenceLevel::High
    } else if !strong || cons < 0.5 || ver < 0.3 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::record::{Alignment, Certainty, ClaimType, EffectDirection, FlagMap, StudyRecord};
    use crate::stance::ConsensusSummary;

    fn strong_record() -> EvaluationRecord {
        let mut r = EvaluationRecord::new(ClaimType::Intervention, Alignment::Supports, Certainty::High);
        r.numeric_diffs = vec![0.01];
        r.included_studies = vec![StudyRecord::new(
            "randomized controlled trial, multicenter",
            EffectDirection::Decrease,
        )
        .with_outcomes(["all-cause mortality"])];
        r.citation_verifiability_rate = 0.9;
        r
    }

    #[test]
    fn bonus_items_are_capped_individually() {
        let mut r = strong_record();
        r.bonus_flags = FlagMap::new()
            .with_level(flags::UNCERTAINTY_TRANSPARENCY, 5)
            .with_level(flags::NNT_NNH, 1)
            .with(flags::TRIANGULATION, true)
            .with_level(flags::EXTERNAL_VALIDATION, 0);
        let out = score_at(&r, 2026);
        assert_eq!(
            out.bonus,
            vec![
                LedgerItem::bonus(flags::UNCERTAINTY_TRANSPARENCY, 3),
                LedgerItem::bonus(flags::NNT_NNH, 1),
                LedgerItem::bonus(flags::TRIANGULATION, 1),
            ]
        );
    }

    #[test]
    fn retracted_and_predatory_share_one_ledger_item() {
        let mut r = strong_record();
        r.penalties_flags = FlagMap::new()
            .with(flags::RETRACTED_AS_MAJOR, true)
            .with(flags::PREDATORY_MAJOR, true)
            .with(flags::FEAR_APPEAL, true);
        let out = score_at(&r, 2026);
        assert_eq!(
            out.penalties,
            vec![
                LedgerItem::penalty("retracted_or_predatory_major", 50),
                LedgerItem::penalty(flags::FEAR_APPEAL, 2),
            ]
        );
        let a = &out.score_breakdown.scientific_accuracy;
        let b = &out.score_breakdown.evidence_base;
        assert!(a.subtotal <= 20 && a.cap_applied);
        assert!(b.quality <= 7 && b.cap_applied);
        assert_eq!(out.base, out.score_breakdown.base());
    }

    #[test]
    fn penalties_can_drive_total_to_zero_but_not_below() {
        let mut r = strong_record();
        r.penalties_flags = [
            (flags::RETRACTED_AS_MAJOR, true),
            (flags::MAJOR_SAFETY_OMISSION, true),
            (flags::CAUSATION_MISUSE, true),
            (flags::CHERRY_PICK, true),
            (flags::GUIDELINE_MISQUOTE, true),
        ]
        .into_iter()
        .collect();
        let out = score_at(&r, 2026);
        assert!(out.total_score >= 0);
        assert_eq!(out.penalty_points(), 92);
    }

    #[test]
    fn confidence_levels() {
        let r = strong_record();
        assert_eq!(confidence(&r), ConfidenceLevel::High);

        let mut low = strong_record();
        low.grade_certainty = Certainty::Low;
        assert_eq!(confidence(&low), ConfidenceLevel::Low);

        let mut medium = strong_record();
        medium.citation_verifiability_rate = 0.5;
        assert_eq!(confidence(&medium), ConfidenceLevel::Medium);

        let mut unverifiable = strong_record();
        unverifiable.citation_verifiability_rate = 0.1;
        assert_eq!(confidence(&unverifiable), ConfidenceLevel::Low);
    }

    #[test]
    fn merged_consensus_overrides_study_consistency() {
        let mut r = strong_record();
        r.consensus = Some(ConsensusSummary {
            support_count: 3,
            contradict_count: 2,
            neutral_count: 0,
            total: 5,
            overall_stance: Stance::Support,
            confidence: 0.6,
        });
        assert!((consistency_signal(&r) - 0.6).abs() < 1e-6);
        assert_eq!(confidence(&r), ConfidenceLevel::Medium);

        r.consensus = Some(ConsensusSummary::empty());
        assert_eq!(consistency_signal(&r), 1.0);
    }

    #[test]
    fn neutral_consensus_never_raises_confidence() {
        let mut r = strong_record();
        r.included_studies = vec![
            StudyRecord::new("randomized trial", EffectDirection::Decrease),
            StudyRecord::new("randomized trial", EffectDirection::Increase),
        ];
        assert_eq!(confidence(&r), ConfidenceLevel::Medium);

        // three items all forced neutral for being too short
        r.consensus = Some(ConsensusSummary {
            support_count: 0,
            contradict_count: 0,
            neutral_count: 3,
            total: 3,
            overall_stance: Stance::Neutral,
            confidence: 1.0,
        });
        assert!((consistency_signal(&r) - 0.5).abs() < 1e-9);
        assert_eq!(confidence(&r), ConfidenceLevel::Medium);

        // a support/contradict tie is neutral too
        r.consensus = Some(ConsensusSummary {
            support_count: 2,
            contradict_count: 2,
            neutral_count: 0,
            total: 4,
            overall_stance: Stance::Neutral,
            confidence: 0.5,
        });
        assert_eq!(confidence(&r), ConfidenceLevel::Medium);
    }

    #[test]
    fn engine_rejects_invalid_record() {
        let engine = RubricEngine::new(Arc::new(FixedClock(2026)));
        let mut r = strong_record();
        r.numeric_diffs = vec![f64::NAN];
        assert_eq!(
            engine.score(&r).unwrap_err(),
            ValidationError::NonFiniteNumericDiff { index: 0 }
        );
    }

    #[test]
    fn recency_follows_injected_clock() {
        let mut r = strong_record();
        r.newest_key_evidence_year = Some(2015);
        let early = RubricEngine::new(Arc::new(FixedClock(2024))).score(&r).unwrap();
        let late = RubricEngine::new(Arc::new(FixedClock(2030))).score(&r).unwrap();
        assert_eq!(
            early.score_breakdown.evidence_base.appropriateness_verifiability_recency,
            late.score_breakdown.evidence_base.appropriateness_verifiability_recency + 1
        );
    }
}
