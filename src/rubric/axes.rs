//! The four rubric axes and their lookup tables.
//!
//! Each sub-score is a small pure function so the tables can be tested
//! directly. Several tables are deliberately non-monotonic (see
//! `coverage`); keep them as explicit mappings.

use crate::record::{
    flags, Alignment, Certainty, ClaimType, EvaluationRecord, FlagMap, SemanticMatch,
    StudyRecord,
};
use crate::verdict::{CompletenessSafety, EvidenceBase, Expression, ScientificAccuracy};

use super::design::{best_rank, consistency, has_rct_or_review};

pub const ACCURACY_CAP: i32 = 40;
/// Axis A cap when evidence contradicts the claim or certainty is very low.
pub const ACCURACY_DEGRADED_CAP: i32 = 20;
pub const QUALITY_CAP_WITHOUT_RCT: i32 = 11;

// --- Axis A: scientific accuracy ---

/// A1: worst relative error for numeric claims, semantic match otherwise.
pub fn facts(numeric_diffs: &[f64], semantic: SemanticMatch) -> i32 {
    if numeric_diffs.is_empty() {
        return match semantic {
            SemanticMatch::Exact => 15,
            SemanticMatch::Minor => 12,
            SemanticMatch::Major => 6,
            SemanticMatch::Wrong => 0,
        };
    }
    let max_err = numeric_diffs.iter().copied().fold(0.0_f64, f64::max);
    match max_err {
        e if e <= 0.02 => 15,
        e if e <= 0.05 => 12,
        e if e <= 0.10 => 9,
        e if e <= 0.20 => 6,
        e if e <= 0.30 => 3,
        _ => 0,
    }
}

/// A2: how well the study designs back the causal framing of the claim.
pub fn causality(claim_type: ClaimType, alignment: Alignment, studies: &[StudyRecord]) -> i32 {
    match claim_type {
        ClaimType::Intervention | ClaimType::Diagnostic => {
            if has_rct_or_review(studies) {
                15
            } else {
                9
            }
        }
        ClaimType::Exposure => {
            if consistency(studies) >= 0.7 && alignment.is_supportive() {
                12
            } else {
                9
            }
        }
        ClaimType::Mechanistic | ClaimType::Policy => {
            if alignment.is_supportive() {
                6
            } else {
                4
            }
        }
        ClaimType::Other => 6,
    }
}

/// A3: starts at 10, loses points for missing or misused statistics.
pub fn stats_integrity(f: &FlagMap) -> i32 {
    let mut points: i32 = 10;
    if !f.is_set(flags::CI_PRESENT) {
        points -= 2;
    }
    if !f.is_set(flags::ABS_RISK_PRESENT) {
        points -= 3;
    }
    if f.is_set(flags::RR_ABS_CONFUSED) {
        points -= 3;
    }
    if f.is_set(flags::UNIT_ERRORS) {
        points -= 2;
    }
    points.clamp(0, 10)
}

pub fn scientific_accuracy(rec: &EvaluationRecord) -> ScientificAccuracy {
    let mut a1 = facts(&rec.numeric_diffs, rec.semantic_exact_if_non_numeric);
    let mut a2 = causality(rec.claim_type, rec.alignment_to_claim, &rec.included_studies);
    let mut a3 = stats_integrity(&rec.stats_integrity_flags);

    let mut cap = ACCURACY_CAP;
    let mut cap_applied = false;
    if rec.alignment_to_claim.is_adverse() && rec.grade_certainty.is_strong() {
        a1 = a1.min(6);
        a2 = a2.min(6);
        a3 = a3.min(4);
        cap = cap.min(ACCURACY_DEGRADED_CAP);
        cap_applied = true;
    }
    if rec.grade_certainty == Certainty::VeryLow {
        cap = cap.min(ACCURACY_DEGRADED_CAP);
        cap_applied = true;
    }

    ScientificAccuracy {
        facts: a1,
        causality: a2,
        stats: a3,
        cap_applied,
        subtotal: cap.min(a1 + a2 + a3),
    }
}

// --- Axis B: evidence base ---

/// Design rank → B1 points. Ranks 4 and 3 share a value.
pub fn rank_points(rank: u8) -> i32 {
    match rank {
        8 => 15,
        7 => 13,
        6 => 11,
        5 => 9,
        4 => 7,
        3 => 7,
        2 => 5,
        1 => 3,
        0 => 1,
        _ => 0,
    }
}

/// B1 and whether the no-RCT cap fired.
pub fn quality(claim_type: ClaimType, studies: &[StudyRecord]) -> (i32, bool) {
    let points = rank_points(best_rank(studies));
    if claim_type.needs_randomized_evidence() && !has_rct_or_review(studies) {
        (points.min(QUALITY_CAP_WITHOUT_RCT), true)
    } else {
        (points, false)
    }
}

pub fn appropriateness(studies: &[StudyRecord], alignment: Alignment) -> i32 {
    if studies.is_empty() {
        2
    } else if alignment != Alignment::Insufficient && studies.iter().any(StudyRecord::has_outcomes)
    {
        6
    } else {
        4
    }
}

pub fn verifiability(rate: f64) -> i32 {
    if rate >= 0.8 {
        2
    } else if rate >= 0.3 {
        1
    } else {
        0
    }
}

/// +1 for key evidence within 10 years, +1 for a guideline within 5.
pub fn recency(newest_key: Option<i32>, guideline: Option<i32>, current_year: i32) -> i32 {
    let key = newest_key.is_some_and(|y| y >= current_year - 10);
    let guide = guideline.is_some_and(|y| y >= current_year - 5);
    i32::from(key) + i32::from(guide)
}

pub fn evidence_base(rec: &EvaluationRecord, current_year: i32) -> EvidenceBase {
    let (b1, cap_applied) = quality(rec.claim_type, &rec.included_studies);
    let b2 = (appropriateness(&rec.included_studies, rec.alignment_to_claim)
        + verifiability(rec.citation_verifiability_rate)
        + recency(
            rec.newest_key_evidence_year,
            rec.guideline_year,
            current_year,
        ))
    .min(10);

    EvidenceBase {
        quality: b1,
        appropriateness_verifiability_recency: b2,
        cap_applied,
        subtotal: b1 + b2,
    }
}

// --- Axis C: expression ---

pub fn certainty_tone(certainty: Certainty, assertiveness: i32) -> i32 {
    let base: i32 = match certainty {
        Certainty::High => 10,
        Certainty::Moderate => 9,
        Certainty::Low => 8,
        Certainty::VeryLow => 7,
    };
    base.saturating_add(assertiveness).clamp(0, 10)
}

/// Levels outside 0..=5, negative ones included, score 6.
pub fn anti_exaggeration(level: i32) -> i32 {
    match level {
        0 => 10,
        1 => 8,
        2 => 6,
        3 => 4,
        4 => 2,
        5 => 0,
        _ => 6,
    }
}

pub fn expression(rec: &EvaluationRecord) -> Expression {
    let c1 = certainty_tone(rec.grade_certainty, rec.language_assertiveness_score);
    let c2 = anti_exaggeration(rec.exaggeration_level);
    Expression {
        certainty_tone: c1,
        no_exaggeration: c2,
        cap_applied: false,
        subtotal: c1 + c2,
    }
}

// --- Axis D: completeness & safety ---

/// Covered topics → points. Counts 1 and 3 earn nothing: the table is
/// intentionally non-monotonic, not a formula.
pub fn coverage_points(covered: usize) -> i32 {
    match covered {
        6 => 7,
        5 => 6,
        4 => 4,
        2 => 2,
        _ => 0,
    }
}

pub fn coverage(f: &FlagMap) -> i32 {
    let covered = flags::COVERAGE
        .iter()
        .filter(|aliases| f.is_any_set(aliases))
        .count();
    coverage_points(covered)
}

pub fn balance(f: &FlagMap) -> i32 {
    let counter = f.is_set(flags::MENTIONS_COUNTEREVIDENCE);
    let biased = f.is_set(flags::BIAS_TO_BENEFIT);
    match (counter, biased) {
        (true, false) => 4,
        (true, true) => 3,
        (false, true) => 1,
        (false, false) => 0,
    }
}

pub fn safety(f: &FlagMap) -> i32 {
    let mut points: i32 = 0;
    if f.is_set(flags::ADVERSE_EVENTS_QUANTIFIED) {
        points += 2;
    }
    if f.is_set(flags::HIGH_RISK_GROUPS) {
        points += 1;
    }
    if f.is_set(flags::CLINICAL_GUIDANCE) {
        points += 1;
    }
    points.min(4)
}

pub fn completeness_safety(rec: &EvaluationRecord) -> CompletenessSafety {
    let d1 = coverage(&rec.completeness_checks);
    let d2 = balance(&rec.balance_flags);
    let d3 = safety(&rec.safety_flags);
    CompletenessSafety {
        coverage: d1,
        balance: d2,
        safety: d3,
        cap_applied: false,
        subtotal: d1 + d2 + d3,
    }
}
