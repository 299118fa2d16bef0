//! Study-design heuristics: rank a free-text design descriptor and measure
//! effect-direction consistency across studies.

use crate::record::{EffectDirection, StudyRecord};

pub const RANK_SYSTEMATIC_REVIEW: u8 = 8;
pub const RANK_MULTICENTER_RCT: u8 = 7;
pub const RANK_RCT: u8 = 6;
pub const RANK_UNRECOGNIZED: u8 = 3;

/// Map a design descriptor to 0..=8. First matching keyword group wins;
/// empty text ranks 0, unrecognised text ranks 3.
pub fn design_rank(design: &str) -> u8 {
    let d = design.trim().to_lowercase();
    if d.is_empty() {
        return 0;
    }
    let has = |keys: &[&str]| keys.iter().any(|k| d.contains(k));

    if has(&["cochrane", "systematic", "meta-analy", "meta analy", "metaanaly"]) {
        return RANK_SYSTEMATIC_REVIEW;
    }
    if is_randomized(&d) {
        if has(&["large", "multicenter", "multicentre", "multi-center", "multi-centre"]) {
            return RANK_MULTICENTER_RCT;
        }
        return RANK_RCT;
    }
    if has(&["prospective", "cohort"]) {
        return 5;
    }
    if has(&["case-control", "case control"]) {
        return 4;
    }
    if has(&["cross-sectional", "cross sectional"]) {
        return 3;
    }
    if has(&["case series", "case-series", "case report", "case-report"]) {
        return 2;
    }
    if has(&["animal", "in vitro", "in-vitro"]) {
        return 1;
    }
    if has(&["preprint"]) {
        return 0;
    }
    RANK_UNRECOGNIZED
}

fn is_randomized(d: &str) -> bool {
    let negated = d.contains("non-random") || d.contains("nonrandom") || d.contains("non random");
    let rct_token = d
        .split(|c: char| !c.is_alphanumeric())
        .any(|t| t == "rct" || t == "rcts");
    !negated && (d.contains("random") || rct_token)
}

/// Best rank among the studies; 0 when there are none.
pub fn best_rank(studies: &[StudyRecord]) -> u8 {
    studies
        .iter()
        .map(|s| design_rank(&s.design))
        .max()
        .unwrap_or(0)
}

/// Any systematic review, meta-analysis or randomized trial present.
pub fn has_rct_or_review(studies: &[StudyRecord]) -> bool {
    studies.iter().any(|s| design_rank(&s.design) >= RANK_RCT)
}

/// Majority-direction share among studies reporting increase, decrease or
/// no increase. 0.5 when none qualify.
pub fn consistency(studies: &[StudyRecord]) -> f64 {
    let count = |dir: EffectDirection| {
        studies
            .iter()
            .filter(|s| s.effect_direction == dir)
            .count()
    };
    let counts = [
        count(EffectDirection::Increase),
        count(EffectDirection::Decrease),
        count(EffectDirection::NoIncrease),
    ];
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.5;
    }
    let majority = counts.iter().copied().max().unwrap_or(0);
    majority as f64 / total as f64
}
