//! Per-claim consensus over classified evidence.

use serde::{Deserialize, Serialize};

use super::classifier::{Stance, StanceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusSummary {
    pub support_count: usize,
    pub contradict_count: usize,
    pub neutral_count: usize,
    pub total: usize,
    pub overall_stance: Stance,
    pub confidence: f32,
}

impl ConsensusSummary {
    pub fn empty() -> Self {
        Self {
            support_count: 0,
            contradict_count: 0,
            neutral_count: 0,
            total: 0,
            overall_stance: Stance::Neutral,
            confidence: 0.0,
        }
    }
}

/// Tally stances; the overall stance needs a count strictly greater than
/// both others. Ties and empty pluralities fall back to neutral.
pub fn aggregate(results: &[StanceResult]) -> ConsensusSummary {
    if results.is_empty() {
        return ConsensusSummary::empty();
    }

    let count = |s: Stance| results.iter().filter(|r| r.stance == s).count();
    let support = count(Stance::Support);
    let contradict = count(Stance::Contradict);
    let neutral = count(Stance::Neutral);
    let total = results.len();
    let share = |n: usize| n as f32 / total as f32;

    let (overall_stance, confidence) = if support > contradict && support > neutral {
        (Stance::Support, share(support))
    } else if contradict > support && contradict > neutral {
        (Stance::Contradict, share(contradict))
    } else if neutral > 0 {
        (Stance::Neutral, share(neutral))
    } else {
        (Stance::Neutral, 0.5)
    };

    ConsensusSummary {
        support_count: support,
        contradict_count: contradict,
        neutral_count: neutral,
        total,
        overall_stance,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: Stance) -> StanceResult {
        StanceResult::new(s, 0.9, "test")
    }

    #[test]
    fn empty_input_is_neutral_zero() {
        let s = aggregate(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.overall_stance, Stance::Neutral);
        assert_eq!(s.confidence, 0.0);
    }

    #[test]
    fn three_support_one_contradict() {
        let s = aggregate(&[
            r(Stance::Support),
            r(Stance::Support),
            r(Stance::Support),
            r(Stance::Contradict),
        ]);
        assert_eq!(s.overall_stance, Stance::Support);
        assert!((s.confidence - 0.75).abs() < 1e-6);
        assert_eq!((s.support_count, s.contradict_count, s.total), (3, 1, 4));
    }

    #[test]
    fn tie_without_neutrals_is_half() {
        let s = aggregate(&[r(Stance::Support), r(Stance::Contradict)]);
        assert_eq!(s.overall_stance, Stance::Neutral);
        assert_eq!(s.confidence, 0.5);
    }

    #[test]
    fn tie_with_neutrals_uses_neutral_share() {
        let s = aggregate(&[
            r(Stance::Support),
            r(Stance::Support),
            r(Stance::Neutral),
            r(Stance::Neutral),
        ]);
        assert_eq!(s.overall_stance, Stance::Neutral);
        assert!((s.confidence - 0.5).abs() < 1e-6);

        let s = aggregate(&[r(Stance::Support), r(Stance::Contradict), r(Stance::Neutral)]);
        assert_eq!(s.overall_stance, Stance::Neutral);
        assert!((s.confidence - 1.0 / 3.0).abs() < 1e-6);
    }
}
