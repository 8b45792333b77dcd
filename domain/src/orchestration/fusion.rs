//! Response fusion
//!
//! Pure functions that turn per-agent answers into one result. All of them
//! are deterministic: ties are broken by the order agents were requested in.

use super::value_objects::{CompetitiveScore, EnsembleWeight};
use crate::agent::value_objects::AgentId;

/// Agents whose normalized ensemble weight falls below this are left out of
/// the fused text.
pub const ENSEMBLE_MIN_NORMALIZED_WEIGHT: f64 = 0.1;

/// `confidence × max(0.1, 1 − seconds / 10) × quality_threshold`
pub fn competitive_score(confidence: f64, latency_ms: u64, quality_threshold: f64) -> f64 {
    let seconds = latency_ms as f64 / 1000.0;
    let speed = (1.0 - seconds / 10.0).max(0.1);
    confidence * speed * quality_threshold
}

/// Index of the highest score; the earliest entry wins ties.
pub fn competitive_winner(scores: &[CompetitiveScore]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, entry) in scores.iter().enumerate() {
        match best {
            Some((_, score)) if entry.score <= score => {}
            _ => best = Some((index, entry.score)),
        }
    }
    best.map(|(index, _)| index)
}

/// One agent's input to ensemble fusion.
#[derive(Debug, Clone)]
pub struct EnsembleInput {
    pub agent_id: AgentId,
    pub display_name: String,
    pub quality_threshold: f64,
    pub confidence: f64,
    pub content: String,
}

/// Fused ensemble answer.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleFusion {
    pub text: String,
    pub confidence: f64,
    /// Weights in the same order as the inputs.
    pub weights: Vec<EnsembleWeight>,
}

/// Weight each answer by `quality_threshold × confidence` and concatenate.
///
/// Sections are ordered by descending raw weight (input order on ties) and
/// agents with a normalized weight below [`ENSEMBLE_MIN_NORMALIZED_WEIGHT`]
/// are omitted from the text. The confidence is the weighted average over
/// every input, excluded ones included, since they are part of the weight sum.
/// When every weight is zero the answers share the weight equally.
pub fn ensemble_fuse(inputs: &[EnsembleInput]) -> EnsembleFusion {
    let raws: Vec<f64> = inputs
        .iter()
        .map(|i| (i.quality_threshold * i.confidence).max(0.0))
        .collect();
    let total: f64 = raws.iter().sum();

    let normalized: Vec<f64> = if total > 0.0 {
        raws.iter().map(|r| r / total).collect()
    } else if inputs.is_empty() {
        Vec::new()
    } else {
        vec![1.0 / inputs.len() as f64; inputs.len()]
    };

    let weights: Vec<EnsembleWeight> = inputs
        .iter()
        .zip(raws.iter().zip(normalized.iter()))
        .map(|(input, (&raw, &norm))| EnsembleWeight {
            agent_id: input.agent_id.clone(),
            raw,
            normalized: norm,
            included: norm >= ENSEMBLE_MIN_NORMALIZED_WEIGHT,
        })
        .collect();

    let confidence = if total > 0.0 {
        inputs
            .iter()
            .zip(raws.iter())
            .map(|(input, raw)| raw * input.confidence)
            .sum::<f64>()
            / total
    } else {
        0.0
    };

    let mut order: Vec<usize> = (0..inputs.len()).collect();
    // Stable sort keeps input order for equal weights.
    order.sort_by(|&a, &b| raws[b].total_cmp(&raws[a]));

    let text = order
        .into_iter()
        .filter(|&i| weights[i].included)
        .map(|i| {
            format!(
                "### {} (weight {:.2})\n\n{}",
                inputs[i].display_name,
                weights[i].normalized,
                inputs[i].content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    EnsembleFusion {
        text,
        confidence,
        weights,
    }
}

/// State of one slot while racing agents in the parallel pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaceSlot {
    Pending,
    Failed,
    Completed { confidence: f64 },
}

/// What the parallel pattern can conclude from the current slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceDecision {
    /// The slot at this index is the earliest one meeting the threshold.
    Winner(usize),
    /// An earlier slot is still running; keep waiting.
    Undecided,
    /// Everything finished and nothing met the threshold.
    Exhausted,
}

/// Decide the parallel race in requested order.
///
/// A slot can only win once every slot before it has finished below the
/// threshold, which keeps the outcome independent of completion timing.
pub fn decide_race(slots: &[RaceSlot], threshold: f64) -> RaceDecision {
    for (index, slot) in slots.iter().enumerate() {
        match slot {
            RaceSlot::Pending => return RaceDecision::Undecided,
            RaceSlot::Completed { confidence } if *confidence >= threshold => {
                return RaceDecision::Winner(index);
            }
            _ => {}
        }
    }
    RaceDecision::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: &str, quality: f64, confidence: f64) -> EnsembleInput {
        EnsembleInput {
            agent_id: AgentId::new(id),
            display_name: id.to_uppercase(),
            quality_threshold: quality,
            confidence,
            content: format!("answer from {}", id),
        }
    }

    fn score(id: &str, score: f64) -> CompetitiveScore {
        CompetitiveScore {
            agent_id: AgentId::new(id),
            score,
        }
    }

    #[test]
    fn test_competitive_score_formula() {
        // 2 s latency → speed factor 0.8
        let s = competitive_score(0.9, 2000, 0.9);
        assert!((s - 0.9 * 0.8 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_competitive_speed_factor_floor() {
        let s = competitive_score(1.0, 30_000, 1.0);
        assert!((s - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_competitive_tie_goes_to_first_occurrence() {
        let scores = vec![score("a", 0.72), score("b", 0.81), score("c", 0.81)];
        assert_eq!(competitive_winner(&scores), Some(1));
    }

    #[test]
    fn test_competitive_winner_empty() {
        assert_eq!(competitive_winner(&[]), None);
    }

    #[test]
    fn test_ensemble_cutoff_excludes_low_weight_from_text() {
        // A: 0.9 × 0.8 = 0.72, B: 0.1 × 0.5 = 0.05 → B normalized ≈ 0.065
        let fusion = ensemble_fuse(&[input("a", 0.9, 0.8), input("b", 0.1, 0.5)]);

        assert!(fusion.weights[0].included);
        assert!(!fusion.weights[1].included);
        assert!((fusion.weights[1].normalized - 0.05 / 0.77).abs() < 1e-9);
        assert!(fusion.text.contains("answer from a"));
        assert!(!fusion.text.contains("answer from b"));

        // B still counts toward the weighted confidence.
        let expected = (0.72 * 0.8 + 0.05 * 0.5) / 0.77;
        assert!((fusion.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ensemble_keeps_agent_at_point_one_two() {
        // A: 0.72, B: 0.2 × 0.5 = 0.1 → B normalized ≈ 0.122, above the cutoff
        let fusion = ensemble_fuse(&[input("a", 0.9, 0.8), input("b", 0.2, 0.5)]);
        assert!(fusion.weights[1].included);
        assert!(fusion.text.contains("answer from b"));
    }

    #[test]
    fn test_ensemble_sections_ordered_by_weight() {
        let fusion = ensemble_fuse(&[input("low", 0.5, 0.5), input("high", 0.9, 0.9)]);
        let high = fusion.text.find("answer from high").unwrap();
        let low = fusion.text.find("answer from low").unwrap();
        assert!(high < low);
    }

    #[test]
    fn test_ensemble_all_zero_weights() {
        let fusion = ensemble_fuse(&[input("a", 0.9, 0.0), input("b", 0.8, 0.0)]);
        assert_eq!(fusion.confidence, 0.0);
        assert!((fusion.weights[0].normalized - 0.5).abs() < 1e-9);
        assert!(fusion.weights.iter().all(|w| w.included));
    }

    #[test]
    fn test_race_waits_for_earlier_slots() {
        let slots = [RaceSlot::Pending, RaceSlot::Completed { confidence: 0.99 }];
        assert_eq!(decide_race(&slots, 0.8), RaceDecision::Undecided);
    }

    #[test]
    fn test_race_skips_failures_and_low_confidence() {
        let slots = [
            RaceSlot::Failed,
            RaceSlot::Completed { confidence: 0.5 },
            RaceSlot::Completed { confidence: 0.85 },
            RaceSlot::Pending,
        ];
        assert_eq!(decide_race(&slots, 0.8), RaceDecision::Winner(2));
    }

    #[test]
    fn test_race_exhausted() {
        let slots = [RaceSlot::Failed, RaceSlot::Completed { confidence: 0.2 }];
        assert_eq!(decide_race(&slots, 0.8), RaceDecision::Exhausted);
    }
}
