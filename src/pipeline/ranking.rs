//! Score transformation, ranking and truncation.

use crate::config::ScoreTransform;
use crate::error::{Error, Result};
use crate::pipeline::Candidate;
use crate::utils::IdentityTable;

/// Numerically stable softmax.
///
/// All `-inf` input yields a uniform distribution. If any logit is `+inf`,
/// the mass is split evenly across the `+inf` entries. Empty input yields
/// empty output.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::INFINITY {
        let hits = logits.iter().filter(|&&x| x == f32::INFINITY).count();
        #[allow(clippy::cast_precision_loss)]
        let share = 1.0 / hits as f32;
        return logits
            .iter()
            .map(|&x| if x == f32::INFINITY { share } else { 0.0 })
            .collect();
    }
    if !max.is_finite() {
        #[allow(clippy::cast_precision_loss)]
        let uniform = 1.0 / logits.len() as f32;
        return vec![uniform; logits.len()];
    }

    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Turn classifier output into comparable scores.
pub fn apply_transform(scores: Vec<f32>, transform: ScoreTransform) -> Vec<f32> {
    match transform {
        ScoreTransform::Raw => softmax(&scores),
        ScoreTransform::Probability => scores,
    }
}

/// Label `scores` with `identities` and sort descending.
pub fn rank(scores: &[f32], identities: &IdentityTable) -> Result<Vec<Candidate>> {
    if scores.len() != identities.len() {
        return Err(Error::ClassificationFailure {
            reason: format!(
                "classifier returned {} scores for {} identities",
                scores.len(),
                identities.len()
            ),
        });
    }

    let candidates = identities
        .iter()
        .zip(scores)
        .map(|(id, &score)| Candidate {
            identity_id: id.to_string(),
            score,
        })
        .collect();

    Ok(rank_candidates(candidates))
}

/// Stable descending sort; equal scores keep their input order.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}

/// Keep at most `max` leading items.
pub fn truncate<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}
