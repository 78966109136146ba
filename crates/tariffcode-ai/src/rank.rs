//! Pruning, renormalisation and thresholding of grouped scores.

use tariffcode_core::{ClassificationResult, SearchConfig, truncate_code};
use tracing::debug;

use crate::aggregate::{GroupScore, softmax};

/// Parameters of one ranking call.
///
/// `limit` is expected in `1..=10`; the request layer rejects anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingParams {
    pub limit: usize,
    /// Fraction of groups kept before renormalising, e.g. 0.05.
    pub top_fraction: f32,
    /// The walk stops at the first score below this.
    pub score_cutoff: f32,
    /// Groups below this ratio of the best score are discarded.
    pub min_confidence_ratio: f32,
    /// The walk stops once returned scores sum to at least this.
    pub cumulative_cutoff: f32,
    /// Full-length vague sentinel; truncated to the output depth when compared.
    pub vague_code: String,
}

impl RankingParams {
    pub fn from_config(config: &SearchConfig, limit: usize) -> Self {
        Self {
            limit,
            top_fraction: config.top_fraction,
            score_cutoff: config.score_cutoff,
            min_confidence_ratio: config.min_confidence_ratio,
            cumulative_cutoff: config.cumulative_cutoff,
            vague_code: config.vague_code.clone(),
        }
    }
}

/// Rank grouped logits (sorted descending) into the final answer.
///
/// 1. Keep the top `ceil(len × top_fraction)` groups; the long tail is
///    dropped before renormalising.
/// 2. Softmax the kept groups.
/// 3. Discard groups below `min_confidence_ratio × best`.
/// 4. Walk in order: stop below `score_cutoff`, skip the vague code, stop at
///    `limit` results or once the running sum reaches `cumulative_cutoff`.
pub fn rank(grouped: &[GroupScore<'_>], params: &RankingParams) -> Vec<ClassificationResult> {
    if grouped.is_empty() || params.limit == 0 {
        return Vec::new();
    }

    let keep = ((grouped.len() as f32 * params.top_fraction).ceil().max(0.0) as usize)
        .min(grouped.len());
    let top = &grouped[..keep];

    let scores: Vec<f32> = top.iter().map(|g| g.score).collect();
    let probs = softmax(&scores);
    let Some(best) = probs.iter().copied().reduce(f32::max) else {
        debug!(groups = grouped.len(), keep, "nothing left to rank");
        return Vec::new();
    };
    let floor = params.min_confidence_ratio * best;

    // Every group code has the output depth, so the first one gives it.
    let vague = truncate_code(&params.vague_code, top[0].code.len());

    let mut results = Vec::with_capacity(params.limit.min(keep));
    let mut cumulative = 0.0f32;

    for (group, &prob) in top.iter().zip(&probs) {
        if prob < floor {
            continue;
        }
        if prob < params.score_cutoff {
            break;
        }
        if group.code == vague {
            continue;
        }

        results.push(ClassificationResult::new(group.code, prob));
        cumulative += prob;

        if results.len() == params.limit || cumulative >= params.cumulative_cutoff {
            break;
        }
    }

    results
}
