//! Hierarchical aggregation of leaf scores.
//!
//! The classifier scores every leaf code in the label space. To answer at a
//! coarser depth, leaves are grouped by their first `output_digits`
//! characters and each group gets one combined score.
//!
//! Leaf scores are pre-softmax logits. A group's score is the `logsumexp` of
//! its members, so a softmax over group scores gives each group the sum of
//! its members' softmax probabilities. Group scores remain logits and are
//! renormalised by the ranker.

use std::collections::HashMap;

use tariffcode_core::truncate_code;

use crate::error::ClassifyError;

/// A truncated code and its combined logit.
///
/// Borrows the code from the label space to keep request-time work free of
/// per-leaf string allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupScore<'a> {
    pub code: &'a str,
    pub score: f32,
}

/// Group leaf logits by code prefix and combine them, sorted descending.
///
/// Ties keep the order in which groups were first encountered. A NaN leaf
/// score is rejected; `-inf` is allowed and means "impossible".
pub fn aggregate<'a>(
    subheadings: &'a [String],
    leaf_scores: &[f32],
    output_digits: usize,
) -> Result<Vec<GroupScore<'a>>, ClassifyError> {
    if leaf_scores.len() != subheadings.len() {
        return Err(ClassifyError::ScoreLengthMismatch {
            expected: subheadings.len(),
            actual: leaf_scores.len(),
        });
    }
    if output_digits == 0 {
        return Err(ClassifyError::InvalidDigits);
    }

    // Group slot per leaf, and running max per group.
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    let mut slots = Vec::with_capacity(leaf_scores.len());
    let mut groups: Vec<(&str, f32)> = Vec::new();

    for (code, &score) in subheadings.iter().zip(leaf_scores) {
        if score.is_nan() {
            return Err(ClassifyError::NanScore { code: code.clone() });
        }
        if code.len() < output_digits {
            return Err(ClassifyError::OutputDigits {
                code: code.clone(),
                requested: output_digits,
            });
        }

        let prefix = truncate_code(code, output_digits);
        let slot = *slot_of.entry(prefix).or_insert_with(|| {
            groups.push((prefix, f32::NEG_INFINITY));
            groups.len() - 1
        });
        if score > groups[slot].1 {
            groups[slot].1 = score;
        }
        slots.push(slot);
    }

    // Sum of exp(x - max) per group.
    let mut sums = vec![0.0f32; groups.len()];
    for (&slot, &score) in slots.iter().zip(leaf_scores) {
        let max = groups[slot].1;
        if max.is_finite() {
            sums[slot] += (score - max).exp();
        }
    }

    let mut result: Vec<GroupScore<'a>> = groups
        .into_iter()
        .zip(sums)
        .map(|((code, max), sum)| GroupScore {
            code,
            score: if max.is_finite() { max + sum.ln() } else { max },
        })
        .collect();

    result.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(result)
}

/// Numerically stable softmax (subtracts the max before exponentiating).
///
/// Returns an empty vector for empty input, for any NaN input, or when the
/// largest score is not finite.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() || scores.iter().any(|s| s.is_nan()) {
        return Vec::new();
    }

    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
