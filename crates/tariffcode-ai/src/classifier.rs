//! Request-time classification: leaf scores → grouped → ranked codes.
//!
//! The trained model is external. It only has to produce one logit per
//! subheading, in label-index order; everything after that is deterministic
//! and allocation-light, so a single [`FlatClassifier`] can serve concurrent
//! requests through a shared reference.

use std::sync::Arc;

use tariffcode_core::{ClassificationResult, SearchConfig};
use tracing::{debug, info_span};

use crate::aggregate::aggregate;
use crate::error::ClassifyError;
use crate::rank::{RankingParams, rank};

/// A trained model scoring text against every subheading.
///
/// Implementations return pre-softmax logits aligned 1:1 with the
/// subheadings the model was trained on.
pub trait ScoreModel: Send + Sync {
    fn score_vector(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

impl<F> ScoreModel for F
where
    F: Fn(&str) -> anyhow::Result<Vec<f32>> + Send + Sync,
{
    fn score_vector(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self(text)
    }
}

/// Classifier over a flat (leaf-level) label space.
pub struct FlatClassifier<M> {
    model: M,
    subheadings: Arc<[String]>,
    config: SearchConfig,
}

impl<M: ScoreModel> FlatClassifier<M> {
    pub fn new(model: M, subheadings: impl Into<Arc<[String]>>, config: SearchConfig) -> Self {
        Self {
            model,
            subheadings: subheadings.into(),
            config,
        }
    }

    /// Subheadings the model was trained on, in label-index order.
    pub fn subheadings(&self) -> &Arc<[String]> {
        &self.subheadings
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Classify `text` into at most `limit` codes of `digits` digits.
    pub fn classify(
        &self,
        text: &str,
        limit: usize,
        digits: usize,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        let _span = info_span!("classify", digits, limit).entered();

        let leaf_scores = self.model.score_vector(text)?;
        let results = self.rank_scores(&leaf_scores, limit, digits)?;

        if results.is_empty() {
            debug!(text, "no confident classification");
        }
        Ok(results)
    }

    /// Aggregate and rank a precomputed leaf-score vector.
    ///
    /// `digits` may not exceed the configured training depth.
    pub fn rank_scores(
        &self,
        leaf_scores: &[f32],
        limit: usize,
        digits: usize,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        if digits > self.config.training_digits {
            return Err(ClassifyError::DeeperThanTraining {
                requested: digits,
                trained: self.config.training_digits,
            });
        }
        let grouped = aggregate(&self.subheadings, leaf_scores, digits)?;
        let params = RankingParams::from_config(&self.config, limit);
        Ok(rank(&grouped, &params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subheadings() -> Vec<String> {
        ["01012100", "01012910", "01012990", "vvvvvvvv", "02011000"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn config() -> SearchConfig {
        SearchConfig {
            top_fraction: 1.0,
            ..SearchConfig::default()
        }
    }

    fn fixed(scores: Vec<f32>) -> impl Fn(&str) -> anyhow::Result<Vec<f32>> + Send + Sync {
        move |_: &str| -> anyhow::Result<Vec<f32>> { Ok(scores.clone()) }
    }

    #[test]
    fn groups_children_at_six_digits() {
        // 010129 has two children whose mass together beats 010121.
        let clf = FlatClassifier::new(
            fixed(vec![2.0, 1.6, 1.6, -5.0, -5.0]),
            subheadings(),
            config(),
        );

        let results = clf.classify("horse", 5, 6).unwrap();
        assert_eq!(results[0].code, "010129");
        assert_eq!(results[1].code, "010121");
    }

    #[test]
    fn leaf_depth_keeps_leaves() {
        let clf = FlatClassifier::new(
            fixed(vec![2.0, 1.6, 1.6, -5.0, -5.0]),
            subheadings(),
            config(),
        );

        let results = clf.classify("horse", 1, 8).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "01012100");
    }

    #[test]
    fn vague_text_returns_nothing() {
        let clf = FlatClassifier::new(
            fixed(vec![-5.0, -5.0, -5.0, 8.0, -5.0]),
            subheadings(),
            config(),
        );
        assert!(clf.classify("goods", 5, 6).unwrap().is_empty());
    }

    #[test]
    fn mismatched_model_is_a_configuration_error() {
        let clf = FlatClassifier::new(fixed(vec![0.0, 1.0]), subheadings(), config());
        let err = clf.classify("horse", 5, 6).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::ScoreLengthMismatch {
                expected: 5,
                actual: 2
            }
        ));
    }

    #[test]
    fn deeper_than_training_depth_rejected() {
        let six_digit = SearchConfig {
            training_digits: 6,
            ..config()
        };
        let clf = FlatClassifier::new(fixed(vec![0.0; 5]), subheadings(), six_digit);
        assert!(matches!(
            clf.classify("horse", 5, 8),
            Err(ClassifyError::DeeperThanTraining {
                requested: 8,
                trained: 6
            })
        ));
        assert!(clf.classify("horse", 5, 6).is_ok());
    }

    #[test]
    fn nan_from_model_is_rejected() {
        let clf = FlatClassifier::new(
            fixed(vec![2.0, f32::NAN, 1.6, -5.0, -5.0]),
            subheadings(),
            config(),
        );
        let err = clf.classify("horse", 5, 6).unwrap_err();
        assert!(matches!(err, ClassifyError::NanScore { ref code } if code == "01012910"));
    }

    #[test]
    fn model_failure_propagates() {
        let failing = |_: &str| -> anyhow::Result<Vec<f32>> { anyhow::bail!("model not loaded") };
        let clf = FlatClassifier::new(failing, subheadings(), config());
        let err = clf.classify("horse", 5, 6).unwrap_err();
        assert!(matches!(err, ClassifyError::Model(_)));
        assert_eq!(err.to_string(), "model not loaded");
    }

    #[test]
    fn shared_subheadings() {
        let shared: Arc<[String]> = subheadings().into();
        let a = FlatClassifier::new(fixed(vec![0.0; 5]), shared.clone(), config());
        let b = FlatClassifier::new(fixed(vec![0.0; 5]), shared.clone(), config());
        assert!(Arc::ptr_eq(a.subheadings(), b.subheadings()));
    }
}
