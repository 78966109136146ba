//! Classification results and the response envelope returned to callers.

use serde::{Deserialize, Serialize};

/// A ranked tariff code with its renormalised confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub code: String,
    pub score: f32,
}

impl ClassificationResult {
    pub fn new(code: impl Into<String>, score: f32) -> Self {
        Self {
            code: code.into(),
            score,
        }
    }
}

impl std::fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {:.2}", self.code, self.score * 1000.0)
    }
}

/// One entry of the serialised response. Scores are scaled to `[0, 1000]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCode {
    pub code: String,
    pub score: f32,
}

/// Response body: `{"results": [{"code": ..., "score": ...}]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredCode>,
}

impl From<&[ClassificationResult]> for SearchResponse {
    fn from(results: &[ClassificationResult]) -> Self {
        Self {
            results: results
                .iter()
                .map(|r| ScoredCode {
                    code: r.code.clone(),
                    score: r.score * 1000.0,
                })
                .collect(),
        }
    }
}
