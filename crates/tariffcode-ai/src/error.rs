use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("digit depth must be at least 1")]
    InvalidDigits,

    #[error("leaf score vector has {actual} entries but the label space has {expected}")]
    ScoreLengthMismatch { expected: usize, actual: usize },

    #[error("cannot group code '{code}' at {requested} digits")]
    OutputDigits { code: String, requested: usize },

    #[error("model produced NaN for code '{code}'")]
    NanScore { code: String },

    #[error("requested {requested} digits but the model was trained at {trained}")]
    DeeperThanTraining { requested: usize, trained: usize },

    #[error("data source '{source_name}' is missing column '{column}'")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },

    #[error(transparent)]
    Model(#[from] anyhow::Error),
}
