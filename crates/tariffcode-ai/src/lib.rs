//! Label-space assembly from evidence sources, and hierarchical ranking of classifier scores.

pub mod aggregate;
pub mod classifier;
mod error;
pub mod labels;
pub mod rank;
pub mod source;

pub use aggregate::{GroupScore, aggregate, softmax};
pub use classifier::{FlatClassifier, ScoreModel};
pub use error::ClassifyError;
pub use labels::{
    AuthorityConflict, LabelSpace, LabelSummary, SourceCodes, TrainingSet, fetch_codes,
    prepare_training_data,
};
pub use rank::{RankingParams, rank};
pub use source::{
    ArrowBatchSource, CodeMap, DataSource, SourceOptions, StaticDataSource, VagueTermsSource,
};
