pub mod code;
pub mod config;
pub mod result;
pub mod schema;

pub use code::{VAGUE_TERM_CODE, normalize_code, normalize_description, truncate_code, vague_code};
pub use config::{ConfigError, SearchConfig};
pub use result::{ClassificationResult, ScoredCode, SearchResponse};
pub use schema::descriptions;
