//! Evidence sources for the label space.
//!
//! Each source maps tariff codes to the goods descriptions it has seen for
//! them. Sources differ in how much they are trusted: only `creates_codes`
//! sources may add codes to the label space, `authoritative` sources decide
//! the label of a description when sources disagree, and `multiplier`
//! repeats a source's examples to weight it during training.

use arrow::array::{Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tariffcode_core::{descriptions, normalize_code, normalize_description, vague_code};

use crate::error::ClassifyError;

/// code → descriptions, in the order the source produced them.
pub type CodeMap = IndexMap<String, IndexSet<String>>;

/// A supplier of `(code, description)` evidence.
///
/// `get_codes` must return codes already normalised to exactly `digits`
/// characters; the label-space builder only checks set membership. For a
/// fixed dataset the returned order must be deterministic.
pub trait DataSource: Send + Sync {
    /// Human-readable name used in logs.
    fn description(&self) -> &str;

    fn options(&self) -> SourceOptions;

    fn get_codes(&self, digits: usize) -> Result<CodeMap, ClassifyError>;

    fn authoritative(&self) -> bool {
        self.options().authoritative
    }

    fn creates_codes(&self) -> bool {
        self.options().creates_codes
    }

    /// Copies of each example this source contributes. Always at least 1.
    fn multiplier(&self) -> usize {
        self.options().multiplier.max(1)
    }
}

/// Trust and weighting attributes of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    pub authoritative: bool,
    pub creates_codes: bool,
    pub multiplier: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            authoritative: false,
            creates_codes: false,
            multiplier: 1,
        }
    }
}

impl SourceOptions {
    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    pub fn creates_codes(mut self, creates_codes: bool) -> Self {
        self.creates_codes = creates_codes;
        self
    }

    pub fn multiplier(mut self, multiplier: usize) -> Self {
        self.multiplier = multiplier;
        self
    }
}

/// Insert a raw pair, normalising both sides. Malformed pairs are skipped.
fn insert_pair(codes: &mut CodeMap, raw_code: &str, raw_description: &str, digits: usize) {
    let Some(code) = normalize_code(raw_code, digits) else {
        return;
    };
    let Some(description) = normalize_description(raw_description) else {
        return;
    };
    codes.entry(code).or_default().insert(description);
}

// ── Static ──

/// In-memory `(description, code)` pairs.
pub struct StaticDataSource {
    description: String,
    data: Vec<(String, String)>,
    options: SourceOptions,
}

impl StaticDataSource {
    pub fn new<D, C>(data: impl IntoIterator<Item = (D, C)>) -> Self
    where
        D: Into<String>,
        C: Into<String>,
    {
        Self {
            description: "Static data source".to_string(),
            data: data
                .into_iter()
                .map(|(d, c)| (d.into(), c.into()))
                .collect(),
            options: SourceOptions::default(),
        }
    }

    pub fn named(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataSource for StaticDataSource {
    fn description(&self) -> &str {
        &self.description
    }

    fn options(&self) -> SourceOptions {
        self.options
    }

    fn get_codes(&self, digits: usize) -> Result<CodeMap, ClassifyError> {
        let mut codes = CodeMap::new();
        for (description, code) in &self.data {
            insert_pair(&mut codes, code, description, digits);
        }
        Ok(codes)
    }
}

// ── Vague terms ──

/// Generic terms ("goods", "parts", "samples") mapped to the vague sentinel.
///
/// Authoritative and code-creating by default, so a vague term is never
/// trained against a real code even when another source claims it.
pub struct VagueTermsSource {
    description: String,
    terms: Vec<String>,
    options: SourceOptions,
}

impl VagueTermsSource {
    pub fn new<T: Into<String>>(terms: impl IntoIterator<Item = T>) -> Self {
        Self {
            description: "Vague terms".to_string(),
            terms: terms.into_iter().map(Into::into).collect(),
            options: SourceOptions::default()
                .authoritative(true)
                .creates_codes(true),
        }
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataSource for VagueTermsSource {
    fn description(&self) -> &str {
        &self.description
    }

    fn options(&self) -> SourceOptions {
        self.options
    }

    fn get_codes(&self, digits: usize) -> Result<CodeMap, ClassifyError> {
        let mut codes = CodeMap::new();
        let descriptions: IndexSet<String> = self
            .terms
            .iter()
            .filter_map(|t| normalize_description(t))
            .collect();
        if !descriptions.is_empty() {
            codes.insert(vague_code(digits).to_string(), descriptions);
        }
        Ok(codes)
    }
}

// ── Arrow ──

/// Evidence rows held in Arrow `RecordBatch`es.
///
/// Expects string columns `code` and `description` (Utf8 or LargeUtf8).
/// Null cells are skipped.
pub struct ArrowBatchSource {
    description: String,
    batches: Vec<RecordBatch>,
    options: SourceOptions,
}

impl ArrowBatchSource {
    pub fn new(description: impl Into<String>, batches: Vec<RecordBatch>) -> Self {
        Self {
            description: description.into(),
            batches,
            options: SourceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataSource for ArrowBatchSource {
    fn description(&self) -> &str {
        &self.description
    }

    fn options(&self) -> SourceOptions {
        self.options
    }

    fn get_codes(&self, digits: usize) -> Result<CodeMap, ClassifyError> {
        let mut codes = CodeMap::new();

        for batch in &self.batches {
            let missing = |column| ClassifyError::MissingColumn {
                source_name: self.description.clone(),
                column,
            };
            let code_col = batch
                .column_by_name(descriptions::CODE)
                .ok_or_else(|| missing(descriptions::CODE))?;
            let desc_col = batch
                .column_by_name(descriptions::DESCRIPTION)
                .ok_or_else(|| missing(descriptions::DESCRIPTION))?;

            for row in 0..batch.num_rows() {
                if let Some(code) = get_str(code_col.as_ref(), row)
                    && let Some(description) = get_str(desc_col.as_ref(), row)
                {
                    insert_pair(&mut codes, code, description, digits);
                }
            }
        }

        Ok(codes)
    }
}

/// Borrow a string value from an Arrow array (handles Utf8 and LargeUtf8).
fn get_str(col: &dyn Array, row: usize) -> Option<&str> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row))
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row))
        })
}
