//! Label space and training examples assembled from evidence sources.
//!
//! Building runs three passes over the sources, in the order given:
//!
//! 1. **Label space**: code-creating sources contribute codes; each new code
//!    gets the next dense label index.
//! 2. **Authority**: authoritative sources claim descriptions. The first
//!    claim on a description wins; later differing claims are recorded as
//!    conflicts and logged.
//! 3. **Assembly**: every source contributes `(text, label)` examples for
//!    codes inside the label space. Authoritative claims override the
//!    source's own code, and each example is repeated `multiplier` times.
//!
//! Source order matters. Unique texts are indexed during pass 3, so the
//! first source to mention a description fixes its text index.

use std::collections::HashMap;

use indexmap::IndexSet;
use tracing::{debug, info, info_span, warn};

use crate::error::ClassifyError;
use crate::source::{CodeMap, DataSource};

/// Codes fetched once from a source, alongside the source itself.
pub struct SourceCodes<'a> {
    pub source: &'a dyn DataSource,
    pub codes: CodeMap,
}

/// Fetch every source's codes at `digits`, preserving source order.
pub fn fetch_codes(
    sources: &[Box<dyn DataSource>],
    digits: usize,
) -> Result<Vec<SourceCodes<'_>>, ClassifyError> {
    if digits == 0 {
        return Err(ClassifyError::InvalidDigits);
    }

    sources
        .iter()
        .map(|source| {
            let codes = source.get_codes(digits)?;
            debug!(
                source = source.description(),
                codes = codes.len(),
                "retrieved codes from source"
            );
            Ok(SourceCodes {
                source: &**source,
                codes,
            })
        })
        .collect()
}

/// A later authoritative claim that disagreed with the one already held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConflict {
    pub description: String,
    /// Code from the first authoritative claim, which is kept.
    pub kept_code: String,
    /// Code from the later claim, which is ignored.
    pub rejected_code: String,
    /// Name of the source that made the ignored claim.
    pub source: String,
}

/// The canonical code list for one build, plus authoritative claims.
pub struct LabelSpace {
    digits: usize,
    subheadings: Vec<String>,
    label_index: HashMap<String, usize>,
    authoritative: HashMap<String, String>,
    conflicts: Vec<AuthorityConflict>,
}

impl LabelSpace {
    /// Run the label-space and authority passes over fetched source codes.
    pub fn build(fetched: &[SourceCodes<'_>], digits: usize) -> Result<Self, ClassifyError> {
        if digits == 0 {
            return Err(ClassifyError::InvalidDigits);
        }

        let mut space = Self {
            digits,
            subheadings: Vec::new(),
            label_index: HashMap::new(),
            authoritative: HashMap::new(),
            conflicts: Vec::new(),
        };

        for entry in fetched.iter().filter(|e| e.source.creates_codes()) {
            for code in entry.codes.keys() {
                if !space.label_index.contains_key(code) {
                    space.label_index.insert(code.clone(), space.subheadings.len());
                    space.subheadings.push(code.clone());
                }
            }
        }

        for entry in fetched.iter().filter(|e| e.source.authoritative()) {
            for (code, descriptions) in &entry.codes {
                if !space.label_index.contains_key(code) {
                    continue;
                }
                for description in descriptions {
                    space.claim(description, code, entry.source.description());
                }
            }
        }

        info!(
            digits,
            subheadings = space.subheadings.len(),
            authoritative_texts = space.authoritative.len(),
            conflicts = space.conflicts.len(),
            "built label space"
        );
        Ok(space)
    }

    fn claim(&mut self, description: &str, code: &str, source: &str) {
        match self.authoritative.get(description) {
            None => {
                self.authoritative
                    .insert(description.to_string(), code.to_string());
            }
            Some(kept) if kept == code => {}
            Some(kept) => {
                warn!(
                    description,
                    kept_code = %kept,
                    rejected_code = code,
                    source,
                    "conflicting authoritative code ignored"
                );
                self.conflicts.push(AuthorityConflict {
                    description: description.to_string(),
                    kept_code: kept.clone(),
                    rejected_code: code.to_string(),
                    source: source.to_string(),
                });
            }
        }
    }

    /// Digit depth of every code in the space.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Codes in label-index order.
    pub fn subheadings(&self) -> &[String] {
        &self.subheadings
    }

    pub fn len(&self) -> usize {
        self.subheadings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subheadings.is_empty()
    }

    pub fn label_index(&self, code: &str) -> Option<usize> {
        self.label_index.get(code).copied()
    }

    /// The code an authoritative source assigned to `description`, if any.
    pub fn authoritative_code(&self, description: &str) -> Option<&str> {
        self.authoritative.get(description).map(|s| s.as_str())
    }

    pub fn conflicts(&self) -> &[AuthorityConflict] {
        &self.conflicts
    }
}

/// Label-weighted training examples over deduplicated texts.
///
/// `text_indices[i]` and `label_indices[i]` together form example `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub unique_texts: Vec<String>,
    pub subheadings: Vec<String>,
    pub text_indices: Vec<usize>,
    pub label_indices: Vec<usize>,
    /// Pairs dropped because their code is outside the label space.
    pub invalid_subheadings: usize,
    /// Pairs whose label was replaced by an authoritative claim.
    pub overridden_labels: usize,
}

impl TrainingSet {
    /// Run the assembly pass over fetched source codes.
    pub fn assemble(space: &LabelSpace, fetched: &[SourceCodes<'_>]) -> Self {
        let mut unique_texts: IndexSet<String> = IndexSet::new();
        let mut set = Self {
            subheadings: space.subheadings.clone(),
            ..Self::default()
        };

        for entry in fetched {
            let multiplier = entry.source.multiplier();
            let before = set.text_indices.len();

            for (code, descriptions) in &entry.codes {
                let Some(own_label) = space.label_index(code) else {
                    set.invalid_subheadings += descriptions.len();
                    continue;
                };

                for description in descriptions {
                    if description.trim().is_empty() {
                        continue;
                    }

                    let label = match space.authoritative_code(description) {
                        Some(auth) if auth != code => {
                            set.overridden_labels += 1;
                            space.label_index(auth).unwrap_or(own_label)
                        }
                        _ => own_label,
                    };

                    let text = unique_texts
                        .get_index_of(description.as_str())
                        .unwrap_or_else(|| unique_texts.insert_full(description.clone()).0);

                    for _ in 0..multiplier {
                        set.text_indices.push(text);
                        set.label_indices.push(label);
                    }
                }
            }

            debug!(
                source = entry.source.description(),
                examples = set.text_indices.len() - before,
                multiplier,
                "assembled examples from source"
            );
        }

        set.unique_texts = unique_texts.into_iter().collect();

        info!(
            unique_texts = set.unique_texts.len(),
            examples = set.text_indices.len(),
            invalid_subheadings = set.invalid_subheadings,
            overridden_labels = set.overridden_labels,
            "assembled training examples"
        );
        set
    }

    pub fn len(&self) -> usize {
        self.text_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text_indices.is_empty()
    }

    /// Iterate over examples as `(text, code)` pairs.
    pub fn examples(&self) -> impl Iterator<Item = (&str, &str)> {
        self.text_indices
            .iter()
            .zip(&self.label_indices)
            .map(|(&t, &l)| (self.unique_texts[t].as_str(), self.subheadings[l].as_str()))
    }

    /// Keep only the first `limit` unique texts and the examples that use them.
    ///
    /// Used to cut the data down for quick development runs.
    pub fn limit_texts(&mut self, limit: usize) {
        if limit >= self.unique_texts.len() {
            return;
        }
        self.unique_texts.truncate(limit);

        let (texts, labels): (Vec<usize>, Vec<usize>) = self
            .text_indices
            .iter()
            .zip(&self.label_indices)
            .filter(|(t, _)| **t < limit)
            .map(|(&t, &l)| (t, l))
            .unzip();
        self.text_indices = texts;
        self.label_indices = labels;
    }

    /// Summary statistics.
    pub fn summary(&self, space: &LabelSpace) -> LabelSummary {
        let mut used = vec![false; self.subheadings.len()];
        for &l in &self.label_indices {
            used[l] = true;
        }

        LabelSummary {
            digits: space.digits(),
            subheadings: self.subheadings.len(),
            labels_used: used.iter().filter(|u| **u).count(),
            unique_texts: self.unique_texts.len(),
            examples: self.text_indices.len(),
            authoritative_texts: space.authoritative.len(),
            conflicts: space.conflicts().len(),
            invalid_subheadings: self.invalid_subheadings,
            overridden_labels: self.overridden_labels,
        }
    }
}

/// Summary statistics for a label space and its training set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSummary {
    pub digits: usize,
    pub subheadings: usize,
    /// Subheadings with at least one training example.
    pub labels_used: usize,
    pub unique_texts: usize,
    pub examples: usize,
    pub authoritative_texts: usize,
    pub conflicts: usize,
    pub invalid_subheadings: usize,
    pub overridden_labels: usize,
}

/// Fetch, build and assemble in one step.
pub fn prepare_training_data(
    sources: &[Box<dyn DataSource>],
    digits: usize,
) -> Result<(LabelSpace, TrainingSet), ClassifyError> {
    let _span = info_span!("prepare_training_data", digits, sources = sources.len()).entered();

    let fetched = fetch_codes(sources, digits)?;
    let space = LabelSpace::build(&fetched, digits)?;
    let set = TrainingSet::assemble(&space, &fetched);
    Ok((space, set))
}
