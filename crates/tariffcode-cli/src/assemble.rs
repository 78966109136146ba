//! Training-data assembly from a JSON manifest of sources.
//!
//! ```json
//! {
//!   "sources": [
//!     { "kind": "vague_terms", "terms": ["goods", "parts"] },
//!     { "kind": "static", "name": "nomenclature", "creates_codes": true,
//!       "authoritative": true,
//!       "entries": [{ "description": "Riding horses", "code": "0101 29 90 00" }] }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tariffcode_ai::{
    DataSource, LabelSummary, SourceOptions, StaticDataSource, VagueTermsSource,
    prepare_training_data,
};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub sources: Vec<SourceSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    Static {
        name: String,
        #[serde(flatten)]
        options: SourceOptions,
        entries: Vec<Entry>,
    },
    VagueTerms {
        terms: Vec<String>,
        #[serde(default)]
        multiplier: Option<usize>,
    },
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub description: String,
    pub code: String,
}

impl SourceSpec {
    fn into_source(self) -> Box<dyn DataSource> {
        match self {
            Self::Static {
                name,
                options,
                entries,
            } => Box::new(
                StaticDataSource::new(entries.into_iter().map(|e| (e.description, e.code)))
                    .named(name)
                    .with_options(options),
            ),
            Self::VagueTerms { terms, multiplier } => {
                let options = SourceOptions::default()
                    .authoritative(true)
                    .creates_codes(true)
                    .multiplier(multiplier.unwrap_or(1));
                Box::new(VagueTermsSource::new(terms).with_options(options))
            }
        }
    }
}

impl Manifest {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("parsing source manifest")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading source manifest {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn into_sources(self) -> Vec<Box<dyn DataSource>> {
        self.sources.into_iter().map(SourceSpec::into_source).collect()
    }
}

/// Assembled training data as written to disk.
#[derive(Debug, Serialize)]
pub struct TrainingOutput<'a> {
    pub unique_texts: &'a [String],
    pub subheadings: &'a [String],
    pub texts: &'a [usize],
    pub labels: &'a [usize],
}

pub struct AssembleStats {
    pub summary: LabelSummary,
    pub elapsed_secs: f64,
}

/// Build the label space and training set, optionally writing them as JSON.
pub fn run_assemble(
    manifest: &Path,
    digits: usize,
    limit: Option<usize>,
    output: Option<&Path>,
) -> anyhow::Result<AssembleStats> {
    let start = Instant::now();

    let sources = Manifest::load(manifest)?.into_sources();
    tracing::info!(sources = sources.len(), "loaded source manifest");

    let (space, mut set) =
        prepare_training_data(&sources, digits).context("assembling training data")?;

    if let Some(limit) = limit {
        set.limit_texts(limit);
        tracing::info!(limit, examples = set.len(), "limited unique texts");
    }

    if let Some(path) = output {
        let out = TrainingOutput {
            unique_texts: &set.unique_texts,
            subheadings: &set.subheadings,
            texts: &set.text_indices,
            labels: &set.label_indices,
        };
        let json = serde_json::to_string(&out)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote training data");
    }

    Ok(AssembleStats {
        summary: set.summary(&space),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
