//! End to end: sources → label space → training set → classifier → ranked codes.

use std::collections::HashMap;

use tariffcode_ai::{
    DataSource, FlatClassifier, SourceOptions, StaticDataSource, TrainingSet, VagueTermsSource,
    prepare_training_data,
};
use tariffcode_core::{SearchConfig, SearchResponse};

fn sources() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(VagueTermsSource::new(["goods", "samples"])),
        Box::new(
            StaticDataSource::new([
                ("Pure-bred breeding horses", "0101 21 00 00"),
                ("Horses for slaughter", "0101 29 10 00"),
                ("Riding horses", "0101 29 90 00"),
                ("Carcasses of bovine animals", "0201 10 00 00"),
            ])
            .named("nomenclature")
            .with_options(SourceOptions::default().creates_codes(true).authoritative(true)),
        ),
        Box::new(
            StaticDataSource::new([
                ("racehorse", "0101299000"),
                ("riding horses", "0101210000"),
                ("goods", "0201100000"),
                ("unknown thing", "9999999999"),
            ])
            .named("declarations")
            .with_options(SourceOptions::default().multiplier(2)),
        ),
    ]
}

/// Stand-in model: logit 6 for every subheading a text was trained on.
fn memorising_model(set: &TrainingSet) -> impl Fn(&str) -> anyhow::Result<Vec<f32>> + Send + Sync {
    let mut seen: HashMap<String, Vec<usize>> = HashMap::new();
    for (&t, &l) in set.text_indices.iter().zip(&set.label_indices) {
        seen.entry(set.unique_texts[t].clone()).or_default().push(l);
    }
    let width = set.subheadings.len();

    move |text: &str| -> anyhow::Result<Vec<f32>> {
        let mut logits = vec![0.0f32; width];
        if let Some(labels) = seen.get(&text.to_lowercase()) {
            for &l in labels {
                logits[l] = 6.0;
            }
        }
        Ok(logits)
    }
}

#[test]
fn training_data_reflects_source_policy() {
    let sources = sources();
    let (space, set) = prepare_training_data(&sources, 8).unwrap();

    assert_eq!(
        space.subheadings(),
        ["vvvvvvvv", "01012100", "01012910", "01012990", "02011000"]
    );

    let examples: Vec<(&str, &str)> = set.examples().collect();
    // The authoritative nomenclature wins for "riding horses" and the vague list for "goods".
    assert!(examples.contains(&("riding horses", "01012990")));
    assert!(!examples.contains(&("riding horses", "01012100")));
    assert!(examples.contains(&("goods", "vvvvvvvv")));
    assert_eq!(
        examples.iter().filter(|e| **e == ("racehorse", "01012990")).count(),
        2
    );

    let summary = set.summary(&space);
    assert_eq!(summary.invalid_subheadings, 1);
    assert_eq!(summary.overridden_labels, 2);
    assert_eq!(summary.conflicts, 0);
    assert_eq!(summary.examples, set.text_indices.len());
    assert_eq!(set.text_indices.len(), set.label_indices.len());
    assert!(set.text_indices.iter().all(|&t| t < set.unique_texts.len()));
    assert!(set.label_indices.iter().all(|&l| l < set.subheadings.len()));
}

#[test]
fn classifier_ranks_trained_codes() {
    let sources = sources();
    let (space, set) = prepare_training_data(&sources, 8).unwrap();

    let config = SearchConfig {
        top_fraction: 1.0,
        ..SearchConfig::default()
    };
    let clf = FlatClassifier::new(memorising_model(&set), space.subheadings().to_vec(), config);

    let eight = clf.classify("Racehorse", 5, 8).unwrap();
    assert_eq!(eight[0].code, "01012990");

    let six = clf.classify("Racehorse", 5, 6).unwrap();
    assert_eq!(six[0].code, "010129");
    assert!(six.iter().all(|r| r.code.len() == 6));

    // Generic text lands on the sentinel, which is never returned.
    let vague = clf.classify("goods", 5, 6).unwrap();
    assert!(vague.iter().all(|r| r.code != "vvvvvv"));

    let response = SearchResponse::from(six.as_slice());
    assert_eq!(response.results[0].code, "010129");
    assert!((response.results[0].score - six[0].score * 1000.0).abs() < 1e-3);
}
