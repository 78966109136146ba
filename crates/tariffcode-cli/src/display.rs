//! Plain-text rendering of assembly summaries and ranked results.

use tariffcode_ai::LabelSummary;
use tariffcode_core::ClassificationResult;

/// Print an assembly summary as a vertical card grouped by section.
pub fn print_summary(summary: &LabelSummary, elapsed_secs: f64) {
    println!("=== Training data ({} digits) ===", summary.digits);
    println!();

    println!("Label space");
    print_row("subheadings", summary.subheadings);
    print_row("labels_used", summary.labels_used);
    print_row("authoritative_texts", summary.authoritative_texts);

    println!("Examples");
    print_row("unique_texts", summary.unique_texts);
    print_row("examples", summary.examples);

    println!("Reconciliation");
    print_row("invalid_subheadings", summary.invalid_subheadings);
    print_row("overridden_labels", summary.overridden_labels);
    print_row("authority_conflicts", summary.conflicts);

    println!();
    println!("Done in {elapsed_secs:.2}s");
}

/// Print ranked results, one per line, with scores per mille.
pub fn print_results(results: &[ClassificationResult]) {
    if results.is_empty() {
        println!("  (no confident match)");
        return;
    }
    for (i, result) in results.iter().enumerate() {
        println!("  {:>2}. {:<12} {:>8.2}", i + 1, result.code, result.score * 1000.0);
    }
}

fn print_row(name: &str, value: usize) {
    println!("  {:<26} {}", name, value);
}
