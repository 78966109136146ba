use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tariffcode_ai::{RankingParams, aggregate, rank};
use tariffcode_core::{SearchConfig, SearchResponse};
use tracing_subscriber::EnvFilter;

mod assemble;
mod display;

#[derive(Parser)]
#[command(name = "tariffcode", version, about = "Tariff code label assembly and ranking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the label space and training examples from a source manifest.
    Assemble {
        /// JSON manifest listing the sources, in priority order.
        #[arg(long)]
        sources: PathBuf,
        /// Digit depth of the label space [default: `training_digits` from the config].
        #[arg(long, env = "TARIFFCODE_DIGITS")]
        digits: Option<usize>,
        /// Keep only this many unique texts (for quick runs).
        #[arg(long)]
        limit: Option<usize>,
        /// Write the assembled data to this JSON file.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Search config file (TOML).
        #[arg(long, env = "TARIFFCODE_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Aggregate and rank a stored leaf-score vector.
    Rank {
        /// JSON array of subheadings, in label-index order.
        #[arg(long)]
        subheadings: PathBuf,
        /// JSON array of leaf logits aligned with the subheadings.
        #[arg(long)]
        scores: PathBuf,
        /// Output depth: 6 or 8.
        #[arg(long, default_value_t = 6, value_parser = parse_digits)]
        digits: usize,
        /// Maximum number of results, 1 to 10.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
        limit: u8,
        /// Search config file (TOML).
        #[arg(long, env = "TARIFFCODE_CONFIG")]
        config: Option<PathBuf>,
        /// Print a human-readable list instead of JSON.
        #[arg(long)]
        pretty: bool,
    },
}

fn parse_digits(s: &str) -> Result<usize, String> {
    match s {
        "6" => Ok(6),
        "8" => Ok(8),
        _ => Err(format!("digits must be 6 or 8, got '{s}'")),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> anyhow::Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("tariffcode v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Assemble {
            sources,
            digits,
            limit,
            output,
            config,
        } => {
            let config = SearchConfig::load(config.as_deref())?;
            let digits = digits.unwrap_or(config.training_digits);
            let stats = assemble::run_assemble(&sources, digits, limit, output.as_deref())?;
            display::print_summary(&stats.summary, stats.elapsed_secs);
        }
        Command::Rank {
            subheadings,
            scores,
            digits,
            limit,
            config,
            pretty,
        } => {
            let config = SearchConfig::load(config.as_deref())?;
            anyhow::ensure!(
                digits <= config.training_digits,
                "cannot rank at {digits} digits: the model was trained at {}",
                config.training_digits
            );
            let subheadings: Vec<String> = read_json(&subheadings)?;
            let scores: Vec<f32> = read_json(&scores)?;

            let grouped = aggregate(&subheadings, &scores, digits)
                .context("scores do not match the label space")?;
            let params = RankingParams::from_config(&config, limit as usize);
            let results = rank(&grouped, &params);

            if results.is_empty() {
                tracing::info!(groups = grouped.len(), "no confident match");
            }

            if pretty {
                display::print_results(&results);
            } else {
                let response = SearchResponse::from(results.as_slice());
                println!("{}", serde_json::to_string(&response)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec![
            "tariffcode",
            "rank",
            "--subheadings",
            "subheadings.json",
            "--scores",
            "scores.json",
        ];
        args.extend_from_slice(extra);
        args
    }

    #[test]
    fn rank_defaults() {
        let cli = Cli::try_parse_from(rank_args(&[])).unwrap();
        let Command::Rank { digits, limit, .. } = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(digits, 6);
        assert_eq!(limit, 5);
    }

    #[test]
    fn rank_accepts_bounds() {
        let cli = Cli::try_parse_from(rank_args(&["--digits", "8", "--limit", "10"])).unwrap();
        let Command::Rank { digits, limit, .. } = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(digits, 8);
        assert_eq!(limit, 10);

        assert!(Cli::try_parse_from(rank_args(&["--limit", "1"])).is_ok());
    }

    #[test]
    fn rank_rejects_limit_out_of_range() {
        assert!(Cli::try_parse_from(rank_args(&["--limit", "0"])).is_err());
        assert!(Cli::try_parse_from(rank_args(&["--limit", "11"])).is_err());
    }

    #[test]
    fn rank_rejects_other_digit_depths() {
        assert!(Cli::try_parse_from(rank_args(&["--digits", "7"])).is_err());
        assert!(Cli::try_parse_from(rank_args(&["--digits", "10"])).is_err());
    }

    #[test]
    fn assemble_digits_default_to_config() {
        let cli = Cli::try_parse_from(["tariffcode", "assemble", "--sources", "m.json"]).unwrap();
        let Command::Assemble { digits, .. } = cli.command else {
            panic!("expected assemble");
        };
        assert_eq!(digits, None);
        assert_eq!(digits.unwrap_or(SearchConfig::default().training_digits), 8);

        let cli = Cli::try_parse_from([
            "tariffcode", "assemble", "--sources", "m.json", "--digits", "10",
        ])
        .unwrap();
        let Command::Assemble { digits, .. } = cli.command else {
            panic!("expected assemble");
        };
        assert_eq!(digits, Some(10));
    }

    #[test]
    fn parse_digits_values() {
        assert_eq!(parse_digits("6"), Ok(6));
        assert_eq!(parse_digits("8"), Ok(8));
        assert!(parse_digits("").is_err());
        assert!(parse_digits("six").is_err());
    }
}
