use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use reprise::config::AppConfig;
use reprise::display;
use reprise::engine::SimilarityEngine;
use reprise::features::Normalizer;
use reprise::model::{RawTrack, RecommendationRequest, Recommendations, Track};
use reprise::scoring::Method;

#[derive(Parser)]
#[command(name = "reprise", version, about = "Song recommendation engine — rank tracks by audio-feature similarity")]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank candidate tracks by similarity to the target
    Recommend {
        /// JSON file with a target track and its candidate tracks
        input: PathBuf,

        /// Scoring method (feature_based, cosine, euclidean, weighted)
        #[arg(short, long)]
        method: Option<String>,

        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show per-feature differences between the target and one candidate
    Breakdown {
        /// JSON file with a target track and its candidate tracks
        input: PathBuf,

        /// Candidate track id to compare against the target
        id: String,
    },

    /// Per-feature statistics across the candidate set
    Summary {
        /// JSON file with a target track and its candidate tracks
        input: PathBuf,
    },

    /// Pairwise similarity matrix over the target and all candidates
    Matrix {
        /// JSON file with a target track and its candidate tracks
        input: PathBuf,

        /// Scoring method (feature_based, cosine, euclidean, weighted)
        #[arg(short, long)]
        method: Option<String>,
    },

    /// List available scoring methods
    Methods,
}

/// Input document: one target and its candidate set, with raw features.
#[derive(Debug, Deserialize)]
struct InputDoc {
    target: RawTrack,
    candidates: Vec<RawTrack>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = AppConfig::load();
    let engine = SimilarityEngine::new(config.engine);
    let normalizer = Normalizer::new(config.engine.tempo);

    match cli.command {
        Commands::Recommend { input, method, limit, json } => {
            let doc = load_input(&input)?;
            let method = resolve_method(method, &config)?;
            let limit = limit.unwrap_or_else(|| config.resolve_limit());

            let target = normalizer.normalize_track(&doc.target);
            let candidates: Vec<Track> =
                doc.candidates.iter().map(|t| normalizer.normalize_track(t)).collect();

            let request =
                RecommendationRequest::new(target, candidates, method).with_limit(limit);
            let result = engine.recommend(request).context("Recommendation failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_recommendations(&result);
            }
        }

        Commands::Breakdown { input, id } => {
            let doc = load_input(&input)?;
            let target = normalizer.normalize_track(&doc.target);

            let raw_candidate = match doc.candidates.iter().find(|t| t.id == id) {
                Some(t) => t,
                None => {
                    println!("No candidate with id \"{}\" in {}.", id, input.display());
                    return Ok(());
                }
            };
            let candidate = normalizer.normalize_track(raw_candidate);

            let diffs = engine
                .feature_differences(&target, &candidate)
                .context("Comparison failed")?;

            println!(
                "\"{}\" ({}) vs \"{}\" ({})",
                target.name, target.artist, candidate.name, candidate.artist
            );
            println!(
                "Tempo: {} vs {}",
                display::format_tempo(doc.target.features.tempo_bpm),
                display::format_tempo(raw_candidate.features.tempo_bpm)
            );
            println!();
            println!(
                "{:<18} {:>7} {:>7} {:>7}  {}",
                "Feature", "Target", "Cand", "Delta", "Target reads as"
            );
            println!("{}", "-".repeat(78));

            let target_vals = target.features.values();
            let candidate_vals = candidate.features.values();
            for (i, (name, delta)) in diffs.iter().enumerate() {
                println!(
                    "{:<18} {:>7.3} {:>7.3} {:>7.3}  {}",
                    name,
                    target_vals[i],
                    candidate_vals[i],
                    delta,
                    display::describe_feature(name, target_vals[i]),
                );
            }
        }

        Commands::Summary { input } => {
            let doc = load_input(&input)?;
            let candidates: Vec<Track> =
                doc.candidates.iter().map(|t| normalizer.normalize_track(t)).collect();

            if candidates.is_empty() {
                println!("No candidates in {}.", input.display());
                return Ok(());
            }

            let summary = engine
                .feature_summary(&candidates)
                .context("Summary failed")?;
            let diversity = engine
                .diversity_score(&candidates)
                .context("Diversity computation failed")?;

            println!("Feature summary across {} candidates:", candidates.len());
            println!();
            println!(
                "{:<18} {:>7} {:>7} {:>7} {:>7} {:>7}",
                "Feature", "Mean", "Std", "Min", "Max", "Median"
            );
            println!("{}", "-".repeat(66));
            for (name, stats) in &summary {
                println!(
                    "{:<18} {:>7.3} {:>7.3} {:>7.3} {:>7.3} {:>7.3}",
                    name, stats.mean, stats.std, stats.min, stats.max, stats.median
                );
            }
            println!();
            println!("Set diversity: {:.3} (0 = identical tracks, 1 = maximal spread)", diversity);
        }

        Commands::Matrix { input, method } => {
            let doc = load_input(&input)?;
            let method = resolve_method(method, &config)?;

            let mut tracks = vec![normalizer.normalize_track(&doc.target)];
            tracks.extend(doc.candidates.iter().map(|t| normalizer.normalize_track(t)));

            let matrix = engine
                .similarity_matrix(&tracks, method)
                .context("Matrix computation failed")?;

            println!("Pairwise similarity ({} method):", method);
            println!();
            for (i, track) in tracks.iter().enumerate() {
                println!("{:>3}  {} — {}", i, track.name, track.artist);
            }
            println!();

            print!("{:>5}", "");
            for i in 0..tracks.len() {
                print!("{i:>7}");
            }
            println!();
            for (i, row) in matrix.iter().enumerate() {
                print!("{i:>5}");
                for score in row {
                    print!("{score:>7.3}");
                }
                println!();
            }
        }

        Commands::Methods => {
            println!("Available scoring methods:");
            println!();
            for method in Method::ALL {
                let marker = if method == Method::FeatureBased { " (default)" } else { "" };
                println!("  {:<15} {}{}", method.name(), method.describe(), marker);
            }
        }
    }

    Ok(())
}

/// Resolve the scoring method: CLI flag > config default > feature_based.
fn resolve_method(cli_method: Option<String>, config: &AppConfig) -> Result<Method> {
    match cli_method.or_else(|| config.default_method.clone()) {
        Some(name) => Ok(name.parse::<Method>()?),
        None => Ok(Method::FeatureBased),
    }
}

fn load_input(path: &Path) -> Result<InputDoc> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: InputDoc = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    log::info!("Loaded {} candidates from {}", doc.candidates.len(), path.display());
    Ok(doc)
}

/// Print ranked recommendations as a table.
fn print_recommendations(result: &Recommendations) {
    if result.results.is_empty() {
        println!("No recommendations found.");
        println!(
            "({} candidates considered, none survived filtering)",
            result.candidates_considered
        );
        return;
    }

    println!(
        "Tracks similar to \"{}\" by {} ({} method):",
        result.target.name, result.target.artist, result.method
    );
    println!();
    println!(
        "{:<28} {:<20} {:>7}  {}",
        "Song", "Artist", "Score", "Reasons"
    );
    println!("{}", "-".repeat(90));

    for scored in &result.results {
        let title = truncate(&scored.track.name, 28);
        let artist = truncate(&scored.track.artist, 20);
        println!(
            "{:<28} {:<20} {:>7}  {}",
            title,
            artist,
            display::format_score(scored.score),
            scored.reasons.join(", "),
        );
    }

    println!();
    println!(
        "{} candidates considered, {} returned",
        result.candidates_considered,
        result.results.len()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let cut = max.saturating_sub(3);
        let end = (1..=cut).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
