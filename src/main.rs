use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use gazette_recon_lib::db;
use gazette_recon_lib::extraction;
use gazette_recon_lib::matching;
use gazette_recon_lib::models::core::RegistryRow;
use gazette_recon_lib::models::matching::{MatchMode, MatchThresholds};
use gazette_recon_lib::utils::db_connect::StoreConfig;
use gazette_recon_lib::utils::env::load_env;

#[derive(Parser)]
#[command(name = "gazette_recon", about = "Reconciles gazette estate notices against a deceased-persons registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, match and persist one gazette document against one registry
    Run {
        /// Path to the decoded gazette text
        #[arg(long)]
        gazette: PathBuf,
        /// Path to the decoded registry rows (JSON array of label/value maps)
        #[arg(long)]
        registry: PathBuf,
        /// Matching strategy: exact, tokens or fuzzy
        #[arg(long, default_value = "fuzzy")]
        mode: String,
        #[arg(long, default_value_t = 0.8)]
        accept_threshold: f64,
        #[arg(long, default_value_t = 0.5)]
        review_threshold: f64,
    },
    /// List persisted matches
    List,
    /// Delete all persisted matches
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();

    let cli = Cli::parse();
    let store_config = StoreConfig::from_env();

    match cli.command {
        Command::Run {
            gazette,
            registry,
            mode,
            accept_threshold,
            review_threshold,
        } => {
            run_pipeline(
                &store_config,
                &gazette,
                &registry,
                &mode,
                MatchThresholds::new(accept_threshold, review_threshold),
            )
            .await
        }
        Command::List => {
            let matches = db::list_matches(&store_config).await?;
            for m in &matches {
                println!(
                    "{}\t{}\t{}\t{}\t{:.3}\t{}{}",
                    m.name_of_deceased,
                    m.court_station,
                    m.cause_no,
                    m.status_at_gp.as_str(),
                    m.score,
                    m.date_published,
                    if m.duplicate { "\t[duplicate]" } else { "" }
                );
            }
            info!("{} persisted matches", matches.len());
            Ok(())
        }
        Command::Clear => {
            let deleted = db::clear_matches(&store_config).await?;
            println!("Deleted {} persisted matches", deleted);
            Ok(())
        }
    }
}

async fn run_pipeline(
    store_config: &StoreConfig,
    gazette_path: &PathBuf,
    registry_path: &PathBuf,
    mode: &str,
    thresholds: MatchThresholds,
) -> Result<()> {
    info!("Starting gazette reconciliation pipeline");
    let pipeline_start = Instant::now();

    let mode = MatchMode::from_str(mode)?;

    // Phase 1: extraction over both inputs. The byte-level decoders are the
    // caller's concern; the pipeline consumes decoded text and row maps.
    let phase_start = Instant::now();
    let gazette_text = std::fs::read_to_string(gazette_path)
        .with_context(|| format!("Failed to read gazette text from {}", gazette_path.display()))?;
    let gazette_records = extraction::extract(&gazette_text);
    info!(
        "Phase 1: extracted {} gazette records in {:.2?}",
        gazette_records.len(),
        phase_start.elapsed()
    );

    let phase_start = Instant::now();
    let registry_rows = load_registry_rows(registry_path)?;
    info!(
        "Phase 1: resolved {} registry rows ({} with a usable name) in {:.2?}",
        registry_rows.len(),
        registry_rows.iter().filter(|r| r.has_name()).count(),
        phase_start.elapsed()
    );

    // Phase 2: matching.
    let phase_start = Instant::now();
    let outcome = matching::match_records(&gazette_records, &registry_rows, mode, thresholds)?;
    info!(
        "Phase 2: matching finished in {:.2?} ({} accepted, {} for review)",
        phase_start.elapsed(),
        outcome.accepted.len(),
        outcome.review.len()
    );
    for candidate in &outcome.review {
        println!(
            "REVIEW\t{:.3}\t{}\t{}",
            candidate.score, candidate.gazette.name_of_deceased, candidate.registry.name_raw
        );
    }

    // Phase 3: persistence. Only accept-tier rows are stored.
    let phase_start = Instant::now();
    db::init_schema(store_config).await?;
    let rows: Vec<db::NewMatchRow> = outcome
        .accepted
        .iter()
        .map(db::NewMatchRow::from_accepted)
        .collect();
    let upsert_stats = db::upsert_matches(store_config, &rows).await?;
    let flagged = db::flag_duplicates(store_config).await?;
    info!(
        "Phase 3: persisted in {:.2?} ({} inserted, {} updated, {} failed batches, {} duplicates flagged)",
        phase_start.elapsed(),
        upsert_stats.inserted,
        upsert_stats.updated,
        upsert_stats.failed_batches,
        flagged
    );

    info!(
        "Pipeline complete in {:.2?}: {:?}",
        pipeline_start.elapsed(),
        outcome.stats
    );
    Ok(())
}

/// Reads registry rows from the tabular decoder's JSON output: an array of
/// objects mapping column labels to string/number/blank values.
fn load_registry_rows(path: &PathBuf) -> Result<Vec<RegistryRow>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read registry rows from {}", path.display()))?;
    let parsed: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(&raw).context("Registry file is not a JSON array of row objects")?;

    let rows = parsed
        .into_iter()
        .map(|object| {
            let columns = object
                .into_iter()
                .map(|(label, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (label, value)
                })
                .collect();
            RegistryRow::from_columns(columns)
        })
        .collect();
    Ok(rows)
}
