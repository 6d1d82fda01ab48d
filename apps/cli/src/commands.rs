//! CLI command definitions, routing, and tracing setup.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use tracing::info;

use dossier_core::{DeliveryPipeline, SurveySubmission, ops};
use dossier_report::DocTheme;
use dossier_shared::{AppConfig, init_config, load_config, validate_service_key};
use dossier_store::{HttpBlobStore, HttpRecordStore};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Dossier — assemble and publish delivery documents for process records.
#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Assemble, publish, and finalize delivery documents for process records.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Assemble and publish the delivery document, then finalize the record.
    Finalize {
        /// Human-facing process code.
        code: String,

        /// Survey score (rendered verbatim).
        #[arg(short, long)]
        score: i64,

        /// Category ratings as a JSON object, e.g. '{"clarity": 5}'.
        #[arg(long, default_value = "{}")]
        ratings: String,

        /// Free-text feedback sections as a JSON object.
        #[arg(long, default_value = "{}")]
        feedback: String,
    },

    /// Refresh the record's survey fields without touching its documents.
    UpdateFeedback {
        /// Human-facing process code.
        code: String,

        /// Survey score (rendered verbatim).
        #[arg(short, long)]
        score: i64,

        /// Category ratings as a JSON object.
        #[arg(long, default_value = "{}")]
        ratings: String,

        /// Free-text feedback sections as a JSON object.
        #[arg(long, default_value = "{}")]
        feedback: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Print the resolved configuration with defaults applied.
    Show,
    /// Write a default config file to ~/.dossier/dossier.toml.
    Init,
}

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dossier=info",
        1 => "dossier=debug",
        _ => "dossier=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().with_env_filter(env_filter).json().init();
        }
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = load_config()?;

    match cli.command {
        Command::Finalize {
            code,
            score,
            ratings,
            feedback,
        } => {
            let submission = submission(code, score, &ratings, &feedback)?;
            let pipeline = build_pipeline(&config)?;
            match ops::finalize(&pipeline, &submission).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    info!(url = %response.final_doc, "finalized");
                    Ok(())
                }
                Err(err) => fail(err),
            }
        }

        Command::UpdateFeedback {
            code,
            score,
            ratings,
            feedback,
        } => {
            let submission = submission(code, score, &ratings, &feedback)?;
            let pipeline = build_pipeline(&config)?;
            match ops::update_feedback(&pipeline, &submission).await {
                Ok(response) => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                    Ok(())
                }
                Err(err) => fail(err),
            }
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Init => {
                let path = init_config()?;
                println!("wrote {}", path.display());
                Ok(())
            }
        },
    }
}

fn submission(
    process_code: String,
    score: i64,
    ratings: &str,
    feedback: &str,
) -> Result<SurveySubmission> {
    let ratings: BTreeMap<String, serde_json::Value> =
        serde_json::from_str(ratings).map_err(|e| eyre!("--ratings is not a JSON object: {e}"))?;
    let feedback: BTreeMap<String, String> = serde_json::from_str(feedback)
        .map_err(|e| eyre!("--feedback is not a JSON object of strings: {e}"))?;

    Ok(SurveySubmission {
        process_code,
        score,
        ratings,
        feedback,
    })
}

fn build_pipeline(config: &AppConfig) -> Result<DeliveryPipeline> {
    let service_key = validate_service_key(config)?;

    let records = HttpRecordStore::new(
        &config.store.url,
        &config.store.record_table,
        &service_key,
    )?;
    let blobs = HttpBlobStore::new(&config.store.url, &config.store.bucket, &service_key)?;

    let theme = DocTheme::from_name(&config.report.theme, &config.report.footer_address)?;
    let pipeline = DeliveryPipeline::new(
        Arc::new(records),
        Arc::new(blobs),
        &config.store.bucket,
        Duration::from_secs(config.fetch.timeout_secs),
        theme,
    )?;
    Ok(pipeline)
}

fn fail(err: dossier_core::ApiError) -> Result<()> {
    eprintln!("{}", serde_json::to_string_pretty(&err.body())?);
    Err(eyre!("{err} (HTTP {})", err.status_code()))
}
