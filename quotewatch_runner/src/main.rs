//! # Quotewatch Runner
//!
//! CLI binary for running the source reconciliation pipeline over article
//! batches.
//!
//! Subcommands:
//! - `run`: process a JSON file of articles and write per-article reports
//! - `init-config`: print an example `quotewatch.toml` with defaults

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use quotewatch_config::QuotewatchConfig;
use quotewatch_core::{FilterRules, GenderLookup, NonPersonClassifier, SourceReconciler};
use quotewatch_extraction::ner::{GlinerConfig, GlinerRecognizer};
use quotewatch_extraction::pipeline::{Article, ArticlePipeline};
use quotewatch_extraction::proposer::{LlmConfig, LlmSourceProposer, SourceProposer};
use quotewatch_extraction::PatternExtractor;

/// Quotewatch source reconciliation runner
#[derive(Parser)]
#[command(name = "quotewatch")]
#[command(about = "Reconciles quoted-source detections across extraction methods")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a batch of articles and write per-article reports
    Run {
        /// Path to quotewatch.toml (defaults used when absent)
        #[arg(long, default_value = "quotewatch.toml")]
        config: PathBuf,

        /// Input JSON file: an array of articles with id/title/body/blockquotes
        input: PathBuf,

        /// Output JSON file for the reports (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print an example configuration file
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input,
            output,
        } => {
            let config = load_config(&config)?;
            init_tracing(&config);
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(run_batch(config, input, output))
        }
        Commands::InitConfig => {
            print!("{}", QuotewatchConfig::example_toml());
            Ok(())
        }
    }
}

fn load_config(path: &PathBuf) -> Result<QuotewatchConfig> {
    if path.exists() {
        QuotewatchConfig::from_file(&path.to_string_lossy())
    } else {
        let mut config = QuotewatchConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(config: &QuotewatchConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_batch(
    config: QuotewatchConfig,
    input: PathBuf,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = Arc::new(build_pipeline(&config)?);

    let contents = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;
    let articles: Vec<Article> =
        serde_json::from_str(&contents).context("input must be a JSON array of articles")?;
    info!(articles = articles.len(), "starting batch");

    let reports = pipeline
        .process_batch(articles, config.pipeline.concurrency)
        .await;

    let confirmed: usize = reports.iter().map(|r| r.sources.confirmed.len()).sum();
    let filtered: usize = reports.iter().map(|r| r.sources.filtered.len()).sum();
    info!(reports = reports.len(), confirmed, filtered, "batch complete");

    let json = serde_json::to_string_pretty(&reports)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write reports to {}", path.display()))?;
            info!(path = %path.display(), "reports written");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn build_pipeline(config: &QuotewatchConfig) -> Result<ArticlePipeline> {
    let rules = Arc::new(FilterRules::default().with_extensions(
        &config.filters.extra_brands,
        &config.filters.extra_title_prefixes,
        &config.filters.extra_place_suffixes,
        &config.filters.extra_denylist,
    ));

    let gender = if config.filters.names_table.is_empty() {
        Arc::new(GenderLookup::embedded())
    } else {
        Arc::new(GenderLookup::from_file(&config.filters.names_table)?)
    };

    // A recognizer that fails to load is not fatal: the classifier falls
    // back to its heuristic layers and the batch still runs.
    let recognizer = if config.ner.enabled {
        match GlinerRecognizer::new(
            &config.ner.model_path,
            &config.ner.tokenizer_path,
            GlinerConfig {
                threshold: config.ner.threshold,
                max_width: config.ner.max_width,
                num_threads: config.ner.num_threads,
            },
        ) {
            Ok(gliner) => Some(Arc::new(gliner) as Arc<dyn quotewatch_core::EntityRecognizer>),
            Err(err) => {
                warn!(
                    error = %err,
                    model_path = %config.ner.model_path,
                    "failed to load GLiNER recognizer; continuing with recognition disabled"
                );
                None
            }
        }
    } else {
        None
    };

    let classifier = NonPersonClassifier::new(rules.clone(), gender.clone(), recognizer)
        .with_single_token_gender_gate(config.reconciliation.single_token_gender_gate);
    let reconciler = SourceReconciler::new(classifier, rules.clone(), gender)
        .with_match_threshold(config.reconciliation.match_threshold);

    let proposer: Option<Arc<dyn SourceProposer>> = if config.llm.enabled {
        match std::env::var(&config.llm.api_key_env) {
            Ok(api_key) => {
                let llm = LlmSourceProposer::new(LlmConfig {
                    api_base_url: config.llm.api_base_url.clone(),
                    api_key,
                    model: config.llm.model.clone(),
                    temperature: config.llm.temperature,
                    max_tokens: config.llm.max_tokens,
                    timeout_secs: config.llm.timeout_secs,
                })?;
                Some(Arc::new(llm))
            }
            Err(_) => {
                warn!(
                    env = %config.llm.api_key_env,
                    "LLM enabled but API key env var is unset; continuing pattern-only"
                );
                None
            }
        }
    } else {
        None
    };

    let extractor = PatternExtractor::new()?;
    Ok(ArticlePipeline::new(extractor, proposer, reconciler, rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_recognizer_model_degrades_to_heuristics() {
        let mut config = QuotewatchConfig::default();
        config.ner.enabled = true;
        config.ner.model_path = "/nonexistent/model.onnx".to_string();
        config.ner.tokenizer_path = "/nonexistent/tokenizer.json".to_string();
        // Pipeline construction still succeeds, recognition disabled.
        assert!(build_pipeline(&config).is_ok());
    }
}
