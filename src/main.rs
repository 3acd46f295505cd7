//! `eol-scanner`: check packages listed in CSV exports against endoflife.date.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging.
//! 2. Load config ([`config::load_config`]) and apply CLI overrides.
//! 3. Find the input CSV files ([`detector::detect_inputs`]).
//! 4. Load the catalog product list ([`catalog::CatalogIndex::load`]); failure aborts the run.
//! 5. For each file: read rows ([`input`]), resolve, fetch cycles, match and classify
//!    ([`scan`]), then write reports ([`report`]).
//! 6. Exit `0`, or `1` when nothing could be scanned or `--fail-on-eol` found an EOL package.

mod catalog;
mod classifier;
mod cli;
mod config;
mod detector;
mod error;
mod input;
mod matching;
mod models;
mod report;
mod scan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog::cache::ResponseCache;
use catalog::client::HttpCatalog;
use catalog::{CatalogIndex, CatalogSource};
use cli::Cli;
use config::{load_config, Config};
use detector::{detect_inputs, output_dirs};
use input::reader::read_records;
use report::{terminal, timestamp_slug, write_reports};
use scan::{scan_records, summarize, ScanSummary};

/// Settings shared by every file in one run.
struct Run<'a> {
    cli: &'a Cli,
    config: &'a Config,
    started: DateTime<Local>,
    today: NaiveDate,
    timestamp: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = load_config(&cwd, cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.catalog.base_url = url.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        config.catalog.cache_dir = Some(dir.clone());
    }

    let inputs = detect_inputs(&cli.input)?;
    if inputs.is_empty() {
        eprintln!("No input CSV files found at {}", cli.input.display());
        std::process::exit(1);
    }

    let cache = if cli.no_cache {
        ResponseCache::disabled()
    } else {
        ResponseCache::new(config.catalog.resolved_cache_dir(), config.catalog.cache_ttl())
    };
    if cli.clear_cache {
        cache.clear().context("Failed to clear the response cache")?;
    }
    if cache.is_enabled() {
        tracing::debug!(
            "Response cache at {} (ttl {:?})",
            config.catalog.resolved_cache_dir().display(),
            cache.ttl()
        );
    }
    let mut source = HttpCatalog::new(&config.catalog, cache, cli.refresh)?;

    let mut index = match CatalogIndex::load(&mut source, &config.matching.aliases).await {
        Ok(index) => index,
        Err(e) => {
            eprintln!("{} could not load the catalog product list: {e}", "error:".red().bold());
            std::process::exit(1);
        }
    };

    // One scan date for the whole run, so every row is classified against the same day.
    let started = Local::now();
    let run = Run {
        cli: &cli,
        config: &config,
        started,
        today: started.date_naive(),
        timestamp: timestamp_slug(&started),
    };
    let out_dirs = output_dirs(&cli.output, &inputs);

    let mut scanned = 0;
    let mut eol_found = false;
    for (path, out_dir) in inputs.iter().zip(&out_dirs) {
        match scan_file(&run, path, out_dir, &mut source, &mut index).await {
            Ok(summary) => {
                scanned += 1;
                eol_found |= summary.eol > 0;
            }
            Err(e) => {
                tracing::error!("Skipping {}: {e:#}", path.display());
            }
        }
    }

    if scanned == 0 {
        eprintln!("{} no input file could be scanned", "error:".red().bold());
        std::process::exit(1);
    }

    if cli.fail_on_eol && eol_found {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn scan_file<S: CatalogSource>(
    run: &Run<'_>,
    path: &Path,
    out_dir: &Path,
    source: &mut S,
    index: &mut CatalogIndex,
) -> Result<ScanSummary> {
    let input = read_records(path, &run.config.columns)?;
    let source_file = path.display().to_string();
    tracing::info!("{source_file}: {} packages", input.records.len());
    if input.skipped > 0 {
        tracing::warn!("{source_file}: skipped {} rows without a package name", input.skipped);
    }

    let progress = if run.cli.quiet {
        None
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    };

    let results = scan_records(
        source,
        index,
        &run.config.matching,
        &input.records,
        &source_file,
        run.today,
        progress.as_ref(),
    )
    .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let mut stats = source.stats();
    stats.failed_products = index.unavailable_products();
    let summary = summarize(&results, input.skipped, &source_file, run.started, stats);

    write_reports(&results, &summary, out_dir, &run.timestamp)
        .with_context(|| format!("Failed to write reports for {source_file}"))?;

    terminal::render(&results, &summary, run.cli.verbose, run.cli.quiet);
    Ok(summary)
}
