//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use statex_core::models::config::StatexConfig;
use statex_core::{load_text, ExtractionResult, ExtractorRegistry, InputKind};

use super::config::load_config;
use super::extract::{check_extractor, format_results, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Only run the extractor with this label
    #[arg(short, long)]
    extractor: Option<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    results: Vec<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        if self.error.is_some() {
            "error"
        } else if self.results.is_empty() {
            "no_match"
        } else {
            "success"
        }
    }

    fn item_count(&self) -> usize {
        self.results.iter().map(|r| r.items.len()).sum()
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(label) = &args.extractor {
        config.extraction.enabled_extractors = vec![label.clone()];
    }

    let registry = ExtractorRegistry::with_builtin()?;
    check_extractor(&registry, &config.extraction)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| InputKind::from_path(p).is_some())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    // Documents share nothing but the read-only registry.
    let registry = Arc::new(registry);
    let config = Arc::new(config);
    let permits = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let registry = Arc::clone(&registry);
        let config = Arc::clone(&config);
        let permits = Arc::clone(&permits);
        let pb = overall_pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let outcome = process_single_file(&path, &registry, &config);
                (path, outcome, file_start.elapsed().as_millis() as u64)
            })
            .await?;
            pb.inc(1);
            anyhow::Ok(result)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (path, outcome, processing_time_ms) = handle.await??;

        match outcome {
            Ok(extracted) => results.push(ProcessResult {
                path,
                results: extracted,
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        results: Vec::new(),
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    overall_pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for result in results.iter().filter(|r| !r.results.is_empty()) {
            // Keep the input extension so `a.txt` and `a.pdf` do not collide.
            let output_name = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("statement");

            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            fs::write(&output_path, format_results(&result.results, args.format, &config)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!("{} Summary written to {}", style("✓").green(), summary_path.display());
    }

    let successful = results.iter().filter(|r| r.status() == "success").count();
    let unmatched = results.iter().filter(|r| r.status() == "no_match").count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} not recognized, {} failed",
        style(successful).green(),
        style(unmatched).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    registry: &ExtractorRegistry,
    config: &StatexConfig,
) -> anyhow::Result<Vec<ExtractionResult>> {
    let text = load_text(path, &config.input)?;
    Ok(registry.extract_with(&text, &config.extraction))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "extractors",
        "items",
        "blocks_total",
        "blocks_failed",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let extractors: Vec<&str> = result.results.iter().map(|r| r.extractor.as_str()).collect();
        let blocks_total: usize = result.results.iter().map(|r| r.blocks_total).sum();
        let blocks_failed: usize = result.results.iter().map(|r| r.blocks_failed).sum();

        wtr.write_record([
            filename,
            result.status(),
            &extractors.join("|"),
            &result.item_count().to_string(),
            &blocks_total.to_string(),
            &blocks_failed.to_string(),
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
