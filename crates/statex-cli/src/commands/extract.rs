//! Extract command - pull transactions out of a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use statex_core::convert::{format_amount, NumberFormat, DEFAULT_SCALE};
use statex_core::models::config::{ExtractionConfig, StatexConfig};
use statex_core::{load_text, CsvExporter, ExtractionResult, ExtractorRegistry};

use super::config::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (.txt or .pdf)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Only run the extractor with this label
    #[arg(short, long)]
    extractor: Option<String>,

    /// Print block counts and warnings to stderr
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if let Some(label) = &args.extractor {
        config.extraction.enabled_extractors = vec![label.clone()];
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let registry = ExtractorRegistry::with_builtin()?;
    check_extractor(&registry, &config.extraction)?;

    let text = load_text(&args.input, &config.input)?;
    let results = registry.extract_with(&text, &config.extraction);

    let output = if results.is_empty() {
        info!("No extractor accepted {}", args.input.display());
        String::new()
    } else {
        format_results(&results, args.format, &config)?
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        print!("{}", output);
    }

    if args.stats {
        for result in &results {
            eprintln!(
                "{} {}: {} items, {}/{} blocks failed, {}ms",
                style("ℹ").blue(),
                result.extractor,
                result.items.len(),
                result.blocks_failed,
                result.blocks_total,
                result.processing_time_ms
            );
            for warning in &result.warnings {
                eprintln!("  - {}", warning);
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Fail early when every requested extractor label is unknown.
pub fn check_extractor(registry: &ExtractorRegistry, config: &ExtractionConfig) -> anyhow::Result<()> {
    let labels = registry.labels();
    if !config.enabled_extractors.is_empty() && !labels.iter().any(|l| config.is_enabled(l)) {
        anyhow::bail!(
            "Unknown extractor: {} (available: {})",
            config.enabled_extractors.join(", "),
            labels.join(", ")
        );
    }
    Ok(())
}

pub fn format_results(
    results: &[ExtractionResult],
    format: OutputFormat,
    config: &StatexConfig,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let items: Vec<_> = results.iter().flat_map(|r| &r.items).collect();
            Ok(format!("{}\n", serde_json::to_string_pretty(&items)?))
        }
        OutputFormat::Csv => format_csv(results, config),
        OutputFormat::Text => Ok(format_text(results)),
    }
}

fn format_csv(results: &[ExtractionResult], config: &StatexConfig) -> anyhow::Result<String> {
    let transactions = results
        .iter()
        .flat_map(|r| &r.items)
        .filter_map(|item| item.transaction());

    let mut buffer = Vec::new();
    CsvExporter::from_config(&config.export).write(&mut buffer, transactions)?;

    Ok(String::from_utf8(buffer)?)
}

fn format_text(results: &[ExtractionResult]) -> String {
    let mut output = String::new();

    for result in results {
        output.push_str(&format!("{} ({} items)\n", result.extractor, result.items.len()));

        for t in result.items.iter().filter_map(|item| item.transaction()) {
            let date = t.date.map(|d| d.to_string()).unwrap_or_else(|| "----------".to_string());
            output.push_str(&format!(
                "  {}  {:<16} {:>14} {}  {}\n",
                date,
                t.kind.as_str(),
                format_amount(t.amount, NumberFormat::ENGLISH, DEFAULT_SCALE),
                t.currency,
                t.note.as_deref().unwrap_or("")
            ));
        }
    }

    output
}
