//! Extractors command - list the built-in issuer definitions.

use clap::Args;
use console::style;

use statex_core::ExtractorRegistry;

use super::config::load_config;

/// Arguments for the extractors command.
#[derive(Args)]
pub struct ExtractorsArgs {
    /// Print labels only, one per line
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: ExtractorsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let registry = ExtractorRegistry::with_builtin()?;

    for label in registry.labels() {
        if args.quiet {
            println!("{}", label);
        } else if config.is_enabled(label) {
            println!("{} {}", style("✓").green(), label);
        } else {
            println!("{} {} {}", style("-").dim(), label, style("(disabled)").dim());
        }
    }

    Ok(())
}
