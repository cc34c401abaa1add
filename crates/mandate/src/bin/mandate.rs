//! `mandate` command-line entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mandate::{
    AnalysisConfig, DataCache, DataFrequency, InMemoryCache, PriceField, PriceProviderRegistry,
    Symbol, render_text, run_analysis, to_json,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis pass and print the report
    Run(RunArgs),

    /// Re-run the analysis on a fixed interval, reusing cached prices
    Watch {
        #[command(flatten)]
        run: RunArgs,

        /// Seconds between passes
        #[arg(long, default_value = "300")]
        interval_secs: u64,

        /// Seconds before cached prices are fetched again
        #[arg(long, default_value = "3600")]
        cache_ttl_secs: u64,
    },

    /// List the configured periods
    Periods {
        /// TOML configuration file (defaults to the French presidential terms)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// TOML configuration file (defaults to the French presidential terms)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured symbol
    #[arg(short, long)]
    symbol: Option<Symbol>,

    /// Override the sampling interval (daily, weekly, monthly)
    #[arg(short, long)]
    frequency: Option<DataFrequency>,

    /// Override the price column (close, adjusted)
    #[arg(long)]
    price_field: Option<PriceField>,

    /// Per-request fetch timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Print the full report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(symbol) = &self.symbol {
            config = config.with_symbol(symbol.clone());
        }
        if let Some(frequency) = self.frequency {
            config = config.with_frequency(frequency);
        }
        if let Some(field) = self.price_field {
            config = config.with_price_field(field);
        }
        config.validate().context("invalid command-line overrides")?;
        Ok(config)
    }

    fn registry(&self) -> PriceProviderRegistry {
        PriceProviderRegistry::new()
            .with_yahoo()
            .set_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

async fn run_once(
    registry: &PriceProviderRegistry,
    config: &AnalysisConfig,
    json: bool,
) -> anyhow::Result<()> {
    let report = run_analysis(registry, config).await;
    if json {
        println!("{}", to_json(&report).context("failed to serialize report")?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = args.config()?;
            run_once(&args.registry(), &config, args.json).await?;
        }
        Commands::Watch {
            run,
            interval_secs,
            cache_ttl_secs,
        } => {
            let config = run.config()?;
            let cache = Arc::new(InMemoryCache::new());
            let registry = run.registry().set_cache(cache.clone());
            let ttl = Duration::from_secs(cache_ttl_secs);

            let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                ticker.tick().await;
                if let Err(e) = cache.invalidate_stale(ttl).await {
                    warn!(error = %e, "Failed to evict stale prices");
                }
                run_once(&registry, &config, run.json).await?;
                info!(next_in_secs = interval_secs, "Waiting for next pass");
            }
        }
        Commands::Periods { config } => {
            let config = load_config(config.as_deref())?;
            println!("{} ({})", config.symbol, config.frequency);
            for period in &config.periods {
                println!(
                    "  {:<24} {} .. {}  {}",
                    period.label, period.start, period.end, period.color
                );
            }
        }
    }

    Ok(())
}
