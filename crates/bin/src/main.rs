//! subsidia CLI binary.
//!
//! Extracts Exhibit 21 subsidiary lists from SEC EDGAR, one sheet per year.

mod pipeline;

use clap::{Parser, Subcommand};
use pipeline::{ExtractConfig, extract_with_progress, save, year_progress};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use subsidia::edgar::{FilingIndexClient, IdentifierResolver};
use subsidia::{FetcherConfig, RunContext};
use subsidia_edgar::config::USER_AGENT_ENV;
use subsidia_output::ExportFormat;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "subsidia")]
#[command(about = "Subsidiary lists (Exhibit 21) from SEC annual filings", long_about = None)]
#[command(version)]
struct Cli {
    /// Identification sent with every request, e.g. "Jane Doe jane@example.com"
    #[arg(long, global = true, env = USER_AGENT_ENV)]
    user_agent: Option<String>,

    /// Minimum spacing between requests in milliseconds
    #[arg(long, global = true, default_value = "110")]
    min_interval_ms: u64,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract subsidiaries for a range of years
    Extract {
        /// Stock symbol
        symbol: String,

        /// First year
        #[arg(long, default_value = "2018")]
        from: i32,

        /// Last year (inclusive)
        #[arg(long, default_value = "2024")]
        to: i32,

        /// Output directory
        #[arg(short, long, default_value = "subsidiaries")]
        output: PathBuf,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Stop starting new years after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// Do not draw a progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Resolve a symbol to its CIK
    Resolve {
        /// Stock symbol
        symbol: String,
    },

    /// List a company's annual filings
    Filings {
        /// Stock symbol
        symbol: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let fetcher_config = FetcherConfig {
        user_agent: cli.user_agent,
        ..FetcherConfig::default()
    }
    .min_interval(Duration::from_millis(cli.min_interval_ms));

    match cli.command {
        Commands::Extract {
            symbol,
            from,
            to,
            output,
            format,
            deadline_secs,
            no_progress,
        } => {
            let config = ExtractConfig {
                symbol,
                years: from..=to,
                output,
                format: format.parse()?,
                deadline: deadline_secs.map(Duration::from_secs),
                progress: !no_progress,
            };
            extract(fetcher_config, config).await?;
        }
        Commands::Resolve { symbol } => {
            let ctx = RunContext::new(fetcher_config)?;
            let identity = IdentifierResolver::new(&ctx).resolve(&symbol).await?;
            println!(
                "{}\t{}\t{}",
                identity.symbol, identity.stable_id, identity.display_name
            );
        }
        Commands::Filings { symbol } => {
            let ctx = RunContext::new(fetcher_config)?;
            list_filings(&ctx, &symbol).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn extract(
    fetcher_config: FetcherConfig,
    config: ExtractConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = RunContext::new(fetcher_config)?;
    let symbol = config.symbol.to_uppercase();

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("SUBSIDIARIES: {}", symbol));
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!(
        "Years: {}-{}  Output: {} ({})",
        config.years.start(),
        config.years.end(),
        config.output.display(),
        config.format.extension()
    );

    let pb = config.progress.then(|| year_progress(&config.years));
    let report = extract_with_progress(&ctx, &config, pb.as_ref()).await?;

    println!("{}", report.to_ascii_table());

    let written = save(&report, &config.output, config.format)?;
    tracing::info!(files = written.len(), output = %config.output.display(), "report written");
    match config.format {
        ExportFormat::Csv => println!(
            "Wrote {} sheets and a summary to {}",
            written.len().saturating_sub(1),
            sheet_dir(&written).unwrap_or(&config.output).display()
        ),
        ExportFormat::Json => {
            for path in &written {
                println!("Wrote {}", path.display());
            }
        }
    }

    let stats = ctx.stats();
    println!("Requests: {} ({} retries)", stats.requests, stats.retries);
    Ok(())
}

/// Directory the CSV sheets landed in; the symbol is sanitized on the way to disk.
fn sheet_dir(written: &[PathBuf]) -> Option<&Path> {
    written.first().and_then(|path| path.parent())
}

async fn list_filings(ctx: &RunContext, symbol: &str) -> Result<(), Box<dyn std::error::Error>> {
    let identity = IdentifierResolver::new(ctx).resolve(symbol).await?;
    let filings = FilingIndexClient::new(ctx)
        .annual_filings(&identity.stable_id)
        .await?;

    println!(
        "{} ({}, CIK {})",
        identity.display_name, identity.symbol, identity.stable_id
    );
    println!("{:<22} {:<8} {:<12} {:<12}", "Accession", "Form", "Filed", "Period");
    println!("{}", "-".repeat(58));
    for filing in &filings {
        println!(
            "{:<22} {:<8} {:<12} {:<12}",
            filing.accession_number,
            filing.form,
            filing.filing_date,
            filing
                .report_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!("{} annual filings", filings.len());
    Ok(())
}
