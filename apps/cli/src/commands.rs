//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use courtline_core::pipeline::EnrichProgress;
use courtline_fetcher::TimelineFetcher;
use courtline_ledger::Ledger;
use courtline_shared::{CaseId, CheckpointStatus, EnrichConfig, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Courtline — enrich scraped court decisions with infosoud timelines.
#[derive(Parser)]
#[command(
    name = "courtline",
    version,
    about = "Augment Czech court-decision datasets with case timelines and parsed legal references.",
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
    /// Run the timeline-enrichment pass over a Stage-1 data directory.
    Enrich {
        /// Directory containing Stage-1 page*.json files.
        #[arg(long)]
        data_dir: Option<String>,

        /// Path to the checkpoint ledger database.
        #[arg(long)]
        ledger: Option<String>,

        /// Path for the augmented JSON Lines output.
        #[arg(short, long)]
        out: Option<String>,

        /// Total fetch attempts allowed per case, across runs.
        #[arg(long)]
        retry_budget: Option<u32>,
    },

    /// Parse one legal citation string and print the structured result.
    #[command(name = "parse-ref")]
    ParseRef {
        /// Citation string, e.g. "§ 142 odst. 1 zákona č. 99/1963 Sb.".
        reference: String,
    },

    /// Show checkpoint ledger status counts.
    Status {
        /// Path to the checkpoint ledger database.
        #[arg(long)]
        ledger: Option<String>,
    },

    /// Initialize the config file with defaults.
    Init,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "courtline=info",
        1 => "courtline=debug",
        _ => "courtline=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich {
            data_dir,
            ledger,
            out,
            retry_budget,
        } => {
            cmd_enrich(
                data_dir.as_deref(),
                ledger.as_deref(),
                out.as_deref(),
                retry_budget,
            )
            .await
        }
        Command::ParseRef { reference } => cmd_parse_ref(&reference),
        Command::Status { ledger } => cmd_status(ledger.as_deref()).await,
        Command::Init => cmd_init(),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_enrich(
    data_dir: Option<&str>,
    ledger_path: Option<&str>,
    out: Option<&str>,
    retry_budget: Option<u32>,
) -> Result<()> {
    let config = load_config()?;

    let data_dir = PathBuf::from(data_dir.unwrap_or(&config.defaults.data_dir));
    let ledger_path = PathBuf::from(ledger_path.unwrap_or(&config.defaults.ledger_path));
    let out = PathBuf::from(out.unwrap_or(&config.defaults.output_path));

    let mut enrich_config = EnrichConfig::from(&config);
    if let Some(budget) = retry_budget {
        enrich_config.retry_budget = budget;
    }

    info!(
        data_dir = %data_dir.display(),
        ledger = %ledger_path.display(),
        out = %out.display(),
        retry_budget = enrich_config.retry_budget,
        "starting enrichment"
    );

    let raws = courtline_core::load_decisions(&data_dir)?;
    let records = courtline_core::identify_decisions(raws, &enrich_config.base_url);
    let ledger = Ledger::open(&ledger_path).await?;
    let fetcher = TimelineFetcher::new(&enrich_config)?;

    let reporter = CliProgress::new();
    let outcome =
        courtline_core::enrich(&enrich_config, records, &ledger, &fetcher, &reporter).await?;
    reporter.finish();

    courtline_core::write_dataset(&out, &outcome.rows)?;

    println!();
    println!("  Enrichment finished.");
    println!("  Cases:   {}", outcome.rows.len());
    println!("  Done:    {}", outcome.done);
    println!("  Failed:  {}", outcome.failed);
    println!("  Skipped: {}", outcome.skipped);
    println!("  Output:  {}", out.display());
    println!("  Time:    {:.1}s", outcome.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_parse_ref(reference: &str) -> Result<()> {
    let parsed = courtline_refparse::parse(reference);
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}

async fn cmd_status(ledger_path: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let ledger_path = PathBuf::from(ledger_path.unwrap_or(&config.defaults.ledger_path));

    let ledger = Ledger::open(&ledger_path).await?;
    let summary = ledger.summary().await?;

    println!();
    println!("  Ledger: {}", ledger_path.display());
    println!("  Done:             {}", summary.done);
    println!("  Failed-exhausted: {}", summary.failed_exhausted);
    println!("  Pending:          {}", summary.pending);
    println!();

    Ok(())
}

fn cmd_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Progress bar over the pending cases of the current run.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EnrichProgress for CliProgress {
    fn case_started(&self, case_id: &CaseId, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64 - 1);
        self.bar.set_message(format!("Fetching {case_id}"));
    }

    fn case_finished(&self, _case_id: &CaseId, status: CheckpointStatus) {
        self.bar.inc(1);
        self.bar.set_message(format!("Last case: {status}"));
    }
}
