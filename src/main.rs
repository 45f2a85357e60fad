use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use slapfiliate::application::settlement::{Settlement, SettlementReport};
use slapfiliate::config::Settings;
use slapfiliate::domain::ports::{AffiliateApiBox, PayoutApiBox};
use slapfiliate::infrastructure::paypal::PaypalClient;
use slapfiliate::infrastructure::tapfiliate::TapfiliateClient;
use slapfiliate::interfaces::report::ReportWriter;
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Settle affiliate balances with a single batch payout.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dotenv file to load before reading settings. Defaults to `.env` if present.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn settle() -> Result<SettlementReport> {
    // Settings are validated before any request goes out
    let settings = Settings::from_env().into_diagnostic()?;
    info!(mode = settings.policy.mode.name(), "Configuration loaded");

    let affiliates: AffiliateApiBox = Box::new(
        TapfiliateClient::new(&settings.tapfiliate, settings.request_timeout).into_diagnostic()?,
    );
    let payouts: PayoutApiBox = Box::new(
        PaypalClient::new(&settings.paypal, settings.request_timeout).into_diagnostic()?,
    );

    Settlement::new(affiliates, payouts, settings.policy)
        .run()
        .await
        .into_diagnostic()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).into_diagnostic()?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    init_tracing(cli.log_format);

    let started = Instant::now();
    info!("Preparing to settle tapfiliate balances...");
    let outcome = settle().await;
    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Time taken to settle tapfiliate balances"
    );
    let report = outcome?;

    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());
    writer.write_report(&report).into_diagnostic()?;

    Ok(())
}
