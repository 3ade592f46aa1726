use crate::{
    env::ConfigLoader,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::sheets::{api::SheetsApi, http::HttpSheetsClient};
use engine_config::settings::{
    ConfigMap, common::CommonSettings, credentials::load_token_source,
    destination::DestinationSettings, source::SourceSettings,
};
use engine_core::{ack::Ack, metrics::Metrics};
use engine_processing::error::ProducerError;
use engine_runtime::{destination::SheetsDestination, error::ConnectorError, source::SheetsSource};
use model::records::record::Record;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod output;
mod shutdown;

/// Wait between reads while the source has nothing buffered.
const READ_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(
    name = "sheetsync",
    version,
    about = "Stream rows between Google Sheets and JSON lines"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let metrics = Metrics::new();
    let result = match cli.command {
        Commands::Read {
            config,
            position,
            limit,
        } => read(&config, position, limit, &shutdown, &metrics).await,
        Commands::Write { config } => write(&config, &shutdown, &metrics).await,
        Commands::Spec { output: path } => {
            output::write_spec(&engine_config::spec::specification(), path).await
        }
    };

    let snapshot = metrics.snapshot();
    if snapshot != Default::default() {
        eprintln!("{}", serde_json::to_string(&snapshot)?);
    }

    let signal_exit = shutdown.received_signal().map(ExitCode::from);
    let code = match result {
        Err(CliError::ShutdownRequested) => {
            info!("Exiting after shutdown request");
            signal_exit.unwrap_or(ExitCode::Interrupted)
        }
        Err(err) => {
            error!(error = %err, "Command failed");
            ExitCode::GeneralError
        }
        Ok(()) => signal_exit.unwrap_or(ExitCode::Success),
    };
    std::process::exit(code.as_i32());
}

fn load_config(path: &str) -> Result<ConfigMap, CliError> {
    let mut loader = ConfigLoader::from_environment();
    loader.load_from_file(path)?;
    let config = loader.into_config();
    debug!(path, keys = config.len(), "Loaded connector config");
    Ok(config)
}

fn sheets_api(common: &CommonSettings) -> Result<Arc<dyn SheetsApi>, CliError> {
    let tokens = load_token_source(common, reqwest::Client::new())?;
    Ok(Arc::new(HttpSheetsClient::with_defaults(tokens)?))
}

async fn read(
    config_path: &str,
    position: Option<String>,
    limit: Option<u64>,
    shutdown: &ShutdownCoordinator,
    metrics: &Metrics,
) -> Result<(), CliError> {
    let settings = SourceSettings::parse(&load_config(config_path)?)?;
    let api = sheets_api(&settings.common)?;
    let mut source = SheetsSource::new(settings, api).with_metrics(metrics.clone());
    source.open(position.unwrap_or_default().as_bytes())?;

    let cancel = shutdown.cancel_token();
    let result = tail(&source, limit, &cancel).await;
    source.teardown().await;
    result
}

async fn tail(
    source: &SheetsSource,
    limit: Option<u64>,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut delivered = 0u64;

    while limit.is_none_or(|limit| delivered < limit) {
        match source.read(cancel).await {
            Ok(record) => {
                output::emit(&record)?;
                source.ack(&record.position);
                delivered += 1;
            }
            Err(ConnectorError::BackoffRetry) => {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(CliError::ShutdownRequested),
                    _ = tokio::time::sleep(READ_BACKOFF) => {}
                }
            }
            Err(ConnectorError::Producer(ProducerError::Cancelled)) => {
                return Err(CliError::ShutdownRequested);
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(records = delivered, "Read limit reached");
    Ok(())
}

async fn write(
    config_path: &str,
    shutdown: &ShutdownCoordinator,
    metrics: &Metrics,
) -> Result<(), CliError> {
    let settings = DestinationSettings::parse(&load_config(config_path)?)?;
    let api = sheets_api(&settings.common)?;
    let mut destination = SheetsDestination::new(settings, api).with_metrics(metrics.clone());
    destination.open()?;

    let cancel = shutdown.cancel_token();
    let acked = Arc::new(AtomicU64::new(0));
    let failed = Arc::new(AtomicU64::new(0));

    let result = submit_lines(&destination, &acked, &failed, &cancel).await;
    // Flush what was accepted even when stdin was interrupted.
    let teardown = destination.teardown(&CancellationToken::new()).await;

    info!(
        acked = acked.load(Ordering::SeqCst),
        failed = failed.load(Ordering::SeqCst),
        "Write finished"
    );

    result?;
    teardown?;
    Ok(())
}

async fn submit_lines(
    destination: &SheetsDestination,
    acked: &Arc<AtomicU64>,
    failed: &Arc<AtomicU64>,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => return Err(CliError::ShutdownRequested),
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            return Ok(());
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (acked, failed) = (acked.clone(), failed.clone());
        let ack = Ack::new(move |outcome| {
            match outcome {
                Ok(()) => acked.fetch_add(1, Ordering::SeqCst),
                Err(err) => {
                    warn!(error = %err, "Row was not written");
                    failed.fetch_add(1, Ordering::SeqCst)
                }
            };
            Ok(())
        });

        destination
            .write(Record::from_payload(line.to_string()), ack, cancel)
            .await?;
    }
}
