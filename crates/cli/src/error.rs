use connectors::error::SheetsError;
use engine_config::settings::error::SettingsError;
use engine_runtime::error::ConnectorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Sheets API error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Shutdown requested")]
    ShutdownRequested,
}
