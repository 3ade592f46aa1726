use connectors::error::SheetsError;
use engine_config::settings::error::SettingsError;
use engine_processing::error::{ConsumerError, ProducerError};
use model::error::ModelError;
use thiserror::Error;

/// Errors returned by the source and destination lifecycles.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// No record is ready yet; the caller should retry later.
    #[error("No record available, backoff and retry")]
    BackoffRetry,

    #[error("Connector is not open")]
    NotOpen,

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Invalid position: {0}")]
    Position(#[from] ModelError),

    #[error("Read failed: {0}")]
    Producer(#[from] ProducerError),

    #[error("Write failed: {0}")]
    Consumer(#[from] ConsumerError),

    #[error("Sheets API error: {0}")]
    Sheets(#[from] SheetsError),
}

impl ConnectorError {
    pub fn is_backoff(&self) -> bool {
        matches!(self, ConnectorError::BackoffRetry)
    }
}
