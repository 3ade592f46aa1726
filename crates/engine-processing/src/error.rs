use connectors::error::SheetsError;
use engine_core::error::AckError;
use model::error::ModelError;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the read path. Cloneable so it can be stored as the
/// cause of a dead polling session and handed to every later caller.
#[derive(Error, Debug, Clone)]
pub enum ProducerError {
    #[error("Fetch failed at row offset {row_offset}: {source}")]
    Fetch {
        row_offset: u64,
        #[source]
        source: Arc<SheetsError>,
    },

    #[error("Invalid position: {0}")]
    Position(#[source] Arc<ModelError>),

    #[error("iterator stopped")]
    Stopped,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("The record channel was closed unexpectedly.")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum ConsumerError {
    /// The write failed permanently. Also returned for every submit that
    /// follows, until the writer is torn down.
    #[error("Failed to write records: {0}")]
    Write(#[source] Arc<SheetsError>),

    #[error("Writer is closed")]
    Closed,

    #[error("Acknowledgement failed: {0}")]
    Ack(#[from] AckError),
}

impl ConsumerError {
    pub fn sheets_error(&self) -> Option<&SheetsError> {
        match self {
            ConsumerError::Write(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
