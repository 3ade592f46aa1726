use crate::{
    error::ModelError,
    pagination::position::SheetPosition,
    records::row::{Row, decode_row},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Metadata = BTreeMap<String, String>;

/// A single change flowing through the connector.
///
/// Records produced by the read path carry an encoded [`SheetPosition`];
/// records handed to the write path only need a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub position: Bytes,
    pub key: String,
    pub payload: Bytes,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<Metadata>,
}

impl Record {
    pub fn new(position: Bytes, key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Record {
            position,
            key: key.into(),
            payload: payload.into(),
            created_at: Utc::now(),
            metadata: None,
        }
    }

    /// Builds an outbound record that only carries a payload.
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        Self::new(Bytes::new(), "", payload)
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn has_payload(&self) -> bool {
        !self.payload.is_empty()
    }

    /// Decodes the payload as a row of cell values.
    pub fn row(&self) -> Result<Row, ModelError> {
        decode_row(&self.payload)
    }

    pub fn sheet_position(&self) -> Result<SheetPosition, ModelError> {
        SheetPosition::parse(&self.position)
    }
}
