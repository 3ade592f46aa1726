use crate::error::ModelError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Resumption token for a sheet read.
///
/// `row_offset` is the 1-based index of the last row delivered, which is also
/// the 0-based index of the next row to request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetPosition {
    pub row_offset: u64,

    #[serde(default)]
    pub spreadsheet_id: String,

    #[serde(default)]
    pub sheet_id: i64,
}

impl SheetPosition {
    pub fn new(row_offset: u64, spreadsheet_id: impl Into<String>, sheet_id: i64) -> Self {
        SheetPosition {
            row_offset,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_id,
        }
    }

    /// Decodes a position. Empty input means "start from the beginning" and
    /// yields the zero position.
    pub fn parse(bytes: &[u8]) -> Result<Self, ModelError> {
        if bytes.is_empty() {
            return Ok(SheetPosition::default());
        }

        serde_json::from_slice(bytes).map_err(ModelError::InvalidPosition)
    }

    /// Encodes the position. Never fails: an encoding failure yields empty
    /// bytes, which every reader treats as "no position".
    pub fn to_bytes(&self) -> Bytes {
        serde_json::to_vec(self)
            .map(Bytes::from)
            .unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        *self == SheetPosition::default()
    }

    /// Checks that this position was produced for the given sheet.
    ///
    /// Positions without identifiers (fresh starts and tokens that only carry
    /// `row_offset`) are accepted for any sheet.
    pub fn validate_for(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<(), ModelError> {
        if self.spreadsheet_id.is_empty() {
            return Ok(());
        }

        if self.spreadsheet_id == spreadsheet_id && self.sheet_id == sheet_id {
            return Ok(());
        }

        Err(ModelError::PositionMismatch {
            expected_spreadsheet: spreadsheet_id.to_string(),
            expected_sheet: sheet_id,
            found_spreadsheet: self.spreadsheet_id.clone(),
            found_sheet: self.sheet_id,
        })
    }
}
