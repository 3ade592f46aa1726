use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// The position bytes are not a valid position encoding.
    #[error("Could not parse the record position: {0}")]
    InvalidPosition(#[source] serde_json::Error),

    /// A position produced for one sheet was handed to a source reading another.
    #[error(
        "Position belongs to spreadsheet '{found_spreadsheet}' (sheet {found_sheet}), \
         expected spreadsheet '{expected_spreadsheet}' (sheet {expected_sheet})"
    )]
    PositionMismatch {
        expected_spreadsheet: String,
        expected_sheet: i64,
        found_spreadsheet: String,
        found_sheet: i64,
    },

    /// The record payload is not a JSON array of cell values.
    #[error("Invalid row payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}
