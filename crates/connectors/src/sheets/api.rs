use crate::{
    error::SheetsError,
    sheets::types::{
        AppendRequest, AppendValuesResponse, BatchGetValuesByDataFilterRequest,
        BatchGetValuesByDataFilterResponse, UpdateRequest, UpdateValuesResponse,
    },
};
use async_trait::async_trait;

/// The slice of the Sheets API used by the connector.
///
/// Implementations map HTTP 429 to [`SheetsError::RateLimited`] and HTTP 304
/// to [`SheetsError::NotModified`]; the reader and writer rely on both.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// `spreadsheets.values.batchGetByDataFilter`
    async fn batch_get_by_data_filter(
        &self,
        spreadsheet_id: &str,
        request: &BatchGetValuesByDataFilterRequest,
    ) -> Result<BatchGetValuesByDataFilterResponse, SheetsError>;

    /// `spreadsheets.values.append`
    async fn append(
        &self,
        spreadsheet_id: &str,
        request: &AppendRequest,
    ) -> Result<AppendValuesResponse, SheetsError>;

    /// `spreadsheets.values.update`
    async fn update(
        &self,
        spreadsheet_id: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateValuesResponse, SheetsError>;
}
