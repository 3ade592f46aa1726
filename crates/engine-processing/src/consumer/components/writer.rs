use crate::retry::{classify_sheets_error, into_sheets_error};
use connectors::{
    error::SheetsError,
    sheets::{
        api::SheetsApi,
        options::{InsertDataOption, ValueInputOption},
        types::{AppendRequest, AppendValuesResponse, ValueRange},
    },
};
use engine_core::{
    metrics::Metrics,
    retry::{LinearBackoff, RetryPolicy},
};
use model::records::{record::Record, row::Row};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const DEFAULT_RETRY_UNIT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SheetWriterArgs {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub value_input_option: ValueInputOption,
    pub max_retries: u64,
    pub retry_unit: Duration,
}

/// Decodes record payloads into rows; a payload that is not a JSON array
/// fails the whole batch.
pub fn rows_from_records(records: &[Record]) -> Result<Vec<Row>, SheetsError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .row()
                .map_err(|source| SheetsError::InvalidPayload { index, source })
        })
        .collect()
}

/// Appends batches of records to a sheet, retrying rate-limited calls with
/// linear backoff.
pub struct SheetWriter {
    api: Arc<dyn SheetsApi>,
    args: SheetWriterArgs,
    retry: RetryPolicy,
    retry_count: u64,
    metrics: Metrics,
}

impl SheetWriter {
    pub fn new(api: Arc<dyn SheetsApi>, args: SheetWriterArgs, metrics: Metrics) -> Self {
        Self {
            api,
            retry: RetryPolicy::new(args.max_retries, LinearBackoff::new(args.retry_unit)),
            args,
            retry_count: 0,
            metrics,
        }
    }

    pub fn args(&self) -> &SheetWriterArgs {
        &self.args
    }

    pub fn retry_count(&self) -> u64 {
        self.retry_count
    }

    /// Appends every record as one row, in order, with a single API call.
    pub async fn append(
        &mut self,
        records: &[Record],
        cancel: &CancellationToken,
    ) -> Result<AppendValuesResponse, SheetsError> {
        let rows = rows_from_records(records)?;
        if rows.is_empty() {
            return Ok(AppendValuesResponse::default());
        }

        let row_count = rows.len();
        let request = AppendRequest {
            range: self.args.sheet_name.clone(),
            value_input_option: self.args.value_input_option,
            insert_data_option: InsertDataOption::InsertRows,
            body: ValueRange::rows(self.args.sheet_name.clone(), rows),
        };

        let api = &self.api;
        let metrics = &self.metrics;
        let spreadsheet_id = self.args.spreadsheet_id.as_str();
        let request = &request;

        let response = self
            .retry
            .run(
                &mut self.retry_count,
                || async move {
                    let result = api.append(spreadsheet_id, request).await;
                    if let Err(err) = &result
                        && err.is_rate_limited()
                    {
                        metrics.increment_rate_limited();
                    }
                    result
                },
                classify_sheets_error,
                cancel,
            )
            .await
            .map_err(into_sheets_error)?;

        self.metrics.increment_rows_written(row_count as u64);
        info!(
            spreadsheet_id = %self.args.spreadsheet_id,
            sheet = %self.args.sheet_name,
            rows = row_count,
            "Appended rows to sheet"
        );

        Ok(response)
    }
}
