use crate::{
    consumer::components::writer::SheetWriterArgs,
    retry::{classify_sheets_error, into_sheets_error},
};
use connectors::{
    error::SheetsError,
    sheets::{
        api::SheetsApi,
        types::{UpdateRequest, UpdateValuesResponse, ValueRange},
    },
};
use engine_core::{
    metrics::Metrics,
    retry::{LinearBackoff, RetryPolicy},
};
use model::records::record::Record;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Overwrites an explicit A1 range with a single record's row.
pub struct RecordUpdater {
    api: Arc<dyn SheetsApi>,
    args: SheetWriterArgs,
    retry: RetryPolicy,
    retry_count: u64,
    metrics: Metrics,
}

impl RecordUpdater {
    pub fn new(api: Arc<dyn SheetsApi>, args: SheetWriterArgs, metrics: Metrics) -> Self {
        Self {
            api,
            retry: RetryPolicy::new(args.max_retries, LinearBackoff::new(args.retry_unit)),
            args,
            retry_count: 0,
            metrics,
        }
    }

    pub async fn update(
        &mut self,
        range: &str,
        record: &Record,
        cancel: &CancellationToken,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let row = record
            .row()
            .map_err(|source| SheetsError::InvalidPayload { index: 0, source })?;

        let request = UpdateRequest {
            range: range.to_string(),
            value_input_option: self.args.value_input_option,
            body: ValueRange::rows(range, vec![row]),
        };

        let api = &self.api;
        let spreadsheet_id = self.args.spreadsheet_id.as_str();
        let request = &request;

        let response = self
            .retry
            .run(
                &mut self.retry_count,
                || async move { api.update(spreadsheet_id, request).await },
                classify_sheets_error,
                cancel,
            )
            .await
            .map_err(into_sheets_error)?;

        self.metrics.increment_rows_written(1);
        debug!(range, key = %record.key, "Updated sheet range");
        Ok(response)
    }
}
