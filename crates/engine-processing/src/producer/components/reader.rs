use chrono::Utc;
use connectors::{
    error::SheetsError,
    sheets::{
        api::SheetsApi,
        options::{DateTimeRenderOption, MajorDimension, ValueRenderOption},
        types::{BatchGetValuesByDataFilterRequest, BatchGetValuesByDataFilterResponse, DataFilter},
    },
};
use engine_core::{metrics::Metrics, retry::LinearBackoff};
use model::{
    pagination::position::SheetPosition,
    records::{
        record::{Metadata, Record},
        row::encode_row,
    },
};
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, error};

pub const METADATA_SPREADSHEET_ID: &str = "sheets.spreadsheetId";
pub const METADATA_SHEET_ID: &str = "sheets.sheetId";
pub const METADATA_RANGE: &str = "sheets.range";

#[derive(Debug, Clone)]
pub struct BatchReaderArgs {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
    pub date_time_render_option: DateTimeRenderOption,
    pub value_render_option: ValueRenderOption,
    pub polling_period: Duration,
}

/// Fetches the rows appended to a sheet since a given offset.
///
/// Rate limiting is absorbed here: a 429 yields an empty batch and pushes the
/// next allowed fetch out by `retry_count * polling_period`.
pub struct BatchReader {
    api: Arc<dyn SheetsApi>,
    args: BatchReaderArgs,
    backoff: LinearBackoff,
    retry_count: u64,
    next_run: Option<Instant>,
    metrics: Metrics,
}

impl BatchReader {
    pub fn new(api: Arc<dyn SheetsApi>, args: BatchReaderArgs, metrics: Metrics) -> Self {
        Self {
            api,
            backoff: LinearBackoff::new(args.polling_period),
            args,
            retry_count: 0,
            next_run: None,
            metrics,
        }
    }

    pub fn args(&self) -> &BatchReaderArgs {
        &self.args
    }

    pub fn retry_count(&self) -> u64 {
        self.retry_count
    }

    pub fn next_run(&self) -> Option<Instant> {
        self.next_run
    }

    /// Fetches every row at or after the 0-based `offset`.
    pub async fn fetch(&mut self, offset: u64) -> Result<Vec<Record>, SheetsError> {
        if let Some(next_run) = self.next_run
            && Instant::now() < next_run
        {
            return Ok(Vec::new());
        }

        let request = BatchGetValuesByDataFilterRequest {
            data_filters: vec![DataFilter::rows_from(self.args.sheet_id, offset)],
            major_dimension: MajorDimension::Rows,
            value_render_option: self.args.value_render_option,
            date_time_render_option: self.args.date_time_render_option,
        };

        let response = match self
            .api
            .batch_get_by_data_filter(&self.args.spreadsheet_id, &request)
            .await
        {
            Ok(response) => response,
            Err(SheetsError::NotModified) => {
                debug!(row_offset = offset, "Sheet not modified");
                return Ok(Vec::new());
            }
            Err(SheetsError::RateLimited { message }) => {
                self.backoff_after_rate_limit(&message);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        self.retry_count = 0;
        self.next_run = None;

        let records = self.to_records(offset, response)?;
        if !records.is_empty() {
            self.metrics.increment_records_read(records.len() as u64);
            debug!(
                rows = records.len(),
                row_offset = offset,
                "Fetched batch from sheet"
            );
        }

        Ok(records)
    }

    fn backoff_after_rate_limit(&mut self, message: &str) {
        self.retry_count += 1;
        let wait = self.backoff.delay(self.retry_count);
        self.next_run = Some(Instant::now() + wait);
        self.metrics.increment_rate_limited();

        error!(
            retry_count = self.retry_count,
            wait_duration = ?wait,
            error = message,
            "Rate limit exceeded, delaying next fetch"
        );
    }

    /// Converts the response into records. The row index runs across every
    /// returned range; empty rows are skipped but still count.
    fn to_records(
        &self,
        offset: u64,
        response: BatchGetValuesByDataFilterResponse,
    ) -> Result<Vec<Record>, SheetsError> {
        let fetched_at = Utc::now();
        let mut records = Vec::new();
        let mut index = 0u64;

        for matched in response.value_ranges {
            let Some(range) = matched.value_range else {
                continue;
            };
            let a1_range = range.range.unwrap_or_default();

            for row in range.values {
                index += 1;
                if row.is_empty() {
                    continue;
                }

                let row_offset = offset + index;
                let position =
                    SheetPosition::new(row_offset, &self.args.spreadsheet_id, self.args.sheet_id);

                let mut record =
                    Record::new(position.to_bytes(), row_offset.to_string(), encode_row(&row)?)
                        .with_metadata(self.metadata(&a1_range));
                record.created_at = fetched_at;
                records.push(record);
            }
        }

        Ok(records)
    }

    fn metadata(&self, a1_range: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert(
            METADATA_SPREADSHEET_ID.to_string(),
            self.args.spreadsheet_id.clone(),
        );
        metadata.insert(METADATA_SHEET_ID.to_string(), self.args.sheet_id.to_string());
        metadata.insert(METADATA_RANGE.to_string(), a1_range.to_string());
        metadata
    }
}
