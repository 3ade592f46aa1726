use async_trait::async_trait;
use connectors::{
    error::SheetsError,
    sheets::{
        api::SheetsApi,
        types::{
            AppendRequest, AppendValuesResponse, BatchGetValuesByDataFilterRequest,
            BatchGetValuesByDataFilterResponse, MatchedValueRange, UpdateRequest,
            UpdateValuesResponse, ValueRange,
        },
    },
};
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
};

/// Scripted `SheetsApi`: replies are popped in order, requests are recorded.
/// Once the script runs out reads return nothing and writes succeed.
#[derive(Default)]
pub struct MockSheets {
    reads: Mutex<VecDeque<Result<BatchGetValuesByDataFilterResponse, SheetsError>>>,
    write_errors: Mutex<VecDeque<SheetsError>>,
    read_requests: Mutex<Vec<(String, BatchGetValuesByDataFilterRequest)>>,
    appends: Mutex<Vec<AppendRequest>>,
    updates: Mutex<Vec<UpdateRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

impl MockSheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_read(&self, reply: Result<BatchGetValuesByDataFilterResponse, SheetsError>) {
        lock(&self.reads).push_back(reply);
    }

    /// Fails the next write attempt (append or update) with `err`.
    pub fn push_write_error(&self, err: SheetsError) {
        lock(&self.write_errors).push_back(err);
    }

    pub fn rate_limit_writes(&self, times: usize) {
        for _ in 0..times {
            self.push_write_error(SheetsError::RateLimited {
                message: "Quota exceeded".into(),
            });
        }
    }

    pub fn read_requests(&self) -> Vec<(String, BatchGetValuesByDataFilterRequest)> {
        lock(&self.read_requests).clone()
    }

    /// Every append attempt, failed ones included.
    pub fn appends(&self) -> Vec<AppendRequest> {
        lock(&self.appends).clone()
    }

    pub fn updates(&self) -> Vec<UpdateRequest> {
        lock(&self.updates).clone()
    }
}

pub fn rows_response(range: &str, rows: Vec<Vec<Value>>) -> BatchGetValuesByDataFilterResponse {
    BatchGetValuesByDataFilterResponse {
        spreadsheet_id: None,
        value_ranges: vec![MatchedValueRange {
            value_range: Some(ValueRange::rows(range, rows)),
            data_filters: Vec::new(),
        }],
    }
}

#[async_trait]
impl SheetsApi for MockSheets {
    async fn batch_get_by_data_filter(
        &self,
        spreadsheet_id: &str,
        request: &BatchGetValuesByDataFilterRequest,
    ) -> Result<BatchGetValuesByDataFilterResponse, SheetsError> {
        lock(&self.read_requests).push((spreadsheet_id.to_string(), request.clone()));
        lock(&self.reads)
            .pop_front()
            .unwrap_or_else(|| Ok(BatchGetValuesByDataFilterResponse::default()))
    }

    async fn append(
        &self,
        _spreadsheet_id: &str,
        request: &AppendRequest,
    ) -> Result<AppendValuesResponse, SheetsError> {
        lock(&self.appends).push(request.clone());
        match lock(&self.write_errors).pop_front() {
            Some(err) => Err(err),
            None => Ok(AppendValuesResponse::default()),
        }
    }

    async fn update(
        &self,
        _spreadsheet_id: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        lock(&self.updates).push(request.clone());
        match lock(&self.write_errors).pop_front() {
            Some(err) => Err(err),
            None => Ok(UpdateValuesResponse::default()),
        }
    }
}
