
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
use engine_config::settings::{
    ConfigMap,
    common::{KEY_CREDENTIALS_FILE, KEY_SHEETS_URL, KEY_TOKENS_FILE},
};
use serde_json::Value;
use std::sync::Mutex;

pub const SPREADSHEET_ID: &str = "1AbCdEf";
pub const SHEET_ID: i64 = 9;

pub fn config() -> ConfigMap {
    ConfigMap::from([
        (KEY_CREDENTIALS_FILE.to_string(), "credentials.json".to_string()),
        (KEY_TOKENS_FILE.to_string(), "token.json".to_string()),
        (
            KEY_SHEETS_URL.to_string(),
            format!("https://docs.google.com/spreadsheets/d/{SPREADSHEET_ID}/edit#gid={SHEET_ID}"),
        ),
    ])
}

/// Serves a fixed set of rows from any start index and records writes.
#[derive(Default)]
pub struct StubSheets {
    pub rows: Vec<Vec<Value>>,
    pub appended: Mutex<Vec<Vec<Value>>>,
    pub updated: Mutex<Vec<(String, Vec<Vec<Value>>)>>,
}

#[async_trait]
impl SheetsApi for StubSheets {
    async fn batch_get_by_data_filter(
        &self,
        _spreadsheet_id: &str,
        request: &BatchGetValuesByDataFilterRequest,
    ) -> Result<BatchGetValuesByDataFilterResponse, SheetsError> {
        let start = request.data_filters[0]
            .grid_range
            .as_ref()
            .and_then(|grid| grid.start_row_index)
            .unwrap_or_default() as usize;
        let rows = self.rows.iter().skip(start).cloned().collect();

        Ok(BatchGetValuesByDataFilterResponse {
            spreadsheet_id: Some(SPREADSHEET_ID.to_string()),
            value_ranges: vec![MatchedValueRange {
                value_range: Some(ValueRange::rows("Sheet1", rows)),
                data_filters: Vec::new(),
            }],
        })
    }

    async fn append(
        &self,
        _spreadsheet_id: &str,
        request: &AppendRequest,
    ) -> Result<AppendValuesResponse, SheetsError> {
        self.appended
            .lock()
            .unwrap()
            .extend(request.body.values.iter().cloned());
        Ok(AppendValuesResponse::default())
    }

    async fn update(
        &self,
        _spreadsheet_id: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        self.updated
            .lock()
            .unwrap()
            .push((request.range.clone(), request.body.values.clone()));
        Ok(UpdateValuesResponse::default())
    }
}
