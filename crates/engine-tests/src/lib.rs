#![allow(dead_code)]

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
use std::sync::{
    Mutex,
    atomic::{AtomicU32, Ordering},
};

pub mod integration;
pub mod utils;

pub const SPREADSHEET_ID: &str = "1FakeSpreadsheet-Id_";

/// One tab of the fake spreadsheet.
#[derive(Debug, Clone)]
struct Tab {
    id: i64,
    name: String,
    rows: Vec<Vec<Value>>,
}

/// In-memory spreadsheet speaking the connector's slice of the Sheets API.
///
/// Reads address tabs by id, appends and updates address them by name, as
/// the real service does. Rate limiting can be injected per direction.
#[derive(Debug, Default)]
pub struct FakeSheet {
    tabs: Mutex<Vec<Tab>>,
    read_limits: AtomicU32,
    write_limits: AtomicU32,
    read_calls: AtomicU32,
    write_calls: AtomicU32,
}

impl FakeSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(self, id: i64, name: &str, rows: Vec<Vec<Value>>) -> Self {
        self.tabs.lock().unwrap().push(Tab {
            id,
            name: name.to_string(),
            rows,
        });
        self
    }

    pub fn rows(&self, name: &str) -> Vec<Vec<Value>> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|tab| tab.name == name)
            .map(|tab| tab.rows.clone())
            .unwrap_or_default()
    }

    /// Appends rows directly, as a user editing the sheet would.
    pub fn push_rows(&self, name: &str, rows: Vec<Vec<Value>>) {
        let mut tabs = self.tabs.lock().unwrap();
        if let Some(tab) = tabs.iter_mut().find(|tab| tab.name == name) {
            tab.rows.extend(rows);
        }
    }

    /// The next `count` reads answer with HTTP 429.
    pub fn rate_limit_reads(&self, count: u32) {
        self.read_limits.store(count, Ordering::SeqCst);
    }

    /// The next `count` writes answer with HTTP 429.
    pub fn rate_limit_writes(&self, count: u32) {
        self.write_limits.store(count, Ordering::SeqCst);
    }

    pub fn read_calls(&self) -> u32 {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> u32 {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn check_spreadsheet(spreadsheet_id: &str) -> Result<(), SheetsError> {
        if spreadsheet_id == SPREADSHEET_ID {
            return Ok(());
        }
        Err(SheetsError::Api {
            status: 404,
            message: format!("Requested entity was not found: {spreadsheet_id}"),
        })
    }

    fn take_limit(counter: &AtomicU32) -> Result<(), SheetsError> {
        let limited = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if limited {
            return Err(SheetsError::RateLimited {
                message: "Quota exceeded for quota metric 'Requests per minute per user'".to_string(),
            });
        }
        Ok(())
    }
}

/// Splits `Name!A5:C5` into the tab name and the 1-based start row.
fn parse_a1(range: &str) -> (&str, Option<usize>) {
    let Some((name, cells)) = range.split_once('!') else {
        return (range, None);
    };
    let start = cells.split(':').next().unwrap_or_default();
    let row = start
        .trim_start_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok();
    (name, row)
}

fn unknown_tab(range: &str) -> SheetsError {
    SheetsError::Api {
        status: 400,
        message: format!("Unable to parse range: {range}"),
    }
}

#[async_trait]
impl SheetsApi for FakeSheet {
    async fn batch_get_by_data_filter(
        &self,
        spreadsheet_id: &str,
        request: &BatchGetValuesByDataFilterRequest,
    ) -> Result<BatchGetValuesByDataFilterResponse, SheetsError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        Self::check_spreadsheet(spreadsheet_id)?;
        Self::take_limit(&self.read_limits)?;

        let tabs = self.tabs.lock().unwrap();
        let mut value_ranges = Vec::new();
        for filter in &request.data_filters {
            let Some(grid) = &filter.grid_range else {
                continue;
            };
            let Some(tab) = tabs.iter().find(|tab| Some(tab.id) == grid.sheet_id) else {
                continue;
            };

            let start = grid.start_row_index.unwrap_or_default() as usize;
            let rows: Vec<Vec<Value>> = tab.rows.iter().skip(start).cloned().collect();
            let range = format!("{}!A{}:Z{}", tab.name, start + 1, tab.rows.len().max(start + 1));
            value_ranges.push(MatchedValueRange {
                value_range: Some(ValueRange::rows(range, rows)),
                data_filters: vec![filter.clone()],
            });
        }

        Ok(BatchGetValuesByDataFilterResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            value_ranges,
        })
    }

    async fn append(
        &self,
        spreadsheet_id: &str,
        request: &AppendRequest,
    ) -> Result<AppendValuesResponse, SheetsError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Self::check_spreadsheet(spreadsheet_id)?;
        Self::take_limit(&self.write_limits)?;

        let (name, _) = parse_a1(&request.range);
        let mut tabs = self.tabs.lock().unwrap();
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.name == name)
            .ok_or_else(|| unknown_tab(&request.range))?;

        let first = tab.rows.len() + 1;
        tab.rows.extend(request.body.values.iter().cloned());
        let count = request.body.values.len() as u64;

        Ok(AppendValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            table_range: Some(format!("{name}!A1:Z{}", first - 1)),
            updates: Some(UpdateValuesResponse {
                spreadsheet_id: Some(spreadsheet_id.to_string()),
                updated_range: Some(format!("{name}!A{first}:Z{}", tab.rows.len())),
                updated_rows: Some(count),
                ..Default::default()
            }),
        })
    }

    async fn update(
        &self,
        spreadsheet_id: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        Self::check_spreadsheet(spreadsheet_id)?;
        Self::take_limit(&self.write_limits)?;

        let (name, row) = parse_a1(&request.range);
        let row = row.filter(|row| *row > 0).ok_or_else(|| unknown_tab(&request.range))?;
        let mut tabs = self.tabs.lock().unwrap();
        let tab = tabs
            .iter_mut()
            .find(|tab| tab.name == name)
            .ok_or_else(|| unknown_tab(&request.range))?;

        for (i, values) in request.body.values.iter().enumerate() {
            let index = row - 1 + i;
            if tab.rows.len() <= index {
                tab.rows.resize(index + 1, Vec::new());
            }
            tab.rows[index] = values.clone();
        }

        Ok(UpdateValuesResponse {
            spreadsheet_id: Some(spreadsheet_id.to_string()),
            updated_range: Some(request.range.clone()),
            updated_rows: Some(request.body.values.len() as u64),
            ..Default::default()
        })
    }
}
