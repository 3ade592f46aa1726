//! Wire types for the Sheets v4 `spreadsheets.values` endpoints.

use crate::sheets::options::{
    DateTimeRenderOption, InsertDataOption, MajorDimension, ValueInputOption, ValueRenderOption,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_row_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_row_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column_index: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_range: Option<GridRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a1_range: Option<String>,
}

impl DataFilter {
    /// Every row of `sheet_id` starting at the 0-based `start_row_index`.
    pub fn rows_from(sheet_id: i64, start_row_index: u64) -> Self {
        DataFilter {
            grid_range: Some(GridRange {
                sheet_id: Some(sheet_id),
                start_row_index: Some(start_row_index),
                ..Default::default()
            }),
            a1_range: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesByDataFilterRequest {
    pub data_filters: Vec<DataFilter>,
    pub major_dimension: MajorDimension,
    pub value_render_option: ValueRenderOption,
    pub date_time_render_option: DateTimeRenderOption,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<MajorDimension>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn rows(range: impl Into<String>, values: Vec<Vec<Value>>) -> Self {
        ValueRange {
            range: Some(range.into()),
            major_dimension: Some(MajorDimension::Rows),
            values,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedValueRange {
    #[serde(default)]
    pub value_range: Option<ValueRange>,
    #[serde(default)]
    pub data_filters: Vec<DataFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetValuesByDataFilterResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub value_ranges: Vec<MatchedValueRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u64>,
    #[serde(default)]
    pub updated_columns: Option<u64>,
    #[serde(default)]
    pub updated_cells: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendValuesResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    #[serde(default)]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<UpdateValuesResponse>,
}

/// `values.append` call: the body is appended after the table found in `range`.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendRequest {
    pub range: String,
    pub value_input_option: ValueInputOption,
    pub insert_data_option: InsertDataOption,
    pub body: ValueRange,
}

/// `values.update` call: the body overwrites `range`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub range: String,
    pub value_input_option: ValueInputOption,
    pub body: ValueRange,
}

/// Error envelope returned by Google APIs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
