use crate::settings::{
    common::{KEY_CREDENTIALS_FILE, KEY_SHEETS_URL, KEY_TOKENS_FILE},
    destination::{
        DEFAULT_MAX_RETRIES, KEY_BUFFER_SIZE, KEY_MAX_RETRIES, KEY_SHEET_NAME,
        KEY_VALUE_INPUT_OPTION, MAX_BUFFER_SIZE,
    },
    source::{KEY_DATE_TIME_RENDER_OPTION, KEY_POLLING_PERIOD, KEY_VALUE_RENDER_OPTION},
};
use connectors::sheets::options::{DateTimeRenderOption, ValueInputOption, ValueRenderOption};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub default: String,
    pub required: bool,
    pub description: String,
}

impl Parameter {
    fn required(description: &str) -> Self {
        Parameter {
            default: String::new(),
            required: true,
            description: description.to_string(),
        }
    }

    fn optional(default: impl ToString, description: &str) -> Self {
        Parameter {
            default: default.to_string(),
            required: false,
            description: description.to_string(),
        }
    }
}

/// Plugin metadata describing the connector and its configuration keys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    pub name: String,
    pub summary: String,
    pub description: String,
    pub version: String,
    pub author: String,
    pub source_params: BTreeMap<String, Parameter>,
    pub destination_params: BTreeMap<String, Parameter>,
}

fn common_params() -> BTreeMap<String, Parameter> {
    BTreeMap::from([
        (
            KEY_CREDENTIALS_FILE.to_string(),
            Parameter::required("path to credentials.json file used"),
        ),
        (
            KEY_TOKENS_FILE.to_string(),
            Parameter::required(
                "path to token.json file containing a json with at least refresh_token.",
            ),
        ),
        (
            KEY_SHEETS_URL.to_string(),
            Parameter::required("Google sheet url to fetch the records from"),
        ),
    ])
}

pub fn specification() -> Specification {
    let mut source_params = common_params();
    source_params.extend([
        (
            KEY_POLLING_PERIOD.to_string(),
            Parameter::optional("6s", "Time interval for consecutive fetching data."),
        ),
        (
            KEY_DATE_TIME_RENDER_OPTION.to_string(),
            Parameter::optional(
                DateTimeRenderOption::default(),
                "Format of the Date/time related values. Valid values: SERIAL_NUMBER, FORMATTED_STRING",
            ),
        ),
        (
            KEY_VALUE_RENDER_OPTION.to_string(),
            Parameter::optional(
                ValueRenderOption::default(),
                "Format of the dynamic/reference data. Valid values: FORMATTED_VALUE, UNFORMATTED_VALUE, FORMULA",
            ),
        ),
    ]);

    let mut destination_params = common_params();
    destination_params.extend([
        (
            KEY_SHEET_NAME.to_string(),
            Parameter::required("Google sheet name to write the records to"),
        ),
        (
            KEY_VALUE_INPUT_OPTION.to_string(),
            Parameter::optional(
                ValueInputOption::default(),
                "Whether the data be inserted in USER_ENTERED mode or RAW mode",
            ),
        ),
        (
            KEY_BUFFER_SIZE.to_string(),
            Parameter::optional(
                MAX_BUFFER_SIZE,
                "Number of records buffered before they are appended, at most 100",
            ),
        ),
        (
            KEY_MAX_RETRIES.to_string(),
            Parameter::optional(
                DEFAULT_MAX_RETRIES,
                "Max API retries to be attempted, in case of 429 error, before returning error",
            ),
        ),
    ]);

    Specification {
        name: "google-sheets".to_string(),
        summary: "Google Sheets plugin".to_string(),
        description: "Reads appended rows from a Google spreadsheet as records and appends records to a sheet.".to_string(),
        version: format!("v{}", env!("CARGO_PKG_VERSION")),
        author: "sheetsync contributors".to_string(),
        source_params,
        destination_params,
    }
}
