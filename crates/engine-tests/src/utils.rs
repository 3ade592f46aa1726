use crate::{FakeSheet, SPREADSHEET_ID};
use engine_config::settings::{
    ConfigMap,
    common::{KEY_CREDENTIALS_FILE, KEY_SHEETS_URL, KEY_TOKENS_FILE},
    destination::{KEY_BUFFER_SIZE, KEY_MAX_RETRIES, KEY_SHEET_NAME},
    source::KEY_POLLING_PERIOD,
};
use engine_runtime::{destination::SheetsDestination, source::SheetsSource};
use model::records::record::Record;
use serde_json::{Value, json};
use std::{io::Write, sync::Arc, time::Duration};
use tempfile::NamedTempFile;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

pub const ORDERS_TAB_ID: i64 = 0;
pub const ORDERS_TAB: &str = "Orders";
pub const ARCHIVE_TAB_ID: i64 = 1_804_112;
pub const ARCHIVE_TAB: &str = "Archive";

pub const POLL: Duration = Duration::from_secs(1);

pub fn order_rows() -> Vec<Vec<Value>> {
    vec![
        vec![json!("order_id"), json!("customer"), json!("total")],
        vec![json!(1001), json!("Ada"), json!(25.5)],
        vec![],
        vec![json!(1002), json!("Grace"), json!(12)],
        vec![json!(1003), json!("Linus"), json!(99.99)],
    ]
}

pub fn fake_sheet() -> Arc<FakeSheet> {
    Arc::new(
        FakeSheet::new()
            .with_tab(ORDERS_TAB_ID, ORDERS_TAB, order_rows())
            .with_tab(ARCHIVE_TAB_ID, ARCHIVE_TAB, Vec::new()),
    )
}

pub fn sheet_url(gid: i64) -> String {
    format!("https://docs.google.com/spreadsheets/d/{SPREADSHEET_ID}/edit#gid={gid}")
}

pub fn base_config(gid: i64) -> ConfigMap {
    ConfigMap::from([
        (KEY_CREDENTIALS_FILE.to_string(), "credentials.json".to_string()),
        (KEY_TOKENS_FILE.to_string(), "token.json".to_string()),
        (KEY_SHEETS_URL.to_string(), sheet_url(gid)),
    ])
}

pub fn source_config(gid: i64) -> ConfigMap {
    let mut config = base_config(gid);
    config.insert(KEY_POLLING_PERIOD.to_string(), "1s".to_string());
    config
}

pub fn destination_config(sheet_name: &str, buffer_size: usize, max_retries: u64) -> ConfigMap {
    let mut config = base_config(ARCHIVE_TAB_ID);
    config.insert(KEY_SHEET_NAME.to_string(), sheet_name.to_string());
    config.insert(KEY_BUFFER_SIZE.to_string(), buffer_size.to_string());
    config.insert(KEY_MAX_RETRIES.to_string(), max_retries.to_string());
    config
}

pub fn open_source(api: Arc<FakeSheet>, gid: i64, position: &[u8]) -> SheetsSource {
    let mut source = SheetsSource::configure(&source_config(gid), api).unwrap();
    source.open(position).unwrap();
    source
}

pub fn open_destination(
    api: Arc<FakeSheet>,
    buffer_size: usize,
    max_retries: u64,
) -> SheetsDestination {
    let config = destination_config(ARCHIVE_TAB, buffer_size, max_retries);
    let mut destination = SheetsDestination::configure(&config, api)
        .unwrap()
        .with_retry_unit(Duration::from_millis(10));
    destination.open().unwrap();
    destination
}

/// Reads `count` records, waiting out empty polls. Panics after a minute of
/// (virtual) time without enough records.
pub async fn read_records(source: &SheetsSource, count: usize) -> Vec<Record> {
    let cancel = CancellationToken::new();
    let mut records = Vec::with_capacity(count);

    timeout(Duration::from_secs(60), async {
        while records.len() < count {
            match source.read(&cancel).await {
                Ok(record) => records.push(record),
                Err(err) if err.is_backoff() => sleep(Duration::from_millis(100)).await,
                Err(err) => panic!("read failed: {err}"),
            }
        }
    })
    .await
    .expect("timed out waiting for records");

    records
}

pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

pub const CLIENT_SECRET_JSON: &str = r#"{
    "installed": {
        "client_id": "1234.apps.googleusercontent.com",
        "client_secret": "s3cret",
        "token_uri": "https://oauth2.googleapis.com/token"
    }
}"#;

pub const TOKEN_JSON: &str = r#"{
    "access_token": "ya29.a0Af",
    "token_type": "Bearer",
    "refresh_token": "1//0refresh",
    "expiry": "2099-01-01T00:00:00Z"
}"#;
