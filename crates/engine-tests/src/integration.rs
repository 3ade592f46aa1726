#[cfg(test)]
mod tests {
    use crate::{
        SPREADSHEET_ID,
        utils::{
            ARCHIVE_TAB, CLIENT_SECRET_JSON, ORDERS_TAB, ORDERS_TAB_ID, POLL, TOKEN_JSON,
            fake_sheet, open_destination, open_source, order_rows, read_records,
            source_config, temp_file,
        },
    };
    use connectors::{error::SheetsError, sheets::auth::TokenSource};
    use engine_config::settings::{
        common::{KEY_CREDENTIALS_FILE, KEY_SHEETS_URL, KEY_TOKENS_FILE},
        credentials::load_token_source,
        error::SettingsError,
        source::SourceSettings,
    };
    use engine_core::ack::Ack;
    use engine_processing::error::{ConsumerError, ProducerError};
    use engine_runtime::{error::ConnectorError, source::SheetsSource};
    use model::{pagination::position::SheetPosition, records::record::Record};
    use serde_json::json;
    use tokio::time::sleep;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    // Scenario: a fresh source tails a sheet containing a blank row.
    // Expected Outcome: every non-empty row arrives in order, keyed by its
    // 1-based row number, and the blank row is skipped without shifting keys.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn reads_sheet_from_the_beginning() {
        let sheet = fake_sheet();
        let mut source = open_source(sheet.clone(), ORDERS_TAB_ID, &[]);

        let records = read_records(&source, 4).await;
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["1", "2", "4", "5"]);
        assert_eq!(
            records[1].row().unwrap(),
            vec![json!(1001), json!("Ada"), json!(25.5)]
        );

        let last = records[3].sheet_position().unwrap();
        assert_eq!(last, SheetPosition::new(5, SPREADSHEET_ID, ORDERS_TAB_ID));

        let metadata = records[0].metadata.as_ref().unwrap();
        assert_eq!(metadata["sheets.spreadsheetId"], SPREADSHEET_ID);
        assert_eq!(metadata["sheets.sheetId"], ORDERS_TAB_ID.to_string());

        assert_eq!(source.metrics().snapshot().records_read, 4);
        source.teardown().await;
        assert!(logs_contain("Fetched batch from sheet"));
    }

    // Scenario: rows are appended to the sheet while the source is tailing it.
    // Expected Outcome: only the new rows are delivered on later polls.
    #[tokio::test(start_paused = true)]
    async fn picks_up_rows_appended_later() {
        let sheet = fake_sheet();
        let mut source = open_source(sheet.clone(), ORDERS_TAB_ID, &[]);
        read_records(&source, 4).await;

        sheet.push_rows(ORDERS_TAB, vec![vec![json!(1004), json!("Barbara"), json!(7)]]);
        let records = read_records(&source, 1).await;
        assert_eq!(records[0].key, "6");
        assert_eq!(records[0].row().unwrap()[1], json!("Barbara"));

        sleep(POLL * 3).await;
        let err = source.read(&CancellationToken::new()).await.unwrap_err();
        assert!(err.is_backoff());

        source.teardown().await;
    }

    // Scenario: a source is restarted from the position of the last record it
    // acknowledged.
    // Expected Outcome: delivery resumes with the following row, nothing is
    // replayed.
    #[tokio::test(start_paused = true)]
    async fn resumes_from_acknowledged_position() {
        let sheet = fake_sheet();
        let mut source = open_source(sheet.clone(), ORDERS_TAB_ID, &[]);
        let first_run = read_records(&source, 2).await;
        let checkpoint = first_run[1].position.clone();
        source.ack(&checkpoint);
        source.teardown().await;

        let mut source = open_source(sheet, ORDERS_TAB_ID, &checkpoint);
        let second_run = read_records(&source, 2).await;
        let keys: Vec<&str> = second_run.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["4", "5"]);
        source.teardown().await;
    }

    // Scenario: a position produced for one tab is used to open another.
    // Expected Outcome: open is rejected before any request is made.
    #[tokio::test]
    async fn refuses_position_from_another_tab() {
        let sheet = fake_sheet();
        let mut source =
            SheetsSource::configure(&source_config(ORDERS_TAB_ID), sheet.clone()).unwrap();
        let foreign = SheetPosition::new(2, SPREADSHEET_ID, 77);

        let err = source.open(&foreign.to_bytes()).unwrap_err();
        assert!(matches!(err, ConnectorError::Position(_)));
        assert_eq!(sheet.read_calls(), 0);
    }

    // Scenario: the first reads are rate limited.
    // Expected Outcome: the reader backs off, then delivers every row once the
    // limit clears.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn read_recovers_from_rate_limit() {
        let sheet = fake_sheet();
        sheet.rate_limit_reads(2);
        let mut source = open_source(sheet.clone(), ORDERS_TAB_ID, &[]);

        let records = read_records(&source, 4).await;
        assert_eq!(records[0].key, "1");
        assert!(sheet.read_calls() >= 3);
        assert_eq!(source.metrics().snapshot().rate_limited, 2);
        assert!(logs_contain("Rate limit exceeded, delaying next fetch"));

        source.teardown().await;
    }

    // Scenario: the configured spreadsheet does not exist.
    // Expected Outcome: read surfaces the fetch error instead of retrying.
    #[tokio::test(start_paused = true)]
    async fn fatal_read_error_stops_source() {
        let mut config = source_config(ORDERS_TAB_ID);
        config.insert(
            KEY_SHEETS_URL.to_string(),
            format!("https://docs.google.com/spreadsheets/d/unknown/edit#gid={ORDERS_TAB_ID}"),
        );
        let sheet = fake_sheet();
        let mut source = SheetsSource::configure(&config, sheet.clone()).unwrap();
        source.open(&[]).unwrap();

        sleep(POLL * 2).await;
        let err = source.read(&CancellationToken::new()).await.unwrap_err();
        match err {
            ConnectorError::Producer(ProducerError::Fetch { row_offset, source }) => {
                assert_eq!(row_offset, 0);
                assert!(matches!(source.as_ref(), SheetsError::Api { status: 404, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sheet.read_calls(), 1);

        source.teardown().await;
    }

    // Scenario: records read from one tab are written to another through the
    // buffered writer.
    // Expected Outcome: the target tab holds the same rows in the same order
    // and every ack reports success.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn copies_rows_between_tabs() {
        let sheet = fake_sheet();
        let mut source = open_source(sheet.clone(), ORDERS_TAB_ID, &[]);
        let destination = open_destination(sheet.clone(), 3, 3);
        let cancel = CancellationToken::new();

        let mut outcomes = Vec::new();
        for record in read_records(&source, 4).await {
            let (ack, rx) = Ack::channel();
            destination
                .write(Record::from_payload(record.payload.clone()), ack, &cancel)
                .await
                .unwrap();
            outcomes.push(rx);
            source.ack(&record.position);
        }
        destination.teardown(&cancel).await.unwrap();
        source.teardown().await;

        for rx in outcomes {
            assert!(rx.await.unwrap().is_ok());
        }

        let expected: Vec<_> = order_rows().into_iter().filter(|row| !row.is_empty()).collect();
        assert_eq!(sheet.rows(ARCHIVE_TAB), expected);
        // One full batch of 3, then the remainder on teardown.
        assert_eq!(sheet.write_calls(), 2);
        assert_eq!(destination.metrics().snapshot().flushes, 2);
        assert!(logs_contain("Flushed buffered records"));
    }

    // Scenario: the append endpoint is rate limited for longer than the retry
    // budget.
    // Expected Outcome: the flush fails after max_retries + 1 attempts, the ack
    // sees the error and the destination refuses further writes.
    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn write_gives_up_after_retry_budget() {
        let sheet = fake_sheet();
        sheet.rate_limit_writes(100);
        let destination = open_destination(sheet.clone(), 1, 2);
        let cancel = CancellationToken::new();

        let (ack, rx) = Ack::channel();
        let err = destination
            .write(Record::from_payload(r#"["late"]"#), ack, &cancel)
            .await
            .unwrap_err();

        match &err {
            ConnectorError::Consumer(ConsumerError::Write(source)) => {
                assert!(matches!(
                    source.as_ref(),
                    SheetsError::RetriesExhausted { retries: 2, .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(sheet.write_calls(), 3);
        assert!(rx.await.unwrap().is_err());
        assert!(logs_contain("Retrying after transient failure"));

        let err = destination
            .write(Record::from_payload(r#"["next"]"#), Ack::noop(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::Consumer(ConsumerError::Write(_))));
        assert!(sheet.rows(ARCHIVE_TAB).is_empty());
    }

    // Scenario: writes are rate limited once, within the retry budget.
    // Expected Outcome: the batch lands after a single retry.
    #[tokio::test(start_paused = true)]
    async fn write_retries_transient_rate_limit() {
        let sheet = fake_sheet();
        sheet.rate_limit_writes(1);
        let destination = open_destination(sheet.clone(), 2, 3);
        let cancel = CancellationToken::new();

        for payload in [r#"["a"]"#, r#"["b"]"#] {
            destination
                .write(Record::from_payload(payload), Ack::noop(), &cancel)
                .await
                .unwrap();
        }

        assert_eq!(sheet.rows(ARCHIVE_TAB), vec![vec![json!("a")], vec![json!("b")]]);
        let snapshot = destination.metrics().snapshot();
        assert_eq!(snapshot.rate_limited, 1);
        assert_eq!(snapshot.rows_written, 2);
        destination.teardown(&cancel).await.unwrap();
    }

    // Scenario: a single row is overwritten in place.
    // Expected Outcome: only the addressed row changes, the buffer is untouched.
    #[tokio::test]
    async fn update_overwrites_single_row() {
        let sheet = fake_sheet();
        let destination = open_destination(sheet.clone(), 10, 3);
        let cancel = CancellationToken::new();

        destination
            .update(
                &format!("{ORDERS_TAB}!A3"),
                &Record::from_payload(r#"[1005,"Edsger",3]"#),
                &cancel,
            )
            .await
            .unwrap();

        let rows = sheet.rows(ORDERS_TAB);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[2], vec![json!(1005), json!("Edsger"), json!(3)]);
        assert_eq!(rows[1], order_rows()[1]);
    }

    // Scenario: credentials and tokens are loaded from files referenced by the
    // connector config.
    // Expected Outcome: an unexpired token is served without a refresh.
    #[tokio::test]
    async fn loads_credentials_from_config_files() {
        let client = temp_file(CLIENT_SECRET_JSON);
        let token = temp_file(TOKEN_JSON);

        let mut config = source_config(ORDERS_TAB_ID);
        config.insert(
            KEY_CREDENTIALS_FILE.to_string(),
            client.path().display().to_string(),
        );
        config.insert(KEY_TOKENS_FILE.to_string(), token.path().display().to_string());

        let settings = SourceSettings::parse(&config).unwrap();
        assert_eq!(settings.common.spreadsheet_id, SPREADSHEET_ID);
        assert_eq!(settings.common.sheet_id, ORDERS_TAB_ID);

        let tokens = load_token_source(&settings.common, reqwest::Client::new()).unwrap();
        assert_eq!(tokens.access_token().await.unwrap(), "ya29.a0Af");
    }

    // Scenario: the sheet URL does not point at a spreadsheet tab.
    // Expected Outcome: configuration fails with a URL error.
    #[test]
    fn rejects_url_without_tab() {
        let mut config = source_config(ORDERS_TAB_ID);
        config.insert(
            KEY_SHEETS_URL.to_string(),
            "https://docs.google.com/document/d/abc/edit".to_string(),
        );

        let err = SourceSettings::parse(&config).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidSheetUrl { .. }));
    }
}
