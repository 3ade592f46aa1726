use crate::error::ConnectorError;
use connectors::sheets::api::SheetsApi;
use engine_config::settings::{ConfigMap, destination::DestinationSettings};
use engine_core::{ack::Ack, metrics::Metrics};
use engine_processing::consumer::{
    buffered::BufferedWriter,
    components::{
        updater::RecordUpdater,
        writer::{DEFAULT_RETRY_UNIT, SheetWriter, SheetWriterArgs},
    },
};
use model::records::record::Record;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

struct Writers {
    buffered: BufferedWriter,
    updater: Mutex<RecordUpdater>,
}

/// Write side of the connector: appends records to a sheet in batches.
pub struct SheetsDestination {
    settings: DestinationSettings,
    api: Arc<dyn SheetsApi>,
    metrics: Metrics,
    retry_unit: Duration,
    writers: Option<Writers>,
}

impl SheetsDestination {
    pub fn new(settings: DestinationSettings, api: Arc<dyn SheetsApi>) -> Self {
        Self {
            settings,
            api,
            metrics: Metrics::new(),
            retry_unit: DEFAULT_RETRY_UNIT,
            writers: None,
        }
    }

    pub fn configure(config: &ConfigMap, api: Arc<dyn SheetsApi>) -> Result<Self, ConnectorError> {
        Ok(Self::new(DestinationSettings::parse(config)?, api))
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Base wait between rate-limited attempts; the n-th retry waits n units.
    pub fn with_retry_unit(mut self, retry_unit: Duration) -> Self {
        self.retry_unit = retry_unit;
        self
    }

    pub fn settings(&self) -> &DestinationSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn open(&mut self) -> Result<(), ConnectorError> {
        let args = SheetWriterArgs {
            spreadsheet_id: self.settings.common.spreadsheet_id.clone(),
            sheet_name: self.settings.sheet_name.clone(),
            value_input_option: self.settings.value_input_option,
            max_retries: self.settings.max_retries,
            retry_unit: self.retry_unit,
        };

        let writer = SheetWriter::new(self.api.clone(), args.clone(), self.metrics.clone());
        self.writers = Some(Writers {
            buffered: BufferedWriter::new(writer, self.settings.buffer_size, self.metrics.clone()),
            updater: Mutex::new(RecordUpdater::new(self.api.clone(), args, self.metrics.clone())),
        });

        info!(
            spreadsheet_id = %self.settings.common.spreadsheet_id,
            sheet = %self.settings.sheet_name,
            buffer_size = self.settings.buffer_size,
            max_retries = self.settings.max_retries,
            "Destination opened"
        );
        Ok(())
    }

    fn writers(&self) -> Result<&Writers, ConnectorError> {
        self.writers.as_ref().ok_or(ConnectorError::NotOpen)
    }

    pub async fn write(
        &self,
        record: Record,
        ack: Ack,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectorError> {
        Ok(self.writers()?.buffered.submit(record, ack, cancel).await?)
    }

    pub async fn flush(&self, cancel: &CancellationToken) -> Result<(), ConnectorError> {
        Ok(self.writers()?.buffered.flush(cancel).await?)
    }

    /// Overwrites `range` (A1 notation) with the record's row, bypassing the buffer.
    pub async fn update(
        &self,
        range: &str,
        record: &Record,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectorError> {
        let mut updater = self.writers()?.updater.lock().await;
        updater.update(range, record, cancel).await?;
        Ok(())
    }

    /// Flushes buffered records and closes the writer. Safe without `open`.
    pub async fn teardown(&self, cancel: &CancellationToken) -> Result<(), ConnectorError> {
        if let Some(writers) = &self.writers {
            writers.buffered.teardown(cancel).await?;
        }
        Ok(())
    }
}
