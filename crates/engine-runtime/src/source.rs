use crate::error::ConnectorError;
use connectors::sheets::api::SheetsApi;
use engine_config::settings::{ConfigMap, source::SourceSettings};
use engine_core::metrics::Metrics;
use engine_processing::producer::{
    components::reader::{BatchReader, BatchReaderArgs},
    iterator::PollingIterator,
};
use model::{pagination::position::SheetPosition, records::record::Record};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

/// Read side of the connector: tails a sheet from a resumable position.
pub struct SheetsSource {
    settings: SourceSettings,
    api: Arc<dyn SheetsApi>,
    metrics: Metrics,
    iterator: Option<PollingIterator>,
}

impl SheetsSource {
    pub fn new(settings: SourceSettings, api: Arc<dyn SheetsApi>) -> Self {
        Self {
            settings,
            api,
            metrics: Metrics::new(),
            iterator: None,
        }
    }

    pub fn configure(config: &ConfigMap, api: Arc<dyn SheetsApi>) -> Result<Self, ConnectorError> {
        Ok(Self::new(SourceSettings::parse(config)?, api))
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Starts polling after `position`. An empty position starts from the
    /// top of the sheet. Must be called from within a tokio runtime.
    pub fn open(&mut self, position: &[u8]) -> Result<(), ConnectorError> {
        let common = &self.settings.common;
        let position = SheetPosition::parse(position)?;
        position.validate_for(&common.spreadsheet_id, common.sheet_id)?;

        let reader = BatchReader::new(
            self.api.clone(),
            BatchReaderArgs {
                spreadsheet_id: common.spreadsheet_id.clone(),
                sheet_id: common.sheet_id,
                date_time_render_option: self.settings.date_time_render_option,
                value_render_option: self.settings.value_render_option,
                polling_period: self.settings.polling_period,
            },
            self.metrics.clone(),
        );

        if let Some(previous) = self.iterator.take() {
            previous.stop();
        }
        self.iterator = Some(PollingIterator::start(reader, position.row_offset));

        info!(
            spreadsheet_id = %common.spreadsheet_id,
            sheet_id = common.sheet_id,
            row_offset = position.row_offset,
            "Source opened"
        );
        Ok(())
    }

    /// Returns the next record, or [`ConnectorError::BackoffRetry`] when
    /// nothing is ready yet.
    pub async fn read(&self, cancel: &CancellationToken) -> Result<Record, ConnectorError> {
        let iterator = self.iterator.as_ref().ok_or(ConnectorError::NotOpen)?;
        if !iterator.has_next() {
            return Err(ConnectorError::BackoffRetry);
        }

        Ok(iterator.next(cancel).await?)
    }

    /// Acknowledgements are advisory: they are logged and never fail.
    pub fn ack(&self, position: &[u8]) {
        match SheetPosition::parse(position) {
            Ok(position) => trace!(row_offset = position.row_offset, "Record acknowledged"),
            Err(err) => error!(error = %err, "Unable to parse acknowledged position"),
        }
    }

    /// Stops polling and waits for the background tasks. Safe without `open`.
    pub async fn teardown(&mut self) {
        if let Some(iterator) = self.iterator.take() {
            iterator.stop();
            iterator.wait().await;
            info!("Source torn down");
        }
    }
}
