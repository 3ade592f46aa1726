use crate::{error::ProducerError, producer::components::reader::BatchReader};
use engine_core::scope::TaskScope;
use model::records::record::Record;
use std::sync::Arc;
use tokio::{
    sync::{Mutex, mpsc},
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Pull-style iterator over the rows appended to a sheet.
///
/// Two background tasks share one [`TaskScope`]: the poll task fetches a
/// batch on every tick and stages it whole, the flush task moves staged
/// records one at a time into the delivery buffer. Both channels hold a
/// single item, so a slow consumer stalls polling.
pub struct PollingIterator {
    scope: TaskScope<ProducerError>,
    records: Mutex<mpsc::Receiver<Record>>,
}

impl PollingIterator {
    /// Starts polling after `row_offset`, the offset of the last row already
    /// delivered. The first fetch happens one polling period from now.
    pub fn start(reader: BatchReader, row_offset: u64) -> Self {
        let scope = TaskScope::new();
        let (staging_tx, staging_rx) = mpsc::channel::<Vec<Record>>(1);
        let (buffer_tx, buffer_rx) = mpsc::channel::<Record>(1);

        info!(
            spreadsheet_id = %reader.args().spreadsheet_id,
            sheet_id = reader.args().sheet_id,
            row_offset,
            polling_period = ?reader.args().polling_period,
            "Starting polling iterator"
        );

        scope.spawn(poll(reader, row_offset, staging_tx, scope.clone()));
        scope.spawn(flush(staging_rx, buffer_tx, scope.clone()));

        Self {
            scope,
            records: Mutex::new(buffer_rx),
        }
    }

    /// True when a record is ready or the iterator has terminated, in which
    /// case [`next`](Self::next) returns the termination cause.
    pub fn has_next(&self) -> bool {
        if !self.scope.is_alive() {
            return true;
        }

        match self.records.try_lock() {
            Ok(records) => !records.is_empty(),
            Err(_) => false,
        }
    }

    /// Waits for the next record. Termination wins over a buffered record:
    /// once the iterator has stopped or failed, records fetched but not yet
    /// delivered are dropped, and a new session replays them from the last
    /// acknowledged position.
    pub async fn next(&self, cancel: &CancellationToken) -> Result<Record, ProducerError> {
        let mut records = tokio::select! {
            biased;
            _ = self.scope.dying() => return Err(self.termination()),
            _ = cancel.cancelled() => return Err(ProducerError::Cancelled),
            records = self.records.lock() => records,
        };

        tokio::select! {
            biased;
            _ = self.scope.dying() => Err(self.termination()),
            _ = cancel.cancelled() => Err(ProducerError::Cancelled),
            record = records.recv() => record.ok_or(ProducerError::ChannelClosed),
        }
    }

    /// Stops polling. Idempotent; the first termination cause is kept.
    pub fn stop(&self) {
        if self.scope.is_alive() {
            info!("Stopping polling iterator");
        }
        self.scope.kill(ProducerError::Stopped);
    }

    /// Waits for the background tasks to exit.
    pub async fn wait(&self) {
        self.scope.wait().await
    }

    fn termination(&self) -> ProducerError {
        self.scope.cause().unwrap_or(ProducerError::Stopped)
    }
}

impl Drop for PollingIterator {
    fn drop(&mut self) {
        self.scope.kill(ProducerError::Stopped);
    }
}

async fn poll(
    mut reader: BatchReader,
    mut row_offset: u64,
    staging: mpsc::Sender<Vec<Record>>,
    scope: TaskScope<ProducerError>,
) -> Result<(), ProducerError> {
    let period = reader.args().polling_period;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = scope.dying() => return Ok(()),
            _ = ticker.tick() => {}
        }

        let batch = tokio::select! {
            biased;
            _ = scope.dying() => return Ok(()),
            batch = reader.fetch(row_offset) => batch.map_err(|err| ProducerError::Fetch {
                row_offset,
                source: Arc::new(err),
            })?,
        };

        let Some(last) = batch.last() else {
            continue;
        };
        let next_offset = last
            .sheet_position()
            .map_err(|err| ProducerError::Position(Arc::new(err)))?
            .row_offset;

        tokio::select! {
            biased;
            _ = scope.dying() => return Ok(()),
            sent = staging.send(batch) => {
                if sent.is_err() {
                    return Err(ProducerError::ChannelClosed);
                }
            }
        }

        debug!(from = row_offset, to = next_offset, "Advanced row offset");
        row_offset = next_offset;
    }
}

async fn flush(
    mut staging: mpsc::Receiver<Vec<Record>>,
    buffer: mpsc::Sender<Record>,
    scope: TaskScope<ProducerError>,
) -> Result<(), ProducerError> {
    loop {
        let batch = tokio::select! {
            biased;
            _ = scope.dying() => return Ok(()),
            batch = staging.recv() => match batch {
                Some(batch) => batch,
                None => return Ok(()),
            },
        };

        for record in batch {
            tokio::select! {
                biased;
                _ = scope.dying() => return Ok(()),
                sent = buffer.send(record) => {
                    if sent.is_err() {
                        return Err(ProducerError::ChannelClosed);
                    }
                }
            }
        }
    }
}
