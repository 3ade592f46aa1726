use crate::{consumer::components::writer::SheetWriter, error::ConsumerError};
use connectors::error::SheetsError;
use engine_core::{ack::Ack, metrics::Metrics};
use model::records::record::Record;
use std::{mem, sync::Arc, time::Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace, warn};

struct Inner {
    writer: SheetWriter,
    records: Vec<Record>,
    acks: Vec<Ack>,
    error: Option<Arc<SheetsError>>,
    closed: bool,
}

/// Collects outbound records and appends them to the sheet in batches.
///
/// A batch is flushed once `buffer_size` records are queued, on an explicit
/// [`flush`](Self::flush) and on [`teardown`](Self::teardown). One lock
/// covers the buffer, the acks and the writer, so flushes never interleave.
///
/// After a failed flush the writer is poisoned: every later submit returns
/// the stored error until teardown.
pub struct BufferedWriter {
    inner: Mutex<Inner>,
    buffer_size: usize,
    metrics: Metrics,
}

impl BufferedWriter {
    pub fn new(writer: SheetWriter, buffer_size: usize, metrics: Metrics) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            inner: Mutex::new(Inner {
                writer,
                records: Vec::with_capacity(buffer_size),
                acks: Vec::with_capacity(buffer_size),
                error: None,
                closed: false,
            }),
            buffer_size,
            metrics,
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Number of records waiting for the next flush.
    pub async fn pending(&self) -> usize {
        self.inner.lock().await.records.len()
    }

    /// Queues a record. Records without a payload are dropped and their ack
    /// is never called.
    pub async fn submit(
        &self,
        record: Record,
        ack: Ack,
        cancel: &CancellationToken,
    ) -> Result<(), ConsumerError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(ConsumerError::Closed);
        }
        if let Some(err) = &inner.error {
            return Err(ConsumerError::Write(err.clone()));
        }
        if !record.has_payload() {
            trace!(key = %record.key, "Skipping record without payload");
            return Ok(());
        }

        inner.records.push(record);
        inner.acks.push(ack);

        if inner.records.len() >= self.buffer_size {
            self.flush_locked(&mut inner, cancel).await?;
        }

        Ok(())
    }

    pub async fn flush(&self, cancel: &CancellationToken) -> Result<(), ConsumerError> {
        let mut inner = self.inner.lock().await;
        self.flush_locked(&mut inner, cancel).await
    }

    /// Flushes what is left and closes the writer. Calling it again is a no-op.
    pub async fn teardown(&self, cancel: &CancellationToken) -> Result<(), ConsumerError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Ok(());
        }

        let result = self.flush_locked(&mut inner, cancel).await;
        inner.closed = true;
        info!(poisoned = inner.error.is_some(), "Buffered writer closed");
        result
    }

    async fn flush_locked(
        &self,
        inner: &mut Inner,
        cancel: &CancellationToken,
    ) -> Result<(), ConsumerError> {
        let records = mem::take(&mut inner.records);
        let acks = mem::take(&mut inner.acks);
        if records.is_empty() {
            return Ok(());
        }

        let started = Instant::now();
        let outcome = inner
            .writer
            .append(&records, cancel)
            .await
            .map(|_| ())
            .map_err(Arc::new);

        match &outcome {
            Ok(()) => {
                self.metrics.increment_flushes();
                info!(
                    rows = records.len(),
                    duration_ms = started.elapsed().as_millis(),
                    "Flushed buffered records"
                );
            }
            Err(err) => {
                self.metrics.increment_failures();
                inner.error = Some(err.clone());
                error!(
                    rows = records.len(),
                    error = %err,
                    "Flush failed, writer is poisoned"
                );
            }
        }

        let mut ack_error = None;
        for ack in acks {
            if let Err(err) = ack.call(outcome.clone()) {
                warn!(error = %err, "Acknowledgement callback failed");
                ack_error.get_or_insert(err);
            }
        }

        outcome.map_err(ConsumerError::Write)?;
        match ack_error {
            Some(err) => Err(ConsumerError::Ack(err)),
            None => Ok(()),
        }
    }
}
