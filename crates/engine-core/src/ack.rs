use crate::error::AckError;
use connectors::error::SheetsError;
use std::{fmt, sync::Arc};
use tokio::sync::oneshot;

/// Outcome reported to an acknowledgement: `Ok` once the record's batch was
/// written, or the error that stopped it.
pub type AckOutcome = Result<(), Arc<SheetsError>>;

type AckFn = Box<dyn FnOnce(AckOutcome) -> Result<(), AckError> + Send + 'static>;

/// Acknowledgement for a single outbound record. Consumed on use, so it can
/// only ever be invoked once.
pub struct Ack {
    callback: AckFn,
}

impl Ack {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce(AckOutcome) -> Result<(), AckError> + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    pub fn noop() -> Self {
        Self::new(|_| Ok(()))
    }

    /// Ack whose outcome can be awaited through the returned receiver.
    pub fn channel() -> (Self, oneshot::Receiver<AckOutcome>) {
        let (tx, rx) = oneshot::channel();
        let ack = Self::new(move |outcome| {
            // Nobody waiting on the outcome is not a failure.
            let _ = tx.send(outcome);
            Ok(())
        });
        (ack, rx)
    }

    pub fn call(self, outcome: AckOutcome) -> Result<(), AckError> {
        (self.callback)(outcome)
    }
}

impl fmt::Debug for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ack").finish_non_exhaustive()
    }
}
