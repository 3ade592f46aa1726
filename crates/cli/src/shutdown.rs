use std::sync::{Arc, OnceLock};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Termination signals the CLI reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

/// Cancels the shared token on the first SIGINT or SIGTERM so a running
/// `read` or `write` can drain and exit cleanly.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    cancel_token: CancellationToken,
    received: Arc<OnceLock<Signal>>,
}

impl ShutdownCoordinator {
    pub fn new(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            received: Arc::new(OnceLock::new()),
        }
    }

    pub fn register_handlers(&self) {
        let coordinator = self.clone();

        tokio::spawn(async move {
            let signal = wait_for_signal().await;
            info!(?signal, "Received signal, shutting down");
            coordinator.trigger(signal);
        });
    }

    /// Records `signal` and cancels the token. Only the first signal is kept.
    pub fn trigger(&self, signal: Signal) {
        let _ = self.received.set(signal);
        self.cancel_token.cancel();
    }

    pub fn received_signal(&self) -> Option<Signal> {
        self.received.get().copied()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }
}

async fn wait_for_signal() -> Signal {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => Signal::Interrupt,
        _ = terminate => Signal::Terminate,
    }
}

/// Process exit codes. Signals follow the shell's 128 + signal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<Signal> for ExitCode {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Interrupt => ExitCode::Interrupted,
            Signal::Terminate => ExitCode::Terminated,
        }
    }
}
