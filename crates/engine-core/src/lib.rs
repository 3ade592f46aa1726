pub mod ack;
pub mod error;
pub mod metrics;
pub mod retry;
pub mod scope;
