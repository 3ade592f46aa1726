pub mod error;
pub mod sheets;
