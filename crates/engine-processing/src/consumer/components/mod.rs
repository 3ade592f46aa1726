pub mod updater;
pub mod writer;
