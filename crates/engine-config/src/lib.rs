pub mod settings;
pub mod spec;
