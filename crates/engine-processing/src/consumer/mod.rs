pub mod buffered;
pub mod components;
