pub mod components;
pub mod iterator;
