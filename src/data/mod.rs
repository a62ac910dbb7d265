//! Data sources: synthetic generation and dispatch over `DataSource`.

pub mod sample;

pub use sample::*;
