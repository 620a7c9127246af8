//! Library-wide error and result types.

pub mod types;

pub use types::*;
