//! Reporting utilities: the metrics view and formatted terminal output.

pub mod format;

pub use format::*;
