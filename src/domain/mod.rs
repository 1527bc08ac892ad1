//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - upload inputs (`FileSlot`, `SelectedFile`, `FileSelection`)
//! - the analysis service payload (`MetricsResponse`, `HistoryPoint`)

pub mod types;

pub use types::*;
