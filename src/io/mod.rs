//! Input/output helpers.
//!
//! - metrics JSON snapshots (`metrics`)
//! - chart widget configuration export (`chart`)

pub mod chart;
pub mod metrics;

pub use chart::*;
pub use metrics::*;
