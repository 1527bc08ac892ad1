//! Time-series chart models derived from a metrics payload.
//!
//! - `model`: the rendering-agnostic `ChartModel` and its configuration
//! - `builder`: the pure payload -> model transformation
//! - `contract`: conversion to the chart widget's JSON configuration

pub mod builder;
pub mod contract;
pub mod model;

pub use builder::*;
pub use contract::*;
pub use model::*;
