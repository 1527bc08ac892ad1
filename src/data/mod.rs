//! External data sources.
//!
//! The only one is the analysis service that turns statement files into a
//! metrics payload (`service`).

pub mod service;

pub use service::*;
