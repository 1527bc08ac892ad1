//! `folio-charts` library crate.
//!
//! The binary (`folio`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the session, chart builder and service client are reusable from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod session;
pub mod tui;
