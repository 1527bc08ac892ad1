//! Command-line parsing for the portfolio metrics client.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the session/chart code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::chart::ChartPolicy;
use crate::session::StalePolicy;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio metrics uploader and chart viewer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload CSV exports to the analysis service, print metrics and charts.
    Upload(UploadArgs),
    /// Render a previously saved metrics JSON without contacting the service.
    Render(RenderArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same submit pipeline as `folio upload`, but runs requests
    /// in the background and renders results using Ratatui.
    Tui(UploadArgs),
}

/// Chart presentation options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct ChartArgs {
    /// Chart policy; repeat to build several charts (detailed, summary).
    #[arg(long = "policy", value_enum, default_values_t = [ChartPolicy::Detailed])]
    pub policies: Vec<ChartPolicy>,

    /// Currency symbol used in the value axis title and metric amounts.
    #[arg(long, default_value = "€")]
    pub currency: String,

    /// Export the chart widget configuration(s) to JSON.
    #[arg(long = "export-chart", value_name = "JSON")]
    pub export_chart: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for uploading (batch or interactive).
#[derive(Debug, Parser, Clone)]
pub struct UploadArgs {
    /// Transactions export (CSV).
    #[arg(long, value_name = "CSV")]
    pub transactions: Option<PathBuf>,

    /// Account statement export (CSV).
    #[arg(long, value_name = "CSV")]
    pub account: Option<PathBuf>,

    /// Portfolio snapshot export (CSV).
    #[arg(long, value_name = "CSV")]
    pub portfolio: Option<PathBuf>,

    /// Pick files interactively from CSVs under the current directory.
    #[arg(long)]
    pub pick: bool,

    /// Analysis service base URL (overrides FOLIO_SERVICE_URL).
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Which response wins when submits overlap.
    #[arg(long, value_enum, default_value_t = StalePolicy::LatestInitiated)]
    pub stale_policy: StalePolicy,

    /// Save the metrics payload to JSON (for `folio render`).
    #[arg(long = "save-metrics", value_name = "JSON")]
    pub save_metrics: Option<PathBuf>,

    #[command(flatten)]
    pub chart: ChartArgs,
}

/// Options for rendering a saved metrics snapshot.
#[derive(Debug, Parser)]
pub struct RenderArgs {
    /// Metrics JSON file produced by `folio upload --save-metrics`.
    #[arg(long, value_name = "JSON")]
    pub metrics: PathBuf,

    #[command(flatten)]
    pub chart: ChartArgs,
}
