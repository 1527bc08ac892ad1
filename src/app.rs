//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the selected CSV exports
//! - submits them to the analysis service
//! - prints metrics/charts or hands over to the TUI
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::chart::{ChartConfig, ChartModel};
use crate::cli::{ChartArgs, Command, RenderArgs, UploadArgs};
use crate::data::{HttpAnalysisService, ServiceConfig};
use crate::domain::{FileSlot, SelectedFile};
use crate::error::AppError;
use crate::logging::LogTarget;
use crate::session::UploadSession;

pub mod pipeline;

/// Entry point for the `folio` binary.
pub fn run() -> Result<(), AppError> {
    // We want `folio` and `folio --account a.csv` to behave like `folio tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let log_target = match cli.command {
        Command::Tui(_) => LogTarget::File(crate::logging::default_log_file()),
        _ => LogTarget::Stderr,
    };
    crate::logging::init(log_target)?;

    match cli.command {
        Command::Upload(args) => handle_upload(args),
        Command::Render(args) => handle_render(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_upload(args: UploadArgs) -> Result<(), AppError> {
    let mut session = session_from_args(&args)?;
    let service = service_from_args(&args)?;

    let resolution = pipeline::submit_blocking(&service, &mut session);
    log::debug!("submit resolved: {resolution:?}");

    println!("{}", crate::report::format_session_summary(&session, &args.chart.currency));

    let charts = pipeline::derive_charts(&session, &chart_config_from_args(&args.chart));
    present_charts(&charts, &args.chart)?;

    if let (Some(path), Some(metrics)) = (&args.save_metrics, session.last_metrics()) {
        crate::io::write_metrics_json(path, metrics)?;
    }

    // The notice was already printed; the exit code still reports the failure.
    match session.last_error() {
        Some(err) => Err(AppError::from(err.clone())),
        None => Ok(()),
    }
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    let metrics = crate::io::read_metrics_json(&args.metrics)?;

    let view = crate::report::metrics_view(&metrics, &args.chart.currency);
    println!("{}", crate::report::format_metrics_summary(&view));

    let charts = crate::chart::build_chart_models(&metrics, &chart_config_from_args(&args.chart));
    present_charts(&charts, &args.chart)
}

fn handle_tui(args: UploadArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

fn present_charts(charts: &[ChartModel], args: &ChartArgs) -> Result<(), AppError> {
    if !args.no_plot {
        for chart in charts {
            println!("{}", crate::plot::render_ascii_chart(chart, args.width, args.height));
        }
    }
    if let Some(path) = &args.export_chart {
        crate::io::write_chart_json(path, charts)?;
    }
    Ok(())
}

pub fn chart_config_from_args(args: &ChartArgs) -> ChartConfig {
    let mut policies = args.policies.clone();
    policies.dedup();
    ChartConfig {
        policies,
        currency_symbol: args.currency.clone(),
    }
}

/// Build the initial session from file flags (and `--pick` for the rest).
pub fn session_from_args(args: &UploadArgs) -> Result<UploadSession, AppError> {
    let mut session = UploadSession::new(args.stale_policy);
    for (slot, path) in selected_paths(args)? {
        session.set_file(slot, SelectedFile::from_path(&path)?);
    }
    Ok(session)
}

fn selected_paths(args: &UploadArgs) -> Result<Vec<(FileSlot, PathBuf)>, AppError> {
    let mut paths: Vec<(FileSlot, PathBuf)> = [
        (FileSlot::Transactions, &args.transactions),
        (FileSlot::Account, &args.account),
        (FileSlot::Portfolio, &args.portfolio),
    ]
    .into_iter()
    .filter_map(|(slot, path)| path.clone().map(|p| (slot, p)))
    .collect();

    if args.pick {
        let missing: Vec<FileSlot> = FileSlot::ALL
            .into_iter()
            .filter(|slot| paths.iter().all(|(s, _)| s != slot))
            .collect();
        if !missing.is_empty() {
            paths.extend(crate::cli::picker::prompt_for_slots(&missing)?);
        }
    }
    Ok(paths)
}

/// Resolve service settings: environment first, then the `--service-url` flag.
pub fn service_config_from_args(args: &UploadArgs) -> Result<ServiceConfig, AppError> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(url) = &args.service_url {
        config.base_url = url.clone();
    }
    Ok(config)
}

fn service_from_args(args: &UploadArgs) -> Result<HttpAnalysisService, AppError> {
    let config = service_config_from_args(args)?;
    log::info!("analysis service: {} (timeout {:?})", config.upload_url(), config.timeout);
    HttpAnalysisService::new(&config)
}

/// Rewrite argv so `folio` defaults to `folio tui`.
///
/// Rules:
/// - `folio`                       -> `folio tui`
/// - `folio --account a.csv ...`   -> `folio tui --account a.csv ...`
/// - `folio --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "upload" | "render" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
