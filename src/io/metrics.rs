//! Read/write metrics JSON snapshots.
//!
//! A snapshot is the service's success body stored verbatim, so a saved run
//! can be rendered again later without the service (`folio render`).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::domain::MetricsResponse;
use crate::error::AppError;

/// Write a metrics payload as pretty-printed JSON.
pub fn write_metrics_json(path: &Path, metrics: &MetricsResponse) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create metrics JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), metrics)
        .map_err(|e| AppError::usage(format!("Failed to write metrics JSON: {e}")))?;

    log::info!("saved metrics to {}", path.display());
    Ok(())
}

/// Read a metrics payload previously saved (or captured from the service).
pub fn read_metrics_json(path: &Path) -> Result<MetricsResponse, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open metrics JSON '{}': {e}", path.display())))?;
    let metrics: MetricsResponse = serde_json::from_reader(std::io::BufReader::new(file))
        .map_err(|e| AppError::usage(format!("Invalid metrics JSON '{}': {e}", path.display())))?;
    Ok(metrics)
}
