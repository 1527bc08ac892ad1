//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - decoded straight from the analysis service response
//! - saved to disk and reloaded later for offline rendering
//! - passed between the session, the chart builder and the presentation layer

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Logical upload slot. Each slot is sent as its own multipart part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileSlot {
    Transactions,
    Account,
    Portfolio,
}

impl FileSlot {
    pub const ALL: [FileSlot; 3] = [FileSlot::Transactions, FileSlot::Account, FileSlot::Portfolio];

    /// Multipart part name expected by the analysis service.
    pub fn form_name(self) -> &'static str {
        match self {
            FileSlot::Transactions => "transactions",
            FileSlot::Account => "account",
            FileSlot::Portfolio => "portfolio",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            FileSlot::Transactions => "Transactions",
            FileSlot::Account => "Account",
            FileSlot::Portfolio => "Portfolio",
        }
    }
}

impl fmt::Display for FileSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_name())
    }
}

/// An opaque file handle: the name shown to the service plus its content.
///
/// Content is loaded once at selection time and reference counted, so cloning a
/// selection into an in-flight request does not copy the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub content: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk. No type or size validation happens here.
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read(path)
            .map_err(|e| AppError::new(2, format!("Failed to read '{}': {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, content))
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// Files chosen for upload, at most one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: BTreeMap<FileSlot, SelectedFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `file` into `slot`, returning whatever it replaced.
    pub fn insert(&mut self, slot: FileSlot, file: SelectedFile) -> Option<SelectedFile> {
        self.files.insert(slot, file)
    }

    pub fn remove(&mut self, slot: FileSlot) -> Option<SelectedFile> {
        self.files.remove(&slot)
    }

    pub fn get(&self, slot: FileSlot) -> Option<&SelectedFile> {
        self.files.get(&slot)
    }

    /// Present files in slot order (transactions, account, portfolio).
    pub fn iter(&self) -> impl Iterator<Item = (FileSlot, &SelectedFile)> {
        self.files.iter().map(|(slot, file)| (*slot, file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// One point of a historical series as returned by the service.
///
/// `date` is kept verbatim (`YYYY-MM-DD`); a `null` value means "missing".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl HistoryPoint {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value: Some(value),
        }
    }
}

/// Which historical sequence of the payload a chart series reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    HistoricalPortfolioValue,
    HistoricalCashflow,
    CombinedData,
}

impl SeriesSource {
    pub fn field_name(self) -> &'static str {
        match self {
            SeriesSource::HistoricalPortfolioValue => "historical_portfolio_value",
            SeriesSource::HistoricalCashflow => "historical_cashflow",
            SeriesSource::CombinedData => "combined_data",
        }
    }
}

/// Metrics payload returned by `POST /upload`.
///
/// Historical sequences may be absent or `null`; both decode to `None` and are
/// treated as empty. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub total_dividends: f64,
    pub total_fees: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_breakdown: Option<BTreeMap<String, f64>>,
    pub profit_loss: f64,
    pub portfolio_value: f64,
    pub cash_balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_growth_rate: Option<f64>,
    #[serde(default)]
    pub historical_portfolio_value: Option<Vec<HistoryPoint>>,
    #[serde(default)]
    pub historical_cashflow: Option<Vec<HistoryPoint>>,
    #[serde(default)]
    pub combined_data: Option<Vec<HistoryPoint>>,
}

impl MetricsResponse {
    /// Borrow a historical sequence; absent reads as empty.
    pub fn series(&self, source: SeriesSource) -> &[HistoryPoint] {
        let seq = match source {
            SeriesSource::HistoricalPortfolioValue => &self.historical_portfolio_value,
            SeriesSource::HistoricalCashflow => &self.historical_cashflow,
            SeriesSource::CombinedData => &self.combined_data,
        };
        seq.as_deref().unwrap_or(&[])
    }
}
