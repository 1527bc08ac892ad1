//! Rendering-agnostic chart model.
//!
//! A `ChartModel` is built once per metrics update and never mutated
//! afterwards; consumers replace it wholesale.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::SeriesSource;

/// Which granularity and series overlay to derive from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartPolicy {
    /// Daily axis; added funds, profit & loss and total value overlaid.
    Detailed,
    /// Monthly axis; portfolio value only.
    Summary,
}

impl ChartPolicy {
    pub fn display_name(self) -> &'static str {
        match self {
            ChartPolicy::Detailed => "Detailed (daily)",
            ChartPolicy::Summary => "Summary (monthly)",
        }
    }

    pub fn time_unit(self) -> TimeUnit {
        match self {
            ChartPolicy::Detailed => TimeUnit::Day,
            ChartPolicy::Summary => TimeUnit::Month,
        }
    }

    pub fn toggled(self) -> ChartPolicy {
        match self {
            ChartPolicy::Detailed => ChartPolicy::Summary,
            ChartPolicy::Summary => ChartPolicy::Detailed,
        }
    }
}

/// Tick unit of the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Month,
}

impl TimeUnit {
    /// Tooltip format string in the widget's (date-fns) syntax.
    pub fn tooltip_format(self) -> &'static str {
        match self {
            TimeUnit::Day => "yyyy MMM dd",
            TimeUnit::Month => "MMM yyyy",
        }
    }

    /// Equivalent `chrono` format, used by the terminal renderers.
    pub fn strftime(self) -> &'static str {
        match self {
            TimeUnit::Day => "%Y %b %d",
            TimeUnit::Month => "%b %Y",
        }
    }
}

/// Options for `build_chart_models`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    /// One model is produced per entry, in order.
    pub policies: Vec<ChartPolicy>,
    /// Display-only label for the value axis.
    pub currency_symbol: String,
}

impl ChartConfig {
    pub fn new(policy: ChartPolicy) -> Self {
        Self {
            policies: vec![policy],
            ..Self::default()
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            policies: vec![ChartPolicy::Detailed],
            currency_symbol: "€".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub unit: TimeUnit,
    pub tooltip_format: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAxis {
    pub title: String,
    pub begin_at_zero: bool,
}

/// One named series plus its styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesModel {
    pub label: String,
    pub source: SeriesSource,
    pub values: Vec<Option<f64>>,
    pub fill: bool,
    pub tension: f64,
    pub border_color: String,
    pub background_color: Option<String>,
    pub point_radius: f64,
}

impl SeriesModel {
    /// Finite values only (missing points skipped).
    pub fn present_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().filter_map(|v| *v).filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartModel {
    pub policy: ChartPolicy,
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<SeriesModel>,
    pub x_axis: TimeAxis,
    pub y_axis: ValueAxis,
}

impl ChartModel {
    /// True when every series has exactly one value per label.
    pub fn is_aligned(&self) -> bool {
        self.series.iter().all(|s| s.values.len() == self.labels.len())
    }

    /// Min/max over every present value of every series.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in self.series.iter().flat_map(|s| s.present_values()) {
            min = min.min(v);
            max = max.max(v);
        }
        (min.is_finite() && max.is_finite()).then_some((min, max))
    }
}
