//! Export chart models as chart widget configurations.
//!
//! One model is written as a single JSON object; several models are written as
//! a JSON array in policy order.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use crate::chart::{ChartModel, to_widget_config};
use crate::error::AppError;

/// Write the widget configuration(s) for `models` to `path`.
pub fn write_chart_json(path: &Path, models: &[ChartModel]) -> Result<(), AppError> {
    if models.is_empty() {
        return Err(AppError::usage("No chart to export (no metrics loaded yet)."));
    }

    let doc = match models {
        [single] => to_widget_config(single),
        many => Value::Array(many.iter().map(to_widget_config).collect()),
    };

    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create chart JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &doc)
        .map_err(|e| AppError::usage(format!("Failed to write chart JSON: {e}")))?;

    log::info!("exported {} chart(s) to {}", models.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartConfig, ChartPolicy, build_chart_models};
    use crate::domain::{HistoryPoint, MetricsResponse};

    fn metrics() -> MetricsResponse {
        MetricsResponse {
            total_dividends: 0.0,
            total_fees: 0.0,
            fee_breakdown: None,
            profit_loss: 0.0,
            portfolio_value: 120.0,
            cash_balance: 0.0,
            annual_growth_rate: None,
            historical_portfolio_value: Some(vec![
                HistoryPoint::new("2024-01-01", 100.0),
                HistoryPoint::new("2024-02-01", 120.0),
            ]),
            historical_cashflow: None,
            combined_data: None,
        }
    }

    fn read_back(path: &Path) -> Value {
        let text = std::fs::read_to_string(path).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn single_model_is_written_as_object() {
        let models = build_chart_models(&metrics(), &ChartConfig::new(ChartPolicy::Summary));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");

        write_chart_json(&path, &models).unwrap();
        let doc = read_back(&path);

        assert_eq!(doc["type"], "line");
        assert_eq!(doc["data"]["datasets"][0]["data"], serde_json::json!([100.0, 120.0]));
    }

    #[test]
    fn several_models_are_written_as_array() {
        let config = ChartConfig {
            policies: vec![ChartPolicy::Detailed, ChartPolicy::Summary],
            currency_symbol: "€".to_string(),
        };
        let models = build_chart_models(&metrics(), &config);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts.json");

        write_chart_json(&path, &models).unwrap();
        let doc = read_back(&path);

        let charts = doc.as_array().unwrap();
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0]["data"]["datasets"].as_array().unwrap().len(), 3);
        assert_eq!(charts[1]["options"]["scales"]["x"]["time"]["unit"], "month");
    }

    #[test]
    fn nothing_to_export_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.json");
        assert!(write_chart_json(&path, &[]).is_err());
        assert!(!path.exists());
    }
}
