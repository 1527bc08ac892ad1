//! Chart widget data contract.
//!
//! Converts a `ChartModel` into the line-chart configuration the charting
//! widget consumes (labels + datasets + time/value axis options). Missing
//! values become `null` so the widget draws a gap.

use serde_json::{Value, json};

use crate::chart::model::{ChartModel, SeriesModel, TimeUnit};

/// Full widget configuration for one model.
pub fn to_widget_config(model: &ChartModel) -> Value {
    json!({
        "type": "line",
        "data": {
            "labels": model.labels,
            "datasets": model.series.iter().map(dataset).collect::<Vec<_>>(),
        },
        "options": {
            "maintainAspectRatio": false,
            "scales": {
                "x": {
                    "type": "time",
                    "time": {
                        "unit": unit_name(model.x_axis.unit),
                        "tooltipFormat": model.x_axis.tooltip_format,
                    },
                    "title": { "display": true, "text": model.x_axis.title },
                },
                "y": {
                    "title": { "display": true, "text": model.y_axis.title },
                    "beginAtZero": model.y_axis.begin_at_zero,
                },
            },
            "plugins": {
                "legend": { "display": true, "position": "top" },
            },
        },
    })
}

fn dataset(series: &SeriesModel) -> Value {
    let mut out = json!({
        "label": series.label,
        "data": series.values,
        "fill": series.fill,
        "tension": series.tension,
        "borderColor": series.border_color,
        "pointRadius": series.point_radius,
    });
    if let (Some(bg), Some(obj)) = (&series.background_color, out.as_object_mut()) {
        obj.insert("backgroundColor".to_string(), Value::String(bg.clone()));
    }
    out
}

fn unit_name(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Day => "day",
        TimeUnit::Month => "month",
    }
}
