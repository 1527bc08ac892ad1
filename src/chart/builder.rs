//! Metrics payload -> chart models.
//!
//! The transformation is pure and total: any payload, including one with
//! missing or misaligned historical sequences, yields a model. Values are
//! copied in source order; nothing is sorted, resampled, gap-filled or
//! unit-converted.

use crate::chart::model::{
    ChartConfig, ChartModel, ChartPolicy, SeriesModel, TimeAxis, ValueAxis,
};
use crate::domain::{HistoryPoint, MetricsResponse, SeriesSource};

const TENSION: f64 = 0.4;
const POINT_RADIUS: f64 = 0.0;

struct SeriesSpec {
    label: &'static str,
    source: SeriesSource,
    fill: bool,
    border_color: &'static str,
    background_color: Option<&'static str>,
}

const DETAILED_SERIES: [SeriesSpec; 3] = [
    SeriesSpec {
        label: "Added Funds",
        source: SeriesSource::HistoricalCashflow,
        fill: false,
        border_color: "#007bff",
        background_color: Some("rgba(0, 123, 255, 0.1)"),
    },
    SeriesSpec {
        label: "Profit & Loss",
        source: SeriesSource::HistoricalPortfolioValue,
        fill: false,
        border_color: "red",
        background_color: None,
    },
    SeriesSpec {
        label: "Total Portfolio Value",
        source: SeriesSource::CombinedData,
        fill: true,
        border_color: "black",
        background_color: None,
    },
];

const SUMMARY_SERIES: [SeriesSpec; 1] = [SeriesSpec {
    label: "Portfolio Value",
    source: SeriesSource::HistoricalPortfolioValue,
    fill: true,
    border_color: "#007bff",
    background_color: Some("rgba(0, 123, 255, 0.1)"),
}];

fn series_specs(policy: ChartPolicy) -> &'static [SeriesSpec] {
    match policy {
        ChartPolicy::Detailed => &DETAILED_SERIES,
        ChartPolicy::Summary => &SUMMARY_SERIES,
    }
}

/// Build one chart model per policy in `config`.
pub fn build_chart_models(metrics: &MetricsResponse, config: &ChartConfig) -> Vec<ChartModel> {
    config
        .policies
        .iter()
        .map(|&policy| build_chart_model(metrics, policy, &config.currency_symbol))
        .collect()
}

/// Build the chart model for a single policy.
pub fn build_chart_model(metrics: &MetricsResponse, policy: ChartPolicy, currency_symbol: &str) -> ChartModel {
    let specs = series_specs(policy);

    let label_points = label_source(metrics, specs);
    let labels: Vec<String> = label_points.iter().map(|p| p.date.clone()).collect();

    let series: Vec<SeriesModel> = specs
        .iter()
        .map(|spec| {
            let points = metrics.series(spec.source);
            warn_if_misaligned(policy, spec, label_points, points);
            SeriesModel {
                label: spec.label.to_string(),
                source: spec.source,
                values: points.iter().map(|p| p.value).collect(),
                fill: spec.fill,
                tension: TENSION,
                border_color: spec.border_color.to_string(),
                background_color: spec.background_color.map(str::to_string),
                point_radius: POINT_RADIUS,
            }
        })
        .collect();

    let unit = policy.time_unit();
    ChartModel {
        policy,
        title: policy.display_name().to_string(),
        labels,
        series,
        x_axis: TimeAxis {
            unit,
            tooltip_format: unit.tooltip_format().to_string(),
            title: "Date".to_string(),
        },
        y_axis: ValueAxis {
            title: format!("Value ({currency_symbol})"),
            begin_at_zero: true,
        },
    }
}

/// Labels come from one sequence only: portfolio value history first, else
/// the first non-empty sequence the policy reads.
fn label_source<'a>(metrics: &'a MetricsResponse, specs: &[SeriesSpec]) -> &'a [HistoryPoint] {
    std::iter::once(SeriesSource::HistoricalPortfolioValue)
        .chain(specs.iter().map(|s| s.source))
        .map(|source| metrics.series(source))
        .find(|points| !points.is_empty())
        .unwrap_or(&[])
}

fn warn_if_misaligned(policy: ChartPolicy, spec: &SeriesSpec, labels: &[HistoryPoint], points: &[HistoryPoint]) {
    if points.is_empty() {
        log::warn!(
            "{policy:?} chart: `{}` is empty; '{}' renders with no values",
            spec.source.field_name(),
            spec.label
        );
        return;
    }
    if points.len() != labels.len() {
        log::warn!(
            "{policy:?} chart: `{}` has {} points but {} labels",
            spec.source.field_name(),
            points.len(),
            labels.len()
        );
        return;
    }
    let mismatched = labels.iter().zip(points).filter(|(l, p)| l.date != p.date).count();
    if mismatched > 0 {
        log::warn!(
            "{policy:?} chart: `{}` disagrees with the label dates at {mismatched} index(es)",
            spec.source.field_name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::model::TimeUnit;

    fn points(raw: &[(&str, f64)]) -> Vec<HistoryPoint> {
        raw.iter().map(|&(d, v)| HistoryPoint::new(d, v)).collect()
    }

    fn payload(
        portfolio: Option<Vec<HistoryPoint>>,
        cashflow: Option<Vec<HistoryPoint>>,
        combined: Option<Vec<HistoryPoint>>,
    ) -> MetricsResponse {
        MetricsResponse {
            total_dividends: 12.5,
            total_fees: 4.0,
            fee_breakdown: None,
            profit_loss: 20.0,
            portfolio_value: 1020.0,
            cash_balance: 30.0,
            annual_growth_rate: None,
            historical_portfolio_value: portfolio,
            historical_cashflow: cashflow,
            combined_data: combined,
        }
    }

    fn aligned_payload() -> MetricsResponse {
        payload(
            Some(points(&[("2024-01-01", 0.0), ("2024-01-02", 5.0), ("2024-01-03", -2.0)])),
            Some(points(&[("2024-01-01", 1000.0), ("2024-01-02", 1000.0), ("2024-01-03", 1100.0)])),
            Some(points(&[("2024-01-01", 1000.0), ("2024-01-02", 1005.0), ("2024-01-03", 1098.0)])),
        )
    }

    #[test]
    fn detailed_has_three_series_and_summary_one() {
        let metrics = aligned_payload();
        let detailed = build_chart_model(&metrics, ChartPolicy::Detailed, "€");
        let summary = build_chart_model(&metrics, ChartPolicy::Summary, "€");

        assert_eq!(detailed.series.len(), 3);
        assert_eq!(summary.series.len(), 1);

        // Cardinality holds even when every sequence is absent.
        let empty = payload(None, None, None);
        assert_eq!(build_chart_model(&empty, ChartPolicy::Detailed, "€").series.len(), 3);
        assert_eq!(build_chart_model(&empty, ChartPolicy::Summary, "€").series.len(), 1);
    }

    #[test]
    fn detailed_series_map_to_their_sources() {
        let model = build_chart_model(&aligned_payload(), ChartPolicy::Detailed, "€");
        let labels: Vec<&str> = model.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Added Funds", "Profit & Loss", "Total Portfolio Value"]);

        assert_eq!(model.series[0].values, vec![Some(1000.0), Some(1000.0), Some(1100.0)]);
        assert_eq!(model.series[1].values, vec![Some(0.0), Some(5.0), Some(-2.0)]);
        assert_eq!(model.series[2].values, vec![Some(1000.0), Some(1005.0), Some(1098.0)]);
        assert_eq!(
            model.series.iter().map(|s| s.fill).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(model.x_axis.unit, TimeUnit::Day);
        assert_eq!(model.x_axis.tooltip_format, "yyyy MMM dd");
        assert!(model.is_aligned());
    }

    #[test]
    fn summary_scenario_two_months() {
        let metrics = payload(
            Some(points(&[("2024-01-01", 100.0), ("2024-02-01", 120.0)])),
            None,
            None,
        );
        let models = build_chart_models(&metrics, &ChartConfig::new(ChartPolicy::Summary));

        assert_eq!(models.len(), 1);
        let model = &models[0];
        assert_eq!(model.labels, vec!["2024-01-01".to_string(), "2024-02-01".to_string()]);
        assert_eq!(model.series.len(), 1);
        assert_eq!(model.series[0].values, vec![Some(100.0), Some(120.0)]);
        assert!(model.series[0].fill);
        assert_eq!(model.x_axis.unit, TimeUnit::Month);
        assert_eq!(model.x_axis.tooltip_format, "MMM yyyy");
    }

    #[test]
    fn summary_lengths_match_portfolio_history() {
        for n in [0usize, 1, 7, 31] {
            let history: Vec<HistoryPoint> = (0..n)
                .map(|i| HistoryPoint::new(format!("2024-01-{:02}", i + 1), i as f64))
                .collect();
            let metrics = payload(Some(history), None, None);
            let model = build_chart_model(&metrics, ChartPolicy::Summary, "€");
            assert_eq!(model.labels.len(), n);
            assert_eq!(model.series[0].values.len(), n);
        }
    }

    #[test]
    fn building_twice_is_structurally_equal() {
        let metrics = aligned_payload();
        let config = ChartConfig {
            policies: vec![ChartPolicy::Detailed, ChartPolicy::Summary],
            currency_symbol: "$".to_string(),
        };
        let first = build_chart_models(&metrics, &config);
        let second = build_chart_models(&metrics, &config);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].policy, ChartPolicy::Summary);
    }

    #[test]
    fn missing_sequence_keeps_an_empty_series() {
        let metrics = payload(
            Some(points(&[("2024-01-01", 1.0), ("2024-01-02", 2.0)])),
            None,
            Some(Vec::new()),
        );
        let model = build_chart_model(&metrics, ChartPolicy::Detailed, "€");

        assert_eq!(model.series[0].label, "Added Funds");
        assert!(model.series[0].values.is_empty());
        assert!(model.series[2].values.is_empty());
        assert_eq!(model.labels.len(), 2);
        assert!(!model.is_aligned());
    }

    #[test]
    fn misaligned_sequences_are_passed_through() {
        let metrics = payload(
            Some(points(&[("2024-01-01", 1.0), ("2024-01-02", 2.0)])),
            Some(points(&[("2024-01-01", 10.0), ("2024-01-02", 20.0), ("2024-01-03", 30.0)])),
            Some(points(&[("2024-01-05", 7.0), ("2024-01-06", 8.0)])),
        );
        let model = build_chart_model(&metrics, ChartPolicy::Detailed, "€");

        assert_eq!(model.labels, vec!["2024-01-01".to_string(), "2024-01-02".to_string()]);
        assert_eq!(model.series[0].values.len(), 3);
        assert_eq!(model.series[2].values, vec![Some(7.0), Some(8.0)]);
    }

    #[test]
    fn labels_fall_back_when_portfolio_history_is_empty() {
        let metrics = payload(None, Some(points(&[("2024-03-01", 5.0)])), None);
        let detailed = build_chart_model(&metrics, ChartPolicy::Detailed, "€");
        let summary = build_chart_model(&metrics, ChartPolicy::Summary, "€");

        assert_eq!(detailed.labels, vec!["2024-03-01".to_string()]);
        assert!(summary.labels.is_empty());
    }

    #[test]
    fn source_order_and_nulls_are_preserved() {
        let mut history = points(&[("2024-01-03", 3.0), ("2024-01-01", 1.0), ("2024-01-02", 2.0)]);
        history[1].value = None;
        let metrics = payload(Some(history), None, None);
        let model = build_chart_model(&metrics, ChartPolicy::Summary, "€");

        assert_eq!(model.labels[0], "2024-01-03");
        assert_eq!(model.series[0].values, vec![Some(3.0), None, Some(2.0)]);
    }

    #[test]
    fn currency_only_touches_axis_title() {
        let metrics = aligned_payload();
        let euro = build_chart_model(&metrics, ChartPolicy::Detailed, "€");
        let dollar = build_chart_model(&metrics, ChartPolicy::Detailed, "$");

        assert_eq!(euro.y_axis.title, "Value (€)");
        assert_eq!(dollar.y_axis.title, "Value ($)");
        assert_eq!(euro.series, dollar.series);
        assert!(euro.y_axis.begin_at_zero);
    }
}
