//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each series gets its own glyph; a missing value breaks the line.

use chrono::NaiveDate;

use crate::chart::ChartModel;

const GLYPHS: [char; 4] = ['*', '+', '#', 'o'];

/// Render a chart model into a `width` x `height` character grid, with a header
/// line above and a legend below.
pub fn render_ascii_chart(model: &ChartModel, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&format!("{} | {}\n", model.title, model.y_axis.title));

    let xs = x_axis(model).positions;
    let Some((y_min, y_max)) = y_range(model) else {
        out.push_str("Plot: (no data)\n");
        out.push_str(&legend(model));
        return out;
    };
    let (x_min, x_max) = x_range(&xs);

    let mut grid = vec![vec![' '; width]; height];
    for (idx, series) in model.series.iter().enumerate() {
        let glyph = GLYPHS[idx % GLYPHS.len()];
        let mut prev: Option<(usize, usize)> = None;
        for (i, value) in series.values.iter().enumerate() {
            let (Some(&x), Some(y)) = (xs.get(i), value.filter(|v| v.is_finite())) else {
                prev = None;
                continue;
            };
            let cell = (map_x(x, x_min, x_max, width), map_y(y, y_min, y_max, height));
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, cell.0, cell.1, glyph),
                None => plot_cell(&mut grid, cell.0, cell.1, glyph),
            }
            prev = Some(cell);
        }
    }

    let first = model.labels.first().map(String::as_str).unwrap_or("-");
    let last = model.labels.last().map(String::as_str).unwrap_or("-");
    out.push_str(&format!("Plot: {first}..{last} | y=[{y_min:.2}, {y_max:.2}]\n"));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out.push_str(&legend(model));
    out
}

fn legend(model: &ChartModel) -> String {
    let entries: Vec<String> = model
        .series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{} {}", GLYPHS[idx % GLYPHS.len()], s.label))
        .collect();
    format!("  {}\n", entries.join("  "))
}

/// X coordinates for a model's value indices.
#[derive(Debug, Clone, PartialEq)]
pub struct XAxis {
    /// Date of the first label when every label is a `YYYY-MM-DD` date.
    pub origin: Option<NaiveDate>,
    pub positions: Vec<f64>,
}

/// Days since the first label when every label is a date, otherwise the
/// plain index. Values past the end of the labels have no position in date
/// mode and are not plotted.
pub fn x_axis(model: &ChartModel) -> XAxis {
    let dates: Option<Vec<NaiveDate>> = model
        .labels
        .iter()
        .map(|l| NaiveDate::parse_from_str(l, "%Y-%m-%d").ok())
        .collect();

    match dates {
        Some(dates) if !dates.is_empty() => {
            let origin = dates[0];
            XAxis {
                origin: Some(origin),
                positions: dates.iter().map(|d| (*d - origin).num_days() as f64).collect(),
            }
        }
        _ => {
            let n = model
                .series
                .iter()
                .map(|s| s.values.len())
                .chain(std::iter::once(model.labels.len()))
                .max()
                .unwrap_or(0);
            XAxis {
                origin: None,
                positions: (0..n).map(|i| i as f64).collect(),
            }
        }
    }
}

/// Min/max of the x positions, widened when there is a single point.
pub fn x_range(xs: &[f64]) -> (f64, f64) {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() && max > min {
        (min, max)
    } else if min.is_finite() {
        (min, min + 1.0)
    } else {
        (0.0, 1.0)
    }
}

/// Padded value range, including zero when the axis begins at zero.
pub fn y_range(model: &ChartModel) -> Option<(f64, f64)> {
    let (mut min, mut max) = model.value_range()?;
    if model.y_axis.begin_at_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    if max <= min {
        max = min + 1.0;
    }
    Some(pad_range(min, max, 0.05))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn plot_cell(grid: &mut [Vec<char>], x: usize, y: usize, ch: char) {
    if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 {
            plot_cell(grid, x0 as usize, y0 as usize, ch);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartPolicy, build_chart_model};
    use crate::domain::{HistoryPoint, MetricsResponse};

    fn metrics(portfolio: Vec<HistoryPoint>) -> MetricsResponse {
        MetricsResponse {
            total_dividends: 0.0,
            total_fees: 0.0,
            fee_breakdown: None,
            profit_loss: 0.0,
            portfolio_value: 0.0,
            cash_balance: 0.0,
            annual_growth_rate: None,
            historical_portfolio_value: Some(portfolio),
            historical_cashflow: None,
            combined_data: None,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let m = metrics(vec![
            HistoryPoint::new("2024-01-01", 100.0),
            HistoryPoint::new("2024-02-01", 120.0),
        ]);
        let model = build_chart_model(&m, ChartPolicy::Summary, "€");

        let txt = render_ascii_chart(&model, 10, 5);
        let expected = concat!(
            "Summary (monthly) | Value (€)\n",
            "Plot: 2024-01-01..2024-02-01 | y=[-6.00, 126.00]\n",
            "     *****\n",
            "*****     \n",
            "          \n",
            "          \n",
            "          \n",
            "  * Portfolio Value\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn x_axis_uses_days_for_dates_and_index_otherwise() {
        let m = metrics(vec![
            HistoryPoint::new("2024-01-01", 1.0),
            HistoryPoint::new("2024-01-31", 2.0),
        ]);
        let model = build_chart_model(&m, ChartPolicy::Summary, "€");
        let axis = x_axis(&model);
        assert_eq!(axis.origin, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(axis.positions, vec![0.0, 30.0]);

        let m = metrics(vec![HistoryPoint::new("Jan", 1.0), HistoryPoint::new("Feb", 2.0)]);
        let axis = x_axis(&build_chart_model(&m, ChartPolicy::Summary, "€"));
        assert_eq!(axis.origin, None);
        assert_eq!(axis.positions, vec![0.0, 1.0]);
    }

    #[test]
    fn empty_model_renders_placeholder() {
        let model = build_chart_model(&metrics(Vec::new()), ChartPolicy::Detailed, "€");
        let txt = render_ascii_chart(&model, 20, 6);
        assert!(txt.contains("Plot: (no data)"));
        assert!(txt.contains("* Added Funds  + Profit & Loss  # Total Portfolio Value"));
    }

    #[test]
    fn missing_values_leave_a_gap() {
        let mut history: Vec<HistoryPoint> = (1..=9)
            .map(|d| HistoryPoint::new(format!("2024-01-{d:02}"), 50.0))
            .collect();
        history[4].value = None;
        let model = build_chart_model(&metrics(history), ChartPolicy::Summary, "€");

        let txt = render_ascii_chart(&model, 10, 5);
        let plotted_row = txt.lines().nth(2).unwrap();
        assert_eq!(plotted_row, "****  ****");
    }
}
