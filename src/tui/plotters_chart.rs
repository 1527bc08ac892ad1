//! Plotters-powered metrics chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{NaiveDate, TimeDelta};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{ChartModel, TimeUnit};
use crate::plot::{x_axis, x_range, y_range};

/// One series, split into drawable runs at missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub label: String,
    pub color: RGBColor,
    pub segments: Vec<Vec<(f64, f64)>>,
}

/// Plot-ready data for one chart model.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedChart {
    pub lines: Vec<PlotLine>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_origin: Option<NaiveDate>,
    pub unit: TimeUnit,
}

impl PreparedChart {
    /// `None` when the model has no value to draw.
    pub fn from_model(model: &ChartModel) -> Option<Self> {
        let (y0, y1) = y_range(model)?;
        let axis = x_axis(model);
        let (x0, x1) = x_range(&axis.positions);

        let lines = model
            .series
            .iter()
            .map(|series| {
                let mut segments: Vec<Vec<(f64, f64)>> = Vec::new();
                let mut current = Vec::new();
                for (i, value) in series.values.iter().enumerate() {
                    match (axis.positions.get(i), value.filter(|v| v.is_finite())) {
                        (Some(&x), Some(y)) => current.push((x, y)),
                        _ => {
                            if !current.is_empty() {
                                segments.push(std::mem::take(&mut current));
                            }
                        }
                    }
                }
                if !current.is_empty() {
                    segments.push(current);
                }
                PlotLine {
                    label: series.label.clone(),
                    color: parse_color(&series.border_color),
                    segments,
                }
            })
            .collect();

        Some(Self {
            lines,
            x_bounds: [x0, x1],
            y_bounds: [y0, y1],
            x_origin: axis.origin,
            unit: model.x_axis.unit,
        })
    }
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call
/// (`PreparedChart::from_model`).
pub struct FolioPlottersChart<'a> {
    pub chart: &'a PreparedChart,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for FolioPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.chart.x_bounds;
        let [y0, y1] = self.chart.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let origin = self.chart.x_origin;
        let unit = self.chart.unit;
        let lines = &self.chart.lines;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| fmt_date_tick(*v, origin, unit))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Filled series are drawn as plain lines; the terminal has no area fill.
            for line in lines {
                for segment in &line.segments {
                    if let [single] = segment.as_slice() {
                        chart.draw_series(std::iter::once(Pixel::new(*single, line.color)))?;
                    } else {
                        chart.draw_series(LineSeries::new(segment.iter().copied(), &line.color))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Ratatui color matching a plot line (for legends drawn outside Plotters).
pub fn legend_color(color: RGBColor) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

/// Parse a CSS color (`#rrggbb`, `rgb(...)`/`rgba(...)` or a basic name).
///
/// Black is mapped to white so it stays visible on dark terminals; unknown
/// colors fall back to cyan.
pub fn parse_color(css: &str) -> RGBColor {
    let css = css.trim();

    if let Some(hex) = css.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return visible(RGBColor(r, g, b));
            }
        }
    }

    let inner = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'));
    if let Some(inner) = inner {
        let channels: Vec<u8> = inner
            .split(',')
            .take(3)
            .filter_map(|c| c.trim().parse().ok())
            .collect();
        if let &[r, g, b] = channels.as_slice() {
            return visible(RGBColor(r, g, b));
        }
    }

    match css.to_ascii_lowercase().as_str() {
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 255, 0),
        "blue" => RGBColor(0, 123, 255),
        "black" | "white" => WHITE,
        _ => RGBColor(0, 255, 255),
    }
}

fn visible(color: RGBColor) -> RGBColor {
    if color == RGBColor(0, 0, 0) { WHITE } else { color }
}

/// Tick label for an x position: a date when the labels are dates, else the index.
pub fn fmt_date_tick(x: f64, origin: Option<NaiveDate>, unit: TimeUnit) -> String {
    let date = origin.and_then(|o| {
        TimeDelta::try_days(x.round() as i64).and_then(|delta| o.checked_add_signed(delta))
    });
    match date {
        Some(date) => date.format(unit.strftime()).to_string(),
        None => format!("{x:.0}"),
    }
}
