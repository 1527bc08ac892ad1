//! Terminal plotting for chart models.

pub mod ascii;

pub use ascii::{XAxis, render_ascii_chart, x_axis, x_range, y_range};
