//! Ratatui-based terminal UI.
//!
//! The TUI shows the selected exports, submits them in the background, and
//! renders the resulting metrics and charts. Previous metrics stay on screen
//! while a request is in flight or after it fails.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{Submitter, derive_charts};
use crate::chart::{ChartConfig, ChartModel};
use crate::cli::UploadArgs;
use crate::cli::picker::validate_csv_path;
use crate::data::{AnalysisService, HttpAnalysisService};
use crate::domain::{FileSlot, SelectedFile};
use crate::error::AppError;
use crate::report::{MetricRow, MetricsView, metrics_view};
use crate::session::{Resolution, Ticket, UploadSession};

mod plotters_chart;

use plotters_chart::{FolioPlottersChart, PreparedChart, legend_color};

/// Export path used by `e` when `--export-chart` was not given.
const DEFAULT_EXPORT_PATH: &str = "folio-chart.json";

/// Start the TUI.
pub fn run(args: UploadArgs) -> Result<(), AppError> {
    // File picking and service setup happen before we take over the terminal.
    let session = crate::app::session_from_args(&args)?;
    let config = crate::app::service_config_from_args(&args)?;
    let service = HttpAnalysisService::new(&config)?;
    let mut app = App::new(
        session,
        Arc::new(service),
        crate::app::chart_config_from_args(&args.chart),
        config.upload_url(),
        args.chart.export_chart.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH)),
    );

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// A slot being re-selected from a typed path.
struct SlotEdit {
    slot: FileSlot,
    input: String,
}

struct App {
    session: UploadSession,
    submitter: Submitter,
    config: ChartConfig,
    charts: Vec<ChartModel>,
    prepared: Vec<Option<PreparedChart>>,
    selected_chart: usize,
    seen_revision: u64,
    service_url: String,
    export_path: PathBuf,
    editing: Option<SlotEdit>,
    status: String,
}

impl App {
    fn new(
        session: UploadSession,
        service: Arc<dyn AnalysisService>,
        config: ChartConfig,
        service_url: String,
        export_path: PathBuf,
    ) -> Self {
        let mut app = Self {
            seen_revision: session.revision(),
            session,
            submitter: Submitter::new(service),
            config,
            charts: Vec::new(),
            prepared: Vec::new(),
            selected_chart: 0,
            service_url,
            export_path,
            editing: None,
            status: "Press s to submit the selected files.".to_string(),
        };
        app.refresh_charts();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_submits() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }

        if self.submitter.is_busy() {
            log::info!("quitting with {} request(s) in flight", self.submitter.in_flight());
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing.is_some() {
            self.handle_edit_key(code);
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('s') => {
                let ticket = self.submitter.start(&mut self.session);
                self.status = format!("Submitting {ticket}...");
            }
            KeyCode::Char('p') => {
                self.config.policies = self.config.policies.iter().map(|p| p.toggled()).collect();
                self.refresh_charts();
                let names: Vec<&str> = self.config.policies.iter().map(|p| p.display_name()).collect();
                self.status = format!("Chart policy: {}", names.join(", "));
            }
            KeyCode::Tab => {
                if !self.charts.is_empty() {
                    self.selected_chart = (self.selected_chart + 1) % self.charts.len();
                }
            }
            KeyCode::Char('e') => self.export_current_chart(),
            KeyCode::Char(c @ '1'..='3') => {
                let slot = FileSlot::ALL[c as usize - '1' as usize];
                self.editing = Some(SlotEdit {
                    slot,
                    input: String::new(),
                });
                self.status = format!("Path for {slot} (enter applies, empty clears, esc cancels)");
            }
            _ => {}
        }
        false
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Selection unchanged.".to_string();
            }
            KeyCode::Enter => {
                if let Some(edit) = self.editing.take() {
                    self.apply_slot_edit(edit);
                }
            }
            KeyCode::Backspace => {
                if let Some(edit) = self.editing.as_mut() {
                    edit.input.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(edit) = self.editing.as_mut() {
                    edit.input.push(c);
                }
            }
            _ => {}
        }
    }

    /// Empty input clears the slot; a bad path leaves the selection as it was.
    fn apply_slot_edit(&mut self, edit: SlotEdit) {
        let input = edit.input.trim();
        if input.is_empty() {
            self.session.clear_file(edit.slot);
            self.status = format!("Cleared {}.", edit.slot);
            return;
        }

        let selected = validate_csv_path(Path::new(input)).and_then(|path| SelectedFile::from_path(&path));
        self.status = match selected {
            Ok(file) => {
                let status = format!("Selected {}: {}", edit.slot, file.file_name);
                self.session.set_file(edit.slot, file);
                status
            }
            Err(err) => err.to_string(),
        };
    }

    /// Apply finished submits; returns `true` when anything changed.
    fn poll_submits(&mut self) -> bool {
        let resolved = self.submitter.poll(&mut self.session);
        for (ticket, resolution) in &resolved {
            self.status = self.resolution_status(*ticket, *resolution);
        }
        if self.session.revision() != self.seen_revision {
            self.refresh_charts();
        }
        !resolved.is_empty()
    }

    fn resolution_status(&self, ticket: Ticket, resolution: Resolution) -> String {
        match resolution {
            Resolution::Superseded { latest } => {
                format!("Discarded response {ticket} (superseded by {latest}).")
            }
            Resolution::Applied => match self.session.last_error() {
                Some(err) => err.message.clone(),
                None => format!("Metrics updated ({ticket})."),
            },
        }
    }

    fn refresh_charts(&mut self) {
        self.charts = derive_charts(&self.session, &self.config);
        self.prepared = self.charts.iter().map(PreparedChart::from_model).collect();
        if self.selected_chart >= self.charts.len() {
            self.selected_chart = 0;
        }
        self.seen_revision = self.session.revision();
    }

    fn export_current_chart(&mut self) {
        let Some(chart) = self.charts.get(self.selected_chart) else {
            self.status = "No chart to export yet.".to_string();
            return;
        };
        self.status = match crate::io::write_chart_json(&self.export_path, std::slice::from_ref(chart)) {
            Ok(()) => format!("Exported chart to {}", self.export_path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("folio", Style::default().fg(Color::Cyan)),
            Span::raw(" | portfolio metrics"),
        ]));

        let files: Vec<String> = FileSlot::ALL
            .iter()
            .map(|&slot| {
                let name = self
                    .session
                    .selection()
                    .get(slot)
                    .map(|f| f.file_name.as_str())
                    .unwrap_or("-");
                format!("{slot}: {name}")
            })
            .collect();
        lines.push(Line::from(Span::styled(files.join(" | "), Style::default().fg(Color::Gray))));

        let request = if self.submitter.is_busy() {
            format!("{} request(s) in flight", self.submitter.in_flight())
        } else {
            "idle".to_string()
        };
        lines.push(Line::from(Span::styled(
            format!("service: {} | {request}", self.service_url),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(42), Constraint::Min(0)])
            .split(area);

        self.draw_metrics(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Metrics").borders(Borders::ALL);

        let Some(metrics) = self.session.last_metrics() else {
            let msg = Paragraph::new("No metrics yet.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        };

        let view = metrics_view(metrics, &self.config.currency_symbol);
        frame.render_widget(Paragraph::new(Text::from(metric_lines(&view))).block(block), area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.charts.get(self.selected_chart) {
            Some(chart) => format!("{} ({}/{})", chart.title, self.selected_chart + 1, self.charts.len()),
            None => "Chart".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (Some(chart), Some(Some(prepared))) =
            (self.charts.get(self.selected_chart), self.prepared.get(self.selected_chart))
        else {
            let msg = Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        let legend: Vec<Span> = prepared
            .lines
            .iter()
            .flat_map(|line| {
                [
                    Span::styled("── ", Style::default().fg(legend_color(line.color))),
                    Span::raw(format!("{}  ", line.label)),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(legend)), chunks[0]);

        let widget = FolioPlottersChart {
            chart: prepared,
            x_label: &chart.x_axis.title,
            y_label: &chart.y_axis.title,
        };
        frame.render_widget(widget, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some(edit) = &self.editing {
            let line = Line::from(vec![
                Span::styled(format!("{} path: ", edit.slot), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{}_", edit.input)),
            ]);
            let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let help = "1-3 choose file  s submit  p policy  tab next chart  e export  q quit";
        let status_style = if self.session.last_error().is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Metric rows for the side panel; the fee list follows Total Fees.
fn metric_lines(view: &MetricsView) -> Vec<Line<'static>> {
    let width = view.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
    let mut lines = Vec::new();
    for row in view.rows() {
        match row {
            MetricRow::Field(f) => lines.push(Line::from(vec![
                Span::styled(format!("{:<width$} ", f.label), Style::default().fg(Color::Gray)),
                Span::raw(f.value.clone()),
            ])),
            MetricRow::Fees(fees) => {
                lines.push(Line::from(Span::styled(
                    "Fee Breakdown",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                if fees.is_empty() {
                    lines.push(Line::raw("  (none)"));
                }
                for (category, amount) in fees {
                    lines.push(Line::raw(format!("  {category}: {amount}")));
                }
            }
        }
    }
    lines
}
