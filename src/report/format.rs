//! Metrics summary view and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the session and chart code stay free of display rules
//! - output changes are localized (important for snapshot tests)

use crate::domain::{FileSelection, FileSlot, MetricsResponse};
use crate::session::UploadSession;

/// One scalar metric ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricField {
    pub label: &'static str,
    pub value: String,
}

/// Display-ready projection of a `MetricsResponse`.
///
/// Optional payload fields that are absent produce no element at all: there
/// is no growth-rate field without `annual_growth_rate`, and no fee list
/// without `fee_breakdown`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsView {
    pub fields: Vec<MetricField>,
    /// `(category, amount)` pairs, alphabetical by category.
    pub fee_breakdown: Option<Vec<(String, String)>>,
}

/// One display row, in on-screen order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricRow<'a> {
    Field(&'a MetricField),
    Fees(&'a [(String, String)]),
}

impl MetricsView {
    pub fn field(&self, label: &str) -> Option<&MetricField> {
        self.fields.iter().find(|f| f.label == label)
    }

    /// Fields in order, with the fee list (when present) right after Total Fees.
    pub fn rows(&self) -> Vec<MetricRow<'_>> {
        let mut rows = Vec::with_capacity(self.fields.len() + 1);
        for field in &self.fields {
            rows.push(MetricRow::Field(field));
            if field.label == TOTAL_FEES_LABEL {
                if let Some(fees) = &self.fee_breakdown {
                    rows.push(MetricRow::Fees(fees));
                }
            }
        }
        rows
    }
}

pub const TOTAL_FEES_LABEL: &str = "Total Fees";
pub const GROWTH_RATE_LABEL: &str = "Annual Growth Rate";

pub fn metrics_view(metrics: &MetricsResponse, currency_symbol: &str) -> MetricsView {
    let money = |v: f64| fmt_money(v, currency_symbol);

    let mut fields = vec![
        MetricField { label: "Total Dividends", value: money(metrics.total_dividends) },
        MetricField { label: TOTAL_FEES_LABEL, value: money(metrics.total_fees) },
        MetricField { label: "Profit/Loss", value: money(metrics.profit_loss) },
        MetricField { label: "Portfolio Value", value: money(metrics.portfolio_value) },
        MetricField { label: "Cash Balance", value: money(metrics.cash_balance) },
    ];
    if let Some(rate) = metrics.annual_growth_rate {
        fields.push(MetricField {
            label: GROWTH_RATE_LABEL,
            value: format!("{rate:.2}%"),
        });
    }

    let fee_breakdown = metrics.fee_breakdown.as_ref().map(|fees| {
        fees.iter()
            .map(|(category, amount)| (category.clone(), money(*amount)))
            .collect()
    });

    MetricsView { fields, fee_breakdown }
}

/// Format the metrics block printed after a successful upload.
pub fn format_metrics_summary(view: &MetricsView) -> String {
    let mut out = String::new();
    out.push_str("Metrics:\n");

    let width = view.fields.iter().map(|f| f.label.len()).max().unwrap_or(0);
    for row in view.rows() {
        match row {
            MetricRow::Field(field) => {
                out.push_str(&format!("  {:<width$} : {}\n", field.label, field.value));
            }
            MetricRow::Fees(fees) => {
                out.push_str("  Fee Breakdown:\n");
                if fees.is_empty() {
                    out.push_str("    (none)\n");
                }
                for (category, amount) in fees {
                    out.push_str(&format!("    - {category}: {amount}\n"));
                }
            }
        }
    }

    out
}

/// Format the selected files, one line per slot.
pub fn format_selection(selection: &FileSelection) -> String {
    let mut out = String::new();
    for slot in FileSlot::ALL {
        let file = selection
            .get(slot)
            .map(|f| format!("{} ({} bytes)", f.file_name, f.len()))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<12} {file}\n", format!("{}:", slot.display_name())));
    }
    out
}

/// Full run summary for the CLI: files, error (if any), metrics.
pub fn format_session_summary(session: &UploadSession, currency_symbol: &str) -> String {
    let mut out = String::new();
    out.push_str("=== folio - portfolio metrics ===\n");
    out.push_str(&format_selection(session.selection()));

    if let Some(err) = session.last_error() {
        out.push_str(&format!("\n{}\n", err.message));
    }

    match session.last_metrics() {
        Some(metrics) => {
            out.push('\n');
            out.push_str(&format_metrics_summary(&metrics_view(metrics, currency_symbol)));
        }
        None => out.push_str("\nNo metrics yet.\n"),
    }

    out
}

pub fn fmt_money(value: f64, currency_symbol: &str) -> String {
    if value.is_finite() {
        format!("{value:.2} {currency_symbol}")
    } else {
        "-".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::SelectedFile;
    use crate::session::{ErrorInfo, ErrorKind, UPLOAD_FAILED_MESSAGE};

    fn metrics() -> MetricsResponse {
        MetricsResponse {
            total_dividends: 12.5,
            total_fees: 3.25,
            fee_breakdown: None,
            profit_loss: -40.0,
            portfolio_value: 1040.0,
            cash_balance: 15.0,
            annual_growth_rate: None,
            historical_portfolio_value: None,
            historical_cashflow: None,
            combined_data: None,
        }
    }

    #[test]
    fn growth_rate_hidden_when_absent() {
        let view = metrics_view(&metrics(), "€");
        assert!(view.field(GROWTH_RATE_LABEL).is_none());
        assert!(!format_metrics_summary(&view).contains(GROWTH_RATE_LABEL));
    }

    #[test]
    fn growth_rate_shown_when_present_even_if_zero() {
        let mut m = metrics();
        m.annual_growth_rate = Some(0.0);
        let view = metrics_view(&m, "€");
        assert_eq!(view.field(GROWTH_RATE_LABEL).map(|f| f.value.as_str()), Some("0.00%"));
    }

    #[test]
    fn missing_fee_breakdown_renders_no_list() {
        let view = metrics_view(&metrics(), "€");
        assert!(view.fee_breakdown.is_none());
        assert!(!format_metrics_summary(&view).contains("Fee Breakdown"));
    }

    #[test]
    fn fee_breakdown_lists_every_category() {
        let mut m = metrics();
        m.fee_breakdown = Some(BTreeMap::from([
            ("Transaction Fees".to_string(), 2.0),
            ("Exchange Fees".to_string(), 1.25),
        ]));
        let view = metrics_view(&m, "€");
        let fees = view.fee_breakdown.as_ref().unwrap();
        assert_eq!(fees.len(), 2);
        assert!(fees.contains(&("Transaction Fees".to_string(), "2.00 €".to_string())));

        let text = format_metrics_summary(&view);
        assert!(text.contains("    - Exchange Fees: 1.25 €\n"));
    }

    #[test]
    fn summary_golden_small() {
        let mut m = metrics();
        m.annual_growth_rate = Some(7.5);
        let text = format_metrics_summary(&metrics_view(&m, "€"));
        let expected = concat!(
            "Metrics:\n",
            "  Total Dividends    : 12.50 €\n",
            "  Total Fees         : 3.25 €\n",
            "  Profit/Loss        : -40.00 €\n",
            "  Portfolio Value    : 1040.00 €\n",
            "  Cash Balance       : 15.00 €\n",
            "  Annual Growth Rate : 7.50%\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn fee_breakdown_sits_between_total_fees_and_profit_loss() {
        let mut m = metrics();
        m.fee_breakdown = Some(BTreeMap::from([
            ("Transaction Fees".to_string(), 2.0),
            ("Exchange Fees".to_string(), 1.25),
        ]));
        let text = format_metrics_summary(&metrics_view(&m, "€"));
        let expected = concat!(
            "Metrics:\n",
            "  Total Dividends : 12.50 €\n",
            "  Total Fees      : 3.25 €\n",
            "  Fee Breakdown:\n",
            "    - Exchange Fees: 1.25 €\n",
            "    - Transaction Fees: 2.00 €\n",
            "  Profit/Loss     : -40.00 €\n",
            "  Portfolio Value : 1040.00 €\n",
            "  Cash Balance    : 15.00 €\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn session_summary_shows_error_and_stale_metrics() {
        let mut session = UploadSession::default();
        session.set_file(FileSlot::Account, SelectedFile::new("account.csv", b"abc".to_vec()));
        session.apply_metrics(metrics());
        session.apply_error(ErrorInfo {
            kind: ErrorKind::Transport,
            status: None,
            message: UPLOAD_FAILED_MESSAGE.to_string(),
            cause: "connection refused".to_string(),
        });

        let text = format_session_summary(&session, "€");
        assert!(text.contains("Account:     account.csv (3 bytes)"));
        assert!(text.contains("Transactions: -\n"));
        assert!(text.contains(UPLOAD_FAILED_MESSAGE));
        assert!(!text.contains("connection refused"));
        assert!(text.contains("Portfolio Value"));
    }
}
