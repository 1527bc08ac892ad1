//! Drives the real HTTP client against a one-shot loopback server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use folio_charts::app::pipeline::submit_blocking;
use folio_charts::data::{HttpAnalysisService, ServiceConfig};
use folio_charts::domain::{FileSlot, HistoryPoint, MetricsResponse, SelectedFile};
use folio_charts::session::{ErrorKind, Resolution, StalePolicy, UploadSession};

const METRICS_JSON: &str = r#"{
    "total_dividends": 12.5,
    "total_fees": 3.0,
    "fee_breakdown": {"Transaction Fees": 3.0},
    "profit_loss": 20.0,
    "portfolio_value": 1020.0,
    "cash_balance": 15.0,
    "annual_growth_rate": 0,
    "historical_portfolio_value": [
        {"date": "2024-01-01", "value": 100.0},
        {"date": "2024-02-01", "value": 120.0}
    ],
    "historical_cashflow": null
}"#;

/// Accept one request, reply with `status` and `body`, hand back the raw request.
fn serve_once(status: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let request = read_request(&mut stream);

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();
        request
    });

    (addr, handle)
}

/// Read headers, then the multipart body up to its closing boundary.
fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut closing: Option<String> = None;

    loop {
        let text = String::from_utf8_lossy(&buf).to_string();
        if closing.is_none() && text.contains("\r\n\r\n") {
            let boundary = text
                .lines()
                .find(|l| l.to_ascii_lowercase().starts_with("content-type:"))
                .and_then(|l| l.split("boundary=").nth(1))
                .map(|b| b.trim().trim_matches('"').to_string());
            closing = Some(match boundary {
                Some(b) => format!("--{b}--"),
                None => "\r\n\r\n".to_string(),
            });
        }
        if let Some(marker) = &closing {
            let body_start = text.find("\r\n\r\n").map_or(0, |i| i + 4);
            if text[body_start..].contains(marker.as_str()) || marker == "\r\n\r\n" {
                return text;
            }
        }

        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return String::from_utf8_lossy(&buf).to_string(),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn service_for(addr: SocketAddr) -> HttpAnalysisService {
    let config = ServiceConfig {
        base_url: format!("http://{addr}"),
        timeout: Duration::from_secs(5),
    };
    HttpAnalysisService::new(&config).unwrap()
}

fn account_only_session() -> UploadSession {
    let mut session = UploadSession::new(StalePolicy::LatestInitiated);
    session.set_file(
        FileSlot::Account,
        SelectedFile::new("account.csv", b"Date,Amount\n2024-01-01,100\n".to_vec()),
    );
    session
}

fn previous_metrics() -> MetricsResponse {
    MetricsResponse {
        total_dividends: 1.0,
        total_fees: 1.0,
        fee_breakdown: None,
        profit_loss: 1.0,
        portfolio_value: 99.0,
        cash_balance: 1.0,
        annual_growth_rate: None,
        historical_portfolio_value: Some(vec![HistoryPoint::new("2023-12-01", 99.0)]),
        historical_cashflow: None,
        combined_data: None,
    }
}

#[test]
fn success_applies_metrics_and_sends_only_selected_parts() {
    let (addr, server) = serve_once("200 OK", METRICS_JSON);
    let mut session = account_only_session();

    let resolution = submit_blocking(&service_for(addr), &mut session);
    let request = server.join().unwrap();

    assert_eq!(resolution, Resolution::Applied);
    assert!(request.starts_with("POST /upload HTTP/1.1"));
    assert!(request.to_ascii_lowercase().contains("content-type: multipart/form-data"));
    assert!(request.contains("name=\"account\""));
    assert!(request.contains("filename=\"account.csv\""));
    assert!(!request.contains("name=\"transactions\""));
    assert!(!request.contains("name=\"portfolio\""));

    assert!(session.last_error().is_none());
    let metrics = session.last_metrics().unwrap();
    assert_eq!(metrics.portfolio_value, 1020.0);
    assert_eq!(metrics.annual_growth_rate, Some(0.0));
    assert!(metrics.historical_cashflow.is_none());
    assert_eq!(metrics.historical_portfolio_value.as_ref().map(Vec::len), Some(2));
}

#[test]
fn server_error_keeps_previous_metrics() {
    let (addr, server) = serve_once("500 Internal Server Error", "Traceback: KeyError 'Datum'");
    let mut session = account_only_session();
    session.apply_metrics(previous_metrics());

    submit_blocking(&service_for(addr), &mut session);
    server.join().unwrap();

    assert_eq!(session.last_metrics(), Some(&previous_metrics()));
    let err = session.last_error().unwrap();
    assert_eq!(err.kind, ErrorKind::Service);
    assert_eq!(err.status, Some(500));
    assert!(!err.message.contains("Traceback"));
}

#[test]
fn undecodable_body_is_a_malformed_response() {
    let (addr, server) = serve_once("200 OK", "<html>not json</html>");
    let mut session = account_only_session();

    submit_blocking(&service_for(addr), &mut session);
    server.join().unwrap();

    assert!(session.last_metrics().is_none());
    assert_eq!(session.last_error().map(|e| e.kind), Some(ErrorKind::MalformedResponse));
}

#[test]
fn unreachable_service_is_a_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let mut session = account_only_session();

    submit_blocking(&service_for(addr), &mut session);

    let err = session.last_error().unwrap();
    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(err.status, None);
}
