//! Shared "submit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! selection -> multipart upload -> session update -> chart re-derivation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use poll_promise::Promise;

use crate::chart::{ChartConfig, ChartModel, build_chart_models};
use crate::data::{AnalysisService, UploadForm};
use crate::domain::{FileSelection, MetricsResponse};
use crate::session::{ErrorInfo, Resolution, Ticket, UploadSession};

type Outcome = Result<MetricsResponse, ErrorInfo>;

/// Send the files in `selection` and convert any failure into an `ErrorInfo`.
pub fn submit(service: &dyn AnalysisService, selection: &FileSelection) -> Outcome {
    let form = UploadForm::from_selection(selection);
    let parts = form.part_names();
    match service.upload(form) {
        Ok(metrics) => {
            log::info!(
                "upload ok: parts={parts:?} points={}",
                metrics.historical_portfolio_value.as_ref().map_or(0, Vec::len)
            );
            Ok(metrics)
        }
        Err(err) => Err(ErrorInfo::from(err)),
    }
}

/// Submit the session's current selection and apply the outcome in place.
pub fn submit_blocking(service: &dyn AnalysisService, session: &mut UploadSession) -> Resolution {
    let ticket = session.begin_submit();
    let outcome = submit(service, session.selection());
    session.resolve(ticket, outcome)
}

/// Derive fresh chart models from whatever metrics the session holds.
pub fn derive_charts(session: &UploadSession, config: &ChartConfig) -> Vec<ChartModel> {
    session
        .last_metrics()
        .map(|metrics| build_chart_models(metrics, config))
        .unwrap_or_default()
}

/// Runs submits on worker threads while the owner keeps the session.
///
/// Requests are never coalesced: each `start` spawns its own worker. The
/// owner calls `poll` from its own loop; outcomes are applied to the session
/// there, so the session has a single writer.
pub struct Submitter {
    service: Arc<dyn AnalysisService>,
    in_flight: Vec<(Ticket, Promise<Outcome>)>,
}

impl Submitter {
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        Self {
            service,
            in_flight: Vec::new(),
        }
    }

    /// Start a submit of the session's current selection.
    pub fn start(&mut self, session: &mut UploadSession) -> Ticket {
        let ticket = session.begin_submit();
        let selection = session.selection().clone();
        let service = Arc::clone(&self.service);

        log::info!("submit {ticket}: {} file(s)", selection.len());
        let promise = Promise::spawn_thread(format!("upload-{}", ticket.get()), move || {
            submit(service.as_ref(), &selection)
        });
        self.in_flight.push((ticket, promise));
        ticket
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Apply every finished request (in initiation order) without blocking.
    pub fn poll(&mut self, session: &mut UploadSession) -> Vec<(Ticket, Resolution)> {
        let mut resolved = Vec::new();
        let mut pending = Vec::with_capacity(self.in_flight.len());

        for (ticket, promise) in std::mem::take(&mut self.in_flight) {
            match promise.try_take() {
                Ok(outcome) => resolved.push((ticket, session.resolve(ticket, outcome))),
                Err(promise) => pending.push((ticket, promise)),
            }
        }

        self.in_flight = pending;
        resolved
    }

    /// Block until every in-flight request has finished, applying each in turn.
    pub fn wait_all(&mut self, session: &mut UploadSession) -> Vec<(Ticket, Resolution)> {
        std::mem::take(&mut self.in_flight)
            .into_iter()
            .map(|(ticket, promise)| {
                let outcome = promise.block_and_take();
                (ticket, session.resolve(ticket, outcome))
            })
            .collect()
    }
}
