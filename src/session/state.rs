//! Upload session state: selected files, last metrics, last error.
//!
//! Every transition takes `&mut self`, so anything holding `&self` observes
//! either the state before or after a transition, never a mix of the two.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{FileSelection, FileSlot, MetricsResponse, SelectedFile};
use crate::session::ErrorInfo;

/// Monotonic sequence number issued when a submit starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How results of overlapping submits are reconciled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StalePolicy {
    /// Only the most recently initiated submit may update the session.
    #[default]
    LatestInitiated,
    /// Whatever resolves last wins, regardless of initiation order.
    LastResolved,
}

/// What happened to a resolved outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer submit was started after this one; the outcome was dropped.
    Superseded { latest: Ticket },
}

#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    selection: FileSelection,
    last_metrics: Option<MetricsResponse>,
    last_error: Option<ErrorInfo>,
    policy: StalePolicy,
    issued: u64,
    revision: u64,
}

impl UploadSession {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn last_metrics(&self) -> Option<&MetricsResponse> {
        self.last_metrics.as_ref()
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.last_error.as_ref()
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }

    /// Bumped on every transition; readers compare it to detect change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Latest ticket handed out by `begin_submit`, if any.
    pub fn latest_ticket(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }

    pub fn set_file(&mut self, slot: FileSlot, file: SelectedFile) {
        log::debug!("select {slot}: {} ({} bytes)", file.file_name, file.len());
        self.selection.insert(slot, file);
        self.revision += 1;
    }

    pub fn clear_file(&mut self, slot: FileSlot) {
        if self.selection.remove(slot).is_some() {
            self.revision += 1;
        }
    }

    /// Replace the metrics and clear any previous error.
    pub fn apply_metrics(&mut self, metrics: MetricsResponse) {
        self.last_metrics = Some(metrics);
        self.last_error = None;
        self.revision += 1;
    }

    /// Record a failure; the previous metrics stay on display.
    pub fn apply_error(&mut self, err: ErrorInfo) {
        self.last_error = Some(err);
        self.revision += 1;
    }

    pub fn begin_submit(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Apply the outcome of the request tagged `ticket`, subject to the policy.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<MetricsResponse, ErrorInfo>) -> Resolution {
        if self.policy == StalePolicy::LatestInitiated && ticket.0 < self.issued {
            let latest = Ticket(self.issued);
            log::info!("discarding response {ticket}: superseded by {latest}");
            return Resolution::Superseded { latest };
        }

        match outcome {
            Ok(metrics) => self.apply_metrics(metrics),
            Err(err) => self.apply_error(err),
        }
        Resolution::Applied
    }
}
