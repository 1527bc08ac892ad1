//! User-facing failure notice.

use serde::Serialize;

use crate::data::SubmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Service,
    MalformedResponse,
}

/// What the presentation layer shows after a failed submit.
///
/// `message` is generic and safe to display; `cause` is the raw detail kept for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    /// HTTP status for `ErrorKind::Service`.
    pub status: Option<u16>,
    pub message: String,
    pub cause: String,
}

/// The only notice users see for a failed submit, whatever the cause.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Check the selected files and try again.";

impl From<SubmitError> for ErrorInfo {
    fn from(err: SubmitError) -> Self {
        let (kind, status) = match &err {
            SubmitError::Transport(_) => (ErrorKind::Transport, None),
            SubmitError::Service { status, .. } => (ErrorKind::Service, Some(*status)),
            SubmitError::MalformedResponse(_) => (ErrorKind::MalformedResponse, None),
        };
        log::warn!("submit failed: {err}");
        ErrorInfo {
            kind,
            status,
            message: UPLOAD_FAILED_MESSAGE.to_string(),
            cause: err.to_string(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
