//! Top-level application error.
//!
//! Library code reports request failures through `data::SubmitError` /
//! `session::ErrorInfo`; everything that should end the process (bad paths,
//! terminal I/O, unreadable JSON) surfaces as an `AppError` carrying the exit
//! code the binary returns.

/// Exit code for usage and input errors (missing files, invalid JSON).
pub const EXIT_USAGE: u8 = 2;
/// Exit code for runtime failures (service unavailable, terminal errors).
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::session::ErrorInfo> for AppError {
    fn from(info: crate::session::ErrorInfo) -> Self {
        AppError::runtime(info.message)
    }
}
