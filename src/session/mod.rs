//! Upload session: the single source of truth the presentation layer reads.
//!
//! - `state`: selected files, last metrics/error, submit tickets
//! - `error_info`: the user-facing projection of a failed submit

pub mod error_info;
pub mod state;

pub use error_info::*;
pub use state::*;
