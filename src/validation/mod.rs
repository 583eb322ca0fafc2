//! Validation of meeting event envelopes
//!
//! Events produced outside the process (persisted logs, other windows, test
//! fixtures) are checked here before they may be appended.

mod error;
mod event;

pub use error::{EngineError, ErrorCode};
pub use event::{validate, validate_event, ValidationResult};
