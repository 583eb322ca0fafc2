//! Utility functions and helpers
//!
//! Timestamps and atomic file writes.

pub mod atomic;
pub mod time;

pub use atomic::{atomic_write, cleanup_temp_files};
pub use time::current_timestamp_millis;
