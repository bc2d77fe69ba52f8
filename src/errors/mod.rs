//! Centralized error handling module
//!
//! Typed errors for every stage of a push, plus context helpers used when
//! lifting foreign errors into them.

pub mod context;
pub mod types;

pub use context::ErrorContextExt;
pub use types::{PushError, PushResult};
