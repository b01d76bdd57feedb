//! # api-adapters
//!
//! The HTTP layer for anonboard. Error mapping, operation naming and metrics
//! are framework-free; the axum router sits behind the `web-axum` feature.

pub mod error;
pub mod metrics;
pub mod operation;
#[cfg(feature = "web-axum")]
pub mod web;

pub use error::{ApiError, ErrorKind};
pub use metrics::{ApiMetrics, Outcome};
pub use operation::Operation;
