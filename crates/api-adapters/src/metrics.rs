//! Per-operation request counters, exposed in OpenMetrics text format.

use domains::BoardError;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use crate::operation::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue)]
pub enum Outcome {
    Success,
    MissingParameter,
    PasswordMismatch,
    NotFound,
    InvalidBody,
    Failure,
}

impl From<&BoardError> for Outcome {
    fn from(err: &BoardError) -> Self {
        match err {
            BoardError::MissingParameter(_) => Outcome::MissingParameter,
            BoardError::PasswordMismatch => Outcome::PasswordMismatch,
            BoardError::NotFound(..) => Outcome::NotFound,
            BoardError::Store(_) | BoardError::Hashing(_) => Outcome::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
struct OperationLabels {
    operation: Operation,
    outcome: Outcome,
}

pub struct ApiMetrics {
    registry: Registry,
    operations: Family<OperationLabels, Counter>,
}

impl ApiMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let operations = Family::<OperationLabels, Counter>::default();
        registry.register(
            "board_operations",
            "Board API requests by operation and outcome",
            operations.clone(),
        );
        Self {
            registry,
            operations,
        }
    }

    pub fn record(&self, operation: Operation, outcome: Outcome) {
        self.operations
            .get_or_create(&OperationLabels { operation, outcome })
            .inc();
    }

    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}
