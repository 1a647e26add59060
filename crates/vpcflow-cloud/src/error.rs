//! Orchestration error types

use thiserror::Error;
use vpcflow_core::GraphError;

/// Errors raised while provisioning or tearing down a region graph
#[derive(Error, Debug)]
pub enum CloudError {
    /// Validation failure (precondition violation or name collision)
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Unresolved reference '{name}' in {referrer}")]
    DanglingReference { name: String, referrer: String },

    #[error("Malformed value '{value}': {reason}")]
    Format { value: String, reason: String },

    #[error("Invalid direction on rule: {rule}")]
    InvalidDirection { rule: String },

    #[error("Provider call failed: {operation}\nrequest: {request}\nresponse: {response}")]
    ProviderCallFailed {
        operation: String,
        request: String,
        response: String,
    },

    #[error("Checkpoint failed: {0}")]
    Checkpoint(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CloudError {
    pub fn dangling(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self::DanglingReference {
            name: name.into(),
            referrer: referrer.into(),
        }
    }

    pub fn format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn provider(
        operation: impl Into<String>,
        request: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self::ProviderCallFailed {
            operation: operation.into(),
            request: request.into(),
            response: response.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
