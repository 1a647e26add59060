//! AWS provider error types

use aws_sdk_ec2::error::DisplayErrorContext;
use thiserror::Error;
use vpcflow_cloud::CloudError;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed ({request}): {message}")]
    Api {
        operation: &'static str,
        request: String,
        message: String,
    },

    #[error("{operation} response is missing {field} ({request})")]
    MissingField {
        operation: &'static str,
        request: String,
        field: &'static str,
    },
}

impl AwsError {
    /// Wrap an SDK failure, keeping the full error context chain
    pub fn api<E>(operation: &'static str, request: impl Into<String>, error: &E) -> Self
    where
        E: std::error::Error,
    {
        Self::Api {
            operation,
            request: request.into(),
            message: DisplayErrorContext(error).to_string(),
        }
    }

    pub fn missing(
        operation: &'static str,
        request: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            operation,
            request: request.into(),
            field,
        }
    }
}

impl From<AwsError> for CloudError {
    fn from(error: AwsError) -> Self {
        match error {
            AwsError::Api {
                operation,
                request,
                message,
            } => CloudError::provider(operation, request, message),
            AwsError::MissingField {
                operation,
                request,
                field,
            } => CloudError::provider(operation, request, format!("response has no {}", field)),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
