use crate::value::TypeKey;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while validating an operation's field descriptors.
#[derive(Error, Debug, Clone)]
pub enum SignatureError {
    #[error("Operation '{operation}' declares the {direction} field '{field}' more than once")]
    DuplicateField {
        operation: String,
        direction: &'static str,
        field: String,
    },

    #[error("Operation '{operation}' declares more than one wildcard {direction} field")]
    MultipleWildcards {
        operation: String,
        direction: &'static str,
    },

    #[error("Operation '{operation}' declares a {direction} field with an empty name")]
    EmptyFieldName {
        operation: String,
        direction: &'static str,
    },

    #[error("Invalid field descriptor: {0}")]
    InvalidField(String),
}

/// Errors raised by an operation body, typically while reading its arguments.
#[derive(Error, Debug, Clone)]
pub enum OperationError {
    #[error("Argument '{0}' was not provided to the operation")]
    MissingArgument(String),

    #[error("Argument '{field}' holds a value of type {found}, but {expected} was requested")]
    TypeMismatch {
        field: String,
        expected: TypeKey,
        found: TypeKey,
    },

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        OperationError::Failed(message.into())
    }

    pub fn custom<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        OperationError::Custom(Arc::new(error))
    }
}

/// Errors that end a resolution call.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    #[error("argument cannot be satisfied: missing value for '{name}' of type {ty}")]
    MissingArgument { name: String, ty: TypeKey },

    #[error("Dependency cycle detected between operations: {}", operations.join(" -> "))]
    Cycle { operations: Vec<String> },

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("Operation '{operation}' failed: {source}")]
    OperationFailed {
        operation: String,
        #[source]
        source: OperationError,
    },

    #[error("Operation '{operation}' did not return a value for output '{field}'")]
    OutputMissing { operation: String, field: String },

    #[error(
        "Operation '{operation}' returned a value of type {found} for output '{field}', expected {expected}"
    )]
    OutputTypeMismatch {
        operation: String,
        field: String,
        expected: TypeKey,
        found: TypeKey,
    },

    #[error("Value '{0}' was planned as an input but is not bound")]
    UnboundValue(String),
}

/// Errors raised while saving or loading a plan report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Could not access report file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
