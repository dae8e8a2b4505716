//! Error types for Solidafy Connectors
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into four families:
//!
//! - **Input** errors are raised before any network call (missing objects,
//!   missing fields, missing record data).
//! - **Capability** errors mean the connector or object cannot do what was
//!   asked (unsupported object, module, batch type, subscription event).
//! - **Transport** errors classify non-2xx HTTP responses and carry the
//!   response body as context.
//! - **Payload** errors describe malformed or unexpected response bodies and
//!   webhook signature failures.
//!
//! Wrapping with [`ResultExt::context`] keeps the original error reachable,
//! so [`Error::is`] and [`Error::kind`] still see through it.

use crate::types::Capability;
use std::time::Duration;
use thiserror::Error;

/// The main error type for Solidafy Connectors
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("no objects specified")]
    MissingObjects,

    #[error("no fields specified")]
    MissingFields,

    #[error("no record data specified")]
    MissingRecordData,

    #[error("no record id specified")]
    MissingRecordId,

    #[error("module is required")]
    MissingModule,

    #[error("missing expected values: {message}")]
    MissingExpectedValues { message: String },

    #[error("failed to unmarshal body: {message}")]
    FailedToUnmarshalBody { message: String },

    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("invalid value for '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    // ============================================================================
    // Capability Errors
    // ============================================================================
    #[error("object not supported: {object}")]
    ObjectNotSupported { object: String },

    #[error("operation '{operation}' not supported for object '{object}'")]
    OperationNotSupportedForObject { operation: String, object: String },

    #[error("unsupported module: {module}")]
    UnsupportedModule { module: String },

    #[error("unsupported batch write type: {kind}")]
    UnsupportedBatchWriteType { kind: String },

    #[error("unsupported subscription event '{event}' for object '{object}'")]
    UnsupportedSubscriptionEvent { object: String, event: String },

    #[error("connector does not implement {capability}")]
    CapabilityNotSupported { capability: Capability },

    #[error("unknown provider: {provider}")]
    UnknownProvider { provider: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("caller error (HTTP {status}): {body}")]
    Caller { status: u16, body: String },

    #[error("bad request: {body}")]
    BadRequest { body: String },

    #[error("access token rejected: {body}")]
    AccessToken { body: String },

    #[error("forbidden: {body}")]
    Forbidden { body: String },

    #[error("not found: {body}")]
    NotFound { body: String },

    #[error("conflict: {body}")]
    Conflict { body: String },

    #[error("retryable error (HTTP {status}): {body}")]
    Retryable {
        status: u16,
        body: String,
        retry_after: Option<Duration>,
    },

    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Payload Errors
    // ============================================================================
    #[error("empty JSON HTTP response")]
    EmptyJsonHttpResponse,

    #[error("missing webhook signature")]
    MissingSignature,

    #[error("invalid webhook signature")]
    InvalidSignature,

    #[error("record was not processed by the provider")]
    BatchUnprocessedRecord,

    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("OAuth2 error: {message}")]
    OAuth2 { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Composition
    // ============================================================================
    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{}", join_messages(.0))]
    Joined(Vec<Error>),

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Discriminant of [`Error`] without payload, used for `is`-style matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingObjects,
    MissingFields,
    MissingRecordData,
    MissingRecordId,
    MissingModule,
    MissingExpectedValues,
    FailedToUnmarshalBody,
    MissingParameter,
    InvalidParameter,
    ObjectNotSupported,
    OperationNotSupportedForObject,
    UnsupportedModule,
    UnsupportedBatchWriteType,
    UnsupportedSubscriptionEvent,
    CapabilityNotSupported,
    UnknownProvider,
    Caller,
    BadRequest,
    AccessToken,
    Forbidden,
    NotFound,
    Conflict,
    Retryable,
    Server,
    Http,
    InvalidUrl,
    EmptyJsonHttpResponse,
    MissingSignature,
    InvalidSignature,
    BatchUnprocessedRecord,
    JsonPath,
    Auth,
    Config,
    Parse,
    Io,
    Arrow,
    Joined,
    Cancelled,
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_param(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an object-not-supported error
    pub fn object_not_supported(object: impl Into<String>) -> Self {
        Self::ObjectNotSupported {
            object: object.into(),
        }
    }

    /// Create an operation-not-supported error
    pub fn operation_not_supported(
        operation: impl std::fmt::Display,
        object: impl Into<String>,
    ) -> Self {
        Self::OperationNotSupportedForObject {
            operation: operation.to_string(),
            object: object.into(),
        }
    }

    /// Create a missing expected values error
    pub fn missing_expected(message: impl Into<String>) -> Self {
        Self::MissingExpectedValues {
            message: message.into(),
        }
    }

    /// Create an unmarshal error
    pub fn unmarshal(message: impl Into<String>) -> Self {
        Self::FailedToUnmarshalBody {
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Join several errors into one, flattening a single error
    pub fn join(mut errors: Vec<Error>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            Self::Joined(errors)
        }
    }

    /// Payload-free discriminant of this error
    ///
    /// Context wrappers are transparent.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingObjects => ErrorKind::MissingObjects,
            Error::MissingFields => ErrorKind::MissingFields,
            Error::MissingRecordData => ErrorKind::MissingRecordData,
            Error::MissingRecordId => ErrorKind::MissingRecordId,
            Error::MissingModule => ErrorKind::MissingModule,
            Error::MissingExpectedValues { .. } => ErrorKind::MissingExpectedValues,
            Error::FailedToUnmarshalBody { .. } => ErrorKind::FailedToUnmarshalBody,
            Error::MissingParameter { .. } => ErrorKind::MissingParameter,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Error::ObjectNotSupported { .. } => ErrorKind::ObjectNotSupported,
            Error::OperationNotSupportedForObject { .. } => {
                ErrorKind::OperationNotSupportedForObject
            }
            Error::UnsupportedModule { .. } => ErrorKind::UnsupportedModule,
            Error::UnsupportedBatchWriteType { .. } => ErrorKind::UnsupportedBatchWriteType,
            Error::UnsupportedSubscriptionEvent { .. } => ErrorKind::UnsupportedSubscriptionEvent,
            Error::CapabilityNotSupported { .. } => ErrorKind::CapabilityNotSupported,
            Error::UnknownProvider { .. } => ErrorKind::UnknownProvider,
            Error::Caller { .. } => ErrorKind::Caller,
            Error::BadRequest { .. } => ErrorKind::BadRequest,
            Error::AccessToken { .. } => ErrorKind::AccessToken,
            Error::Forbidden { .. } => ErrorKind::Forbidden,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::Retryable { .. } => ErrorKind::Retryable,
            Error::Server { .. } => ErrorKind::Server,
            Error::Http(_) => ErrorKind::Http,
            Error::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Error::EmptyJsonHttpResponse => ErrorKind::EmptyJsonHttpResponse,
            Error::MissingSignature => ErrorKind::MissingSignature,
            Error::InvalidSignature => ErrorKind::InvalidSignature,
            Error::BatchUnprocessedRecord => ErrorKind::BatchUnprocessedRecord,
            Error::JsonPath { .. } => ErrorKind::JsonPath,
            Error::Auth { .. } | Error::TokenRefresh { .. } | Error::OAuth2 { .. } => {
                ErrorKind::Auth
            }
            Error::Config { .. } | Error::UndefinedVariable { .. } => ErrorKind::Config,
            Error::YamlParse(_) | Error::JsonParse(_) => ErrorKind::Parse,
            Error::Arrow(_) => ErrorKind::Arrow,
            Error::Io(_) => ErrorKind::Io,
            Error::Context { source, .. } => source.kind(),
            Error::Joined(_) => ErrorKind::Joined,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether this error, anything it wraps, or any joined error has the kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        match self {
            Error::Context { source, .. } => source.is(kind),
            Error::Joined(errors) => kind == ErrorKind::Joined || errors.iter().any(|e| e.is(kind)),
            other => other.kind() == kind,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Retryable { .. } | Error::Server { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::Context { source, .. } => source.is_retryable(),
            Error::Joined(errors) => !errors.is_empty() && errors.iter().all(Error::is_retryable),
            _ => false,
        }
    }

    /// Delay requested by the provider before retrying, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Retryable { retry_after, .. } => *retry_after,
            Error::Context { source, .. } => source.retry_after(),
            _ => None,
        }
    }

    /// Re-tag a not-found response as an unsupported object
    ///
    /// Used by object-scoped calls where a 404 means the collection does not exist.
    pub fn for_object(self, object: &str) -> Self {
        if self.kind() == ErrorKind::NotFound {
            Error::object_not_supported(object)
        } else {
            self
        }
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for Solidafy Connectors
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Context {
            message: message.into(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            message: f(),
            source: Box::new(e.into()),
        })
    }
}
