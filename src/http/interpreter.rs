//! HTTP error interpretation
//!
//! Converts a response the client decided to treat as an error into a typed
//! [`Error`]. The default table maps status codes to error kinds; providers
//! whose successful responses embed an `errors` array remap through a table
//! of provider error codes first.

use super::client::HttpResponse;
use crate::error::Error;
use crate::jsonquery::JsonQuery;
use crate::types::{scalar_to_string, JsonValue};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::collections::HashMap;
use std::time::Duration;

/// Turns an error response into a typed error
pub trait ErrorInterpreter: Send + Sync {
    /// `None` means the response is not an error after all
    fn interpret(&self, response: &HttpResponse) -> Option<Error>;
}

/// Status code table
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInterpreter {
    /// Treat 400 as retryable instead of a bad request
    pub bad_request_retryable: bool,
}

impl DefaultInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpreter for providers that report transient failures as 400
    pub fn retry_bad_requests() -> Self {
        Self {
            bad_request_retryable: true,
        }
    }
}

impl ErrorInterpreter for DefaultInterpreter {
    fn interpret(&self, response: &HttpResponse) -> Option<Error> {
        classify_status(
            response.code(),
            &response.headers,
            response.text(),
            self.bad_request_retryable,
        )
    }
}

/// Map a status code and body to an error kind; 2xx yields `None`
pub fn classify_status(
    status: u16,
    headers: &HeaderMap,
    body: String,
    bad_request_retryable: bool,
) -> Option<Error> {
    let err = match status {
        200..=299 => return None,
        300..=399 => Error::Caller { status, body },
        400 if bad_request_retryable => Error::Retryable {
            status,
            body,
            retry_after: parse_retry_after(headers),
        },
        400 => Error::BadRequest { body },
        401 => Error::AccessToken { body },
        403 => Error::Forbidden { body },
        404 => Error::NotFound { body },
        409 => Error::Conflict { body },
        429 => Error::Retryable {
            status,
            body,
            retry_after: parse_retry_after(headers),
        },
        400..=499 => Error::Caller { status, body },
        _ => Error::Server { status, body },
    };
    Some(err)
}

/// Parse a `Retry-After` header given in seconds or as an HTTP date
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    let wait = at.signed_duration_since(Utc::now());
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Interpreter for APIs that answer 200 with an `errors` array
///
/// The first error's code is looked up in `codes`; unknown codes map to
/// `fallback_status`. The resulting status then goes through the default
/// table. Non-2xx responses use the default table directly.
#[derive(Debug, Clone)]
pub struct EmbeddedErrorsInterpreter {
    errors_path: String,
    code_field: String,
    codes: HashMap<String, u16>,
    fallback_status: u16,
}

impl EmbeddedErrorsInterpreter {
    pub fn new(errors_path: impl Into<String>, code_field: impl Into<String>) -> Self {
        Self {
            errors_path: errors_path.into(),
            code_field: code_field.into(),
            codes: HashMap::new(),
            fallback_status: 400,
        }
    }

    /// Map a provider error code to an HTTP status
    #[must_use]
    pub fn code(mut self, code: impl Into<String>, status: u16) -> Self {
        self.codes.insert(code.into(), status);
        self
    }

    /// Status used for codes missing from the table
    #[must_use]
    pub fn fallback_status(mut self, status: u16) -> Self {
        self.fallback_status = status;
        self
    }

    fn embedded_status(&self, body: &JsonValue) -> Option<u16> {
        let query = JsonQuery::new(body);
        let errors = query.array_optional(&self.errors_path).ok()??;
        let first = errors.first()?;
        let status = JsonQuery::new(first)
            .at(&self.code_field)
            .and_then(scalar_to_string)
            .and_then(|code| self.codes.get(&code).copied())
            .unwrap_or(self.fallback_status);
        Some(status)
    }
}

impl ErrorInterpreter for EmbeddedErrorsInterpreter {
    fn interpret(&self, response: &HttpResponse) -> Option<Error> {
        if !response.is_success() {
            return DefaultInterpreter::new().interpret(response);
        }

        let body: JsonValue = serde_json::from_slice(&response.body).ok()?;
        let status = self.embedded_status(&body)?;
        classify_status(status, &response.headers, response.text(), false)
    }
}
