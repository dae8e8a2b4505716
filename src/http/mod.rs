//! HTTP client module
//!
//! Provides the layered HTTP stack connectors are built on.
//!
//! # Features
//!
//! - **Error Classification**: status codes mapped to typed error kinds,
//!   with per-provider interpreters
//! - **JSON Layer**: body marshaling and lazily parsed JSON responses
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Opt-in Retries**: Constant, linear, and exponential backoff honoring `Retry-After`
//! - **Authentication**: Integration with auth module

mod client;
mod interpreter;
mod json;
mod rate_limit;

pub use client::{
    non_success, ErrorPredicate, HttpClient, HttpClientConfig, HttpClientConfigBuilder,
    HttpResponse, RequestBody, RequestConfig,
};
pub use interpreter::{
    classify_status, parse_retry_after, DefaultInterpreter, EmbeddedErrorsInterpreter,
    ErrorInterpreter,
};
pub use json::{JsonHttpClient, JsonHttpResponse};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
