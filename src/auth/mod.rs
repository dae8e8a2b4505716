//! Authentication module
//!
//! Supports: API Key (header or query), Basic, Bearer, OAuth2 refresh token,
//! OAuth2 client credentials, and no auth.
//!
//! The `Authenticator` handles all auth types and manages token caching
//! for auth types that require token refresh. `ClientBuilder` turns
//! caller-facing `Credentials` into an `AuthenticatedHttpClient`.

mod authenticator;
mod builder;
mod types;

pub use authenticator::Authenticator;
pub use builder::{AuthenticatedHttpClient, ClientBuilder, Credentials};
pub use types::{AuthConfig, CachedToken, Location};

#[cfg(test)]
mod tests;
