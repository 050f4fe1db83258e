//! REST client for the bookstore backend.
//!
//! ## Design
//! - Single point of HTTP egress; every request reads the current token from
//!   the shared `SessionStore` and attaches it as a bearer credential
//! - Non-2xx responses become `HttpError { status, message }`, with the
//!   message taken from the backend's JSON error payload
//! - No retries, no caching, no status-code policy (a 401 does not log out)

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::HttpError;
