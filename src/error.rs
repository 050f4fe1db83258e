//! Typed client errors.
//!
//! Validation failures are raised before any request leaves the process;
//! HTTP failures carry the backend's status and message.

use crate::api::HttpError;

/// A form-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("New password and confirm password don't match.")]
    PasswordMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Please log in first.")]
    NotAuthenticated,
    #[error("Admin privileges required.")]
    AccessDenied,
}

impl ClientError {
    /// HTTP status of the failure, when it came from the backend.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
