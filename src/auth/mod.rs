//! Account flows against the bookstore backend.
//!
//! Provides:
//! - Login (`POST /login`), which is the only path that populates the session
//! - Registration with password confirmation
//! - Forgot / reset password and authenticated password change
//!
//! ## Design Decisions
//! - Every form is validated locally before any request is sent.
//! - A failed login never touches the session; the previous identity (or
//!   the empty session) stays in place.

pub mod forms;
pub mod service;

pub use forms::{ChangePasswordForm, RegisterForm, ResetPasswordForm};
pub use service::{AuthService, ForgotPasswordResponse};
