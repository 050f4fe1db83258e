#![forbid(unsafe_code)]

//! Bookstore catalog client.
//!
//! Provides:
//! - A persistent, observable session store (identity + bearer token)
//! - A REST client that attaches the current token to every request
//! - Auth flows (login, register, password reset) with pre-flight validation
//! - Catalog browsing, search and admin CRUD over `/books`

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod session;

pub use api::{ApiClient, HttpError};
pub use auth::AuthService;
pub use catalog::{filter_books, Book, BookDraft, BookStats, CatalogService};
pub use config::Config;
pub use error::{ClientError, ValidationError};
pub use session::{Role, Session, SessionStore, UserIdentity};
