//! Book catalog: model, search, dashboard stats and `/books` operations.

pub mod model;
pub mod service;

pub use model::{filter_books, Book, BookDraft, BookStats, WriteOutcome};
pub use service::CatalogService;
