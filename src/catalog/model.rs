use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

fn default_available() -> bool {
    true
}

/// A catalog entry as returned by the backend. `id` is the stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    /// Case-insensitive substring match on title or author.
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

/// Case-insensitive substring search over title OR author.
/// An empty term returns every book, in order.
pub fn filter_books<'a>(books: &'a [Book], term: &str) -> Vec<&'a Book> {
    if term.is_empty() {
        return books.iter().collect();
    }

    let needle = term.to_lowercase();
    books.iter().filter(|book| book.matches(&needle)).collect()
}

// ── Drafts ──────────────────────────────────────────────────────

/// Body of `POST /books` and `PUT /books/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    /// Omitted from the body when unset so the backend keeps its stored date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_date: None,
            available: true,
        }
    }

    pub fn published(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Pre-fill an edit form from an existing record.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            published_date: book.published_date.clone(),
            available: book.available,
        }
    }

    /// Trimmed copy with an empty date treated as absent, or the first
    /// missing required field.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::Required("Title"));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(ValidationError::Required("Author"));
        }

        Ok(Self {
            title: title.to_string(),
            author: author.to_string(),
            published_date: self
                .published_date
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            available: self.available,
        })
    }
}

/// Response to a catalog write: either the stored record or an
/// acknowledgement message, depending on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WriteOutcome {
    Book(Book),
    Message { message: String },
}

impl WriteOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Book(book) => format!("Saved \"{}\" (#{})", book.title, book.id),
            Self::Message { message } => message.clone(),
        }
    }
}

// ── Stats ───────────────────────────────────────────────────────

/// Availability counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BookStats {
    pub total: usize,
    pub available: usize,
    pub unavailable: usize,
}

impl BookStats {
    pub fn from_books(books: &[Book]) -> Self {
        let available = books.iter().filter(|b| b.available).count();
        Self {
            total: books.len(),
            available,
            unavailable: books.len() - available,
        }
    }
}
