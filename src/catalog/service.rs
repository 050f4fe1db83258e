use super::model::{filter_books, Book, BookDraft, BookStats, WriteOutcome};
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

/// Typed access to the `/books` endpoints.
///
/// Browsing needs a logged-in session and admin writes need the admin role.
/// Both gates are checked locally so a request that is bound to be refused
/// is never sent; the backend still enforces its own checks.
#[derive(Debug, Clone)]
pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn require_session(&self) -> ClientResult<()> {
        if self.api.session().is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }

    fn require_admin(&self) -> ClientResult<()> {
        self.require_session()?;
        if self.api.session().is_admin() {
            Ok(())
        } else {
            Err(ClientError::AccessDenied)
        }
    }

    // ── Browsing ────────────────────────────────────────────────

    pub async fn list(&self) -> ClientResult<Vec<Book>> {
        self.require_session()?;
        let books: Vec<Book> = self.api.get("/books").await?;
        tracing::debug!(count = books.len(), "Fetched catalog");
        Ok(books)
    }

    /// Fetch the catalog and keep the books whose title or author
    /// contains `term`, ignoring case.
    pub async fn search(&self, term: &str) -> ClientResult<Vec<Book>> {
        let books = self.list().await?;
        Ok(filter_books(&books, term).into_iter().cloned().collect())
    }

    pub async fn get(&self, id: u64) -> ClientResult<Book> {
        self.require_session()?;
        self.api.get(&format!("/books/{id}")).await
    }

    pub async fn stats(&self) -> ClientResult<BookStats> {
        let books = self.list().await?;
        Ok(BookStats::from_books(&books))
    }

    // ── Admin writes ────────────────────────────────────────────

    pub async fn create(&self, draft: &BookDraft) -> ClientResult<WriteOutcome> {
        self.require_admin()?;
        let draft = draft.validated()?;
        let outcome = self.api.post("/books", &draft).await?;
        tracing::info!(title = %draft.title, "Book created");
        Ok(outcome)
    }

    pub async fn update(&self, id: u64, draft: &BookDraft) -> ClientResult<WriteOutcome> {
        self.require_admin()?;
        let draft = draft.validated()?;
        let outcome = self.api.put(&format!("/books/{id}"), &draft).await?;
        tracing::info!(id, "Book updated");
        Ok(outcome)
    }

    /// `None` when the backend answers `204 No Content`.
    pub async fn delete(&self, id: u64) -> ClientResult<Option<WriteOutcome>> {
        self.require_admin()?;
        let outcome = self.api.delete(&format!("/books/{id}")).await?;
        tracing::info!(id, "Book deleted");
        Ok(outcome)
    }
}
