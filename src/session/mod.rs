//! Client-side session state.
//!
//! Provides:
//! - `SessionStore`: the single source of truth for who is logged in and
//!   which bearer token to present, observable through `tokio::sync::watch`
//! - `SessionStorage`: durable backing for the session (JSON file or memory)
//! - JWT expiry inspection, used to drop stale sessions on rehydration
//!
//! ## Design Decisions
//! - The token is never verified client-side; only the `exp` claim is read.
//! - Rehydration never fails: corrupt, partial or expired data yields the
//!   empty session and the stale copy is cleared.

pub mod storage;
pub mod store;
pub mod token;

pub use storage::{FileStorage, MemoryStorage, SessionStorage, SESSION_STORAGE_KEY};
pub use store::{Role, Session, SessionStore, UserIdentity};
