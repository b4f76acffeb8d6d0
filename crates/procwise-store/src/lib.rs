//! # procwise-store
//!
//! Per-conversation session state and the in-memory session store.
//!
//! Sessions are ephemeral: they live in a concurrent map, expire lazily
//! after 24 hours of inactivity, and an expired id is reborn as a fresh
//! default session on the next lookup.  The store also provides the
//! per-session mutual exclusion the engine relies on to serialize turns.

pub mod error;
pub mod session;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use session::{HistoryEntry, Language, Session, WorkflowStatus};
pub use store::{SessionExport, SessionStore, StoreStats};
