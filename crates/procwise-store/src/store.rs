//! Keyed, expiring, in-memory session store.
//!
//! Concurrency discipline: the map itself is a sharded [`DashMap`], and in
//! addition the store hands out one `tokio::sync::Mutex` per session id.
//! The engine holds that mutex for a whole turn (read, compute, write back),
//! which serializes turns for a single session while turns for different
//! sessions proceed in parallel.
//!
//! Expiry is lazy: there is no background sweeper.  A session that has been
//! inactive past the TTL is replaced by a fresh default session with the
//! same id on the next `get` — callers observe a rebirth, never an error.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::session::{Language, Session, WorkflowStatus};

/// Sessions expire after this much inactivity (measured from `updated_at`).
const DEFAULT_TTL_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Point-in-time counts over the live (non-expired) sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub total_sessions: usize,
    pub active_procedures: usize,
    pub completed_procedures: usize,
    pub not_started: usize,
}

/// Serializable session record for backup/analysis.
///
/// Conversation history is deliberately not exported: it is presentation
/// context, not workflow state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub session_id: String,
    #[serde(default)]
    pub language: Language,
    pub current_procedure: Option<String>,
    pub current_step: Option<String>,
    #[serde(default)]
    pub completed_steps: Vec<String>,
    #[serde(default)]
    pub workflow_data: serde_json::Map<String, serde_json::Value>,
    pub status: WorkflowStatus,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// In-memory map from session id to [`Session`], with lazy TTL expiry and
/// per-key turn locks.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    turn_locks: DashMap<String, Arc<Mutex<()>>>,
    ttl: Duration,
}

impl SessionStore {
    /// A store with the standard 24-hour inactivity TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// A store with a custom TTL (tests use short TTLs).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            turn_locks: DashMap::new(),
            ttl,
        }
    }

    /// Fetch the session for `id`, creating or rebirthing as needed.
    ///
    /// Never fails: an unknown id yields a fresh default session claiming
    /// that id, and an expired one is invisibly replaced the same way.
    pub fn get(&self, id: &str) -> Session {
        if let Some(entry) = self.sessions.get(id) {
            if !self.is_expired(&entry) {
                return entry.clone();
            }
        } else {
            let session = Session::new(id);
            self.sessions.insert(id.to_string(), session.clone());
            debug!(session_id = id, "session created");
            return session;
        }

        // Expired: rebirth under the same id.
        debug!(session_id = id, "session expired, rebirthing");
        let session = Session::new(id);
        self.sessions.insert(id.to_string(), session.clone());
        session
    }

    /// Write back a session, stamping `updated_at`.
    pub fn put(&self, id: &str, mut session: Session) {
        session.updated_at = Utc::now();
        self.sessions.insert(id.to_string(), session);
    }

    /// Clear all procedure progress for `id`, preserving language.
    pub fn reset(&self, id: &str) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.reset_progress();
            entry.updated_at = Utc::now();
            debug!(session_id = id, "session reset");
        }
    }

    /// Remove a session (and its turn lock) entirely.
    pub fn delete(&self, id: &str) {
        self.sessions.remove(id);
        self.turn_locks.remove(id);
        debug!(session_id = id, "session deleted");
    }

    /// The per-session mutex serializing turns for `id`.
    ///
    /// Callers lock this for the duration of one turn's read-modify-write.
    pub fn turn_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Counts over live sessions; expired entries are purged first.
    pub fn stats_snapshot(&self) -> StoreStats {
        self.purge_expired();

        let mut stats = StoreStats {
            total_sessions: 0,
            active_procedures: 0,
            completed_procedures: 0,
            not_started: 0,
        };
        for entry in self.sessions.iter() {
            stats.total_sessions += 1;
            match entry.status {
                WorkflowStatus::InProgress => stats.active_procedures += 1,
                WorkflowStatus::Completed => stats.completed_procedures += 1,
                WorkflowStatus::NotStarted => stats.not_started += 1,
                WorkflowStatus::Paused | WorkflowStatus::Error => {}
            }
        }
        stats
    }

    /// Export a session as a serializable record, if it exists.
    pub fn export_session(&self, id: &str) -> Option<SessionExport> {
        let entry = self.sessions.get(id)?;
        Some(SessionExport {
            session_id: entry.session_id.clone(),
            language: entry.language,
            current_procedure: entry.current_procedure.clone(),
            current_step: entry.current_step.clone(),
            completed_steps: entry.completed_steps.clone(),
            workflow_data: entry.workflow_data.clone(),
            status: entry.status,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
    }

    /// Import a previously exported record.
    ///
    /// Returns `false` (and logs) on malformed records; never propagates an
    /// error to the caller.
    pub fn import_session(&self, record: &serde_json::Value) -> bool {
        match self.try_import(record) {
            Ok(id) => {
                debug!(session_id = %id, "session imported");
                true
            }
            Err(err) => {
                warn!(error = %err, "session import rejected");
                false
            }
        }
    }

    fn try_import(&self, record: &serde_json::Value) -> StoreResult<String> {
        let export: SessionExport =
            serde_json::from_value(record.clone()).map_err(|e| StoreError::Import {
                reason: e.to_string(),
            })?;
        if export.session_id.is_empty() {
            return Err(StoreError::Import {
                reason: "empty session_id".to_string(),
            });
        }

        let session = Session {
            session_id: export.session_id.clone(),
            language: export.language,
            current_procedure: export.current_procedure,
            current_step: export.current_step,
            completed_steps: export.completed_steps,
            workflow_data: export.workflow_data,
            status: export.status,
            conversation_history: Vec::new(),
            created_at: export.created_at,
            updated_at: export.updated_at,
        };
        let id = session.session_id.clone();
        self.sessions.insert(id.clone(), session);
        Ok(id)
    }

    /// Number of sessions currently held (including not-yet-purged expired
    /// ones).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // -- Private helpers ----------------------------------------------------

    fn is_expired(&self, session: &Session) -> bool {
        Utc::now() - session.updated_at > self.ttl
    }

    fn purge_expired(&self) {
        let ttl = self.ttl;
        let now = Utc::now();
        self.sessions.retain(|_, session| now - session.updated_at <= ttl);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_yields_fresh_session() {
        let store = SessionStore::new();
        let session = store.get("s1");
        assert_eq!(session.session_id, "s1");
        assert_eq!(session.status, WorkflowStatus::NotStarted);
        assert_eq!(session.language, Language::En);
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = SessionStore::new();
        let mut session = store.get("s1");
        session.current_procedure = Some("work_confirmation".into());
        session.status = WorkflowStatus::InProgress;
        store.put("s1", session);

        let fetched = store.get("s1");
        assert_eq!(
            fetched.current_procedure.as_deref(),
            Some("work_confirmation")
        );
        assert_eq!(fetched.status, WorkflowStatus::InProgress);
    }

    #[tokio::test]
    async fn expired_session_is_reborn_with_same_id() {
        let store = SessionStore::with_ttl(Duration::milliseconds(50));
        let mut session = store.get("s1");
        session.status = WorkflowStatus::InProgress;
        session.current_procedure = Some("p".into());
        store.put("s1", session);

        tokio::time::sleep(std::time::Duration::from_millis(120)).await;

        let reborn = store.get("s1");
        assert_eq!(reborn.session_id, "s1");
        assert_eq!(reborn.status, WorkflowStatus::NotStarted);
        assert!(reborn.current_procedure.is_none());
    }

    #[test]
    fn reset_preserves_language() {
        let store = SessionStore::new();
        let mut session = store.get("s1");
        session.language = Language::Fr;
        session.current_procedure = Some("p".into());
        session.status = WorkflowStatus::InProgress;
        store.put("s1", session);

        store.reset("s1");

        let after = store.get("s1");
        assert_eq!(after.language, Language::Fr);
        assert!(after.current_procedure.is_none());
        assert_eq!(after.status, WorkflowStatus::NotStarted);
    }

    #[test]
    fn delete_removes_session() {
        let store = SessionStore::new();
        store.put("s1", Session::new("s1"));
        assert_eq!(store.len(), 1);
        store.delete("s1");
        assert!(store.is_empty());
    }

    #[test]
    fn stats_count_by_status() {
        let store = SessionStore::new();

        let s1 = Session::new("s1");
        store.put("s1", s1);

        let mut s2 = Session::new("s2");
        s2.status = WorkflowStatus::InProgress;
        store.put("s2", s2);

        let mut s3 = Session::new("s3");
        s3.status = WorkflowStatus::Completed;
        store.put("s3", s3);

        let stats = store.stats_snapshot();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.active_procedures, 1);
        assert_eq!(stats.completed_procedures, 1);
        assert_eq!(stats.not_started, 1);
    }

    #[test]
    fn export_import_round_trip() {
        let store = SessionStore::new();
        let mut session = store.get("s1");
        session.current_procedure = Some("invoice_submission".into());
        session.current_step = Some("login".into());
        session.completed_steps.push("prepare".into());
        session.status = WorkflowStatus::InProgress;
        store.put("s1", session);

        let export = store.export_session("s1").unwrap();
        let record = serde_json::to_value(&export).unwrap();

        let other = SessionStore::new();
        assert!(other.import_session(&record));
        let imported = other.get("s1");
        assert_eq!(
            imported.current_procedure.as_deref(),
            Some("invoice_submission")
        );
        assert_eq!(imported.completed_steps, vec!["prepare"]);
    }

    #[test]
    fn export_unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.export_session("missing").is_none());
    }

    #[test]
    fn import_malformed_record_fails_soft() {
        let store = SessionStore::new();
        assert!(!store.import_session(&serde_json::json!({"nonsense": true})));
        assert!(!store.import_session(&serde_json::json!("not even an object")));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn turn_lock_serializes_read_modify_write() {
        let store = Arc::new(SessionStore::new());
        store.put("s1", Session::new("s1"));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let lock = store.turn_lock("s1");
                let _guard = lock.lock().await;
                let mut session = store.get("s1");
                session.mark_step_completed(&format!("step_{i}"));
                // Yield inside the critical section to invite interleaving.
                tokio::task::yield_now().await;
                store.put("s1", session);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Without per-key locking some of the eight writes would be lost.
        let session = store.get("s1");
        assert_eq!(session.completed_steps.len(), 8);
    }
}
