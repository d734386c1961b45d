//! Game session storage.
//!
//! The [`SessionStore`] trait is the persistence seam; [`MemorySessionStore`]
//! keeps records in a concurrent map for the process lifetime.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::core::{GameSettings, GameState};

/// One stored game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: Uuid,
    pub settings: GameSettings,
    pub state: GameState,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Storage for game sessions.
pub trait SessionStore: Send + Sync {
    /// Store a new game under a fresh id.
    fn create(&self, state: GameState) -> SessionRecord;

    fn find(&self, id: Uuid) -> Option<SessionRecord>;

    /// Replace the state and bump `updated_at`. `None` if `id` is unknown.
    fn update(&self, id: Uuid, state: GameState) -> Option<SessionRecord>;

    /// Returns whether a record was removed.
    fn delete(&self, id: Uuid) -> bool;

    /// All records, oldest first.
    fn list(&self) -> Vec<SessionRecord>;
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: DashMap<Uuid, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, state: GameState) -> SessionRecord {
        let now = OffsetDateTime::now_utc();
        let record = SessionRecord {
            id: Uuid::new_v4(),
            settings: state.settings.clone(),
            state,
            created_at: now,
            updated_at: now,
        };
        self.records.insert(record.id, record.clone());
        record
    }

    fn find(&self, id: Uuid) -> Option<SessionRecord> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn update(&self, id: Uuid, state: GameState) -> Option<SessionRecord> {
        let mut entry = self.records.get_mut(&id)?;
        let updated_at = OffsetDateTime::now_utc().max(entry.created_at);
        entry.state = state;
        entry.updated_at = updated_at;
        Some(entry.value().clone())
    }

    fn delete(&self, id: Uuid) -> bool {
        self.records.remove(&id).is_some()
    }

    fn list(&self) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> =
            self.records.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        records
    }
}
