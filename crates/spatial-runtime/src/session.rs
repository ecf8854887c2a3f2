//! Session-scoped room state.
//!
//! Each conversation gets its own [`Room`] behind its own lock. Sessions are
//! created explicitly, disposed explicitly, and evicted when idle or when the
//! store is full. No room is ever shared between sessions.

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use spatial_core::{EngineError, Room};

use crate::config::SessionConfig;

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared handle to one session's room.
///
/// Cloning the handle does not clone the room.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    created_at: DateTime<Utc>,
    room: Arc<Mutex<Room>>,
}

impl SessionHandle {
    fn new(id: SessionId, room: Room) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            room: Arc::new(Mutex::new(room)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Run a read-only closure against the room.
    pub fn read<T>(&self, f: impl FnOnce(&Room) -> T) -> T {
        f(&self.room.lock())
    }

    /// Run a mutating closure against the room while holding its lock.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&mut Room) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        f(&mut self.room.lock())
    }
}

/// Bounded store of live sessions.
pub struct SessionStore {
    sessions: Cache<SessionId, SessionHandle>,
    next_id: AtomicU64,
    wall_reflection: f64,
}

impl SessionStore {
    /// Create a store; new rooms start with `wall_reflection`.
    pub fn new(config: &SessionConfig, wall_reflection: f64) -> Result<Self, EngineError> {
        let wall_reflection = spatial_core::guard::unit_interval("wall_reflection", wall_reflection)?;
        let sessions = Cache::builder()
            .max_capacity(config.max_sessions)
            .time_to_idle(config.idle_timeout)
            .build();

        Ok(Self {
            sessions,
            next_id: AtomicU64::new(1),
            wall_reflection,
        })
    }

    /// Open a new session with an empty room.
    pub fn create(&self) -> SessionHandle {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed);
        let id = SessionId(format!("room-{:x}-{:04}", Utc::now().timestamp_millis(), seq));

        let room = Room::with_parameters(0.0, self.wall_reflection).unwrap_or_default();
        let handle = SessionHandle::new(id.clone(), room);
        self.sessions.insert(id.clone(), handle.clone());

        info!(session = %id, "session created");
        handle
    }

    /// Look up a live session.
    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(id)
    }

    /// Drop a session. Returns false if it did not exist.
    pub fn dispose(&self, id: &SessionId) -> bool {
        let existed = self.sessions.remove(id).is_some();
        if existed {
            info!(session = %id, "session disposed");
        }
        existed
    }

    /// Number of live sessions, after pending evictions are applied.
    pub fn len(&self) -> u64 {
        self.sessions.run_pending_tasks();
        self.sessions.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(&SessionConfig::default(), 0.5).unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let store = store();
        let handle = store.create();

        let found = store.get(handle.id()).unwrap();
        assert_eq!(found.id(), handle.id());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = store();
        let a = store.create();
        let b = store.create();
        assert_ne!(a.id(), b.id());

        a.update(|room| {
            room.set_parameters(10.0, 0.0)?;
            room.add_light_source("Lamp", 1000.0)
        })
        .unwrap();

        assert_eq!(a.read(|room| room.current_lux()), 100.0);
        assert_eq!(b.read(|room| room.sources().len()), 0);
    }

    #[test]
    fn test_handles_share_one_room() {
        let store = store();
        let handle = store.create();
        let again = store.get(handle.id()).unwrap();

        handle
            .update(|room| room.add_light_source("Lamp", 800.0))
            .unwrap();
        assert_eq!(again.read(|room| room.total_lumens()), 800.0);
    }

    #[test]
    fn test_dispose() {
        let store = store();
        let handle = store.create();

        assert!(store.dispose(handle.id()));
        assert!(store.get(handle.id()).is_none());
        assert!(!store.dispose(handle.id()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_new_room_uses_configured_reflection() {
        let store = SessionStore::new(&SessionConfig::default(), 0.8).unwrap();
        let handle = store.create();
        assert_eq!(handle.read(|room| room.wall_reflection()), 0.8);
    }

    #[test]
    fn test_invalid_reflection_rejected() {
        assert!(SessionStore::new(&SessionConfig::default(), 2.0).is_err());
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let store = store();
        let handle = store.create();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let handle = handle.clone();
                scope.spawn(move || {
                    handle
                        .update(|room| room.add_light_source(format!("Lamp {}", i), 100.0))
                        .unwrap();
                });
            }
        });

        assert_eq!(handle.read(|room| room.sources().len()), 8);
        assert_eq!(handle.read(|room| room.total_lumens()), 800.0);
    }
}
