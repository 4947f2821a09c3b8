use instant::{Duration, Instant};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::config::{EngineOptions, ExpandOptions};
use crate::engine::Lattice;
use crate::error::{LatticeError, Result};
use crate::placement::{Coord, Direction, Placement, Rect};
use crate::view::SnapshotView;
use crate::word_index::{WordIndex, WordTable};
use crate::DEFAULT_SESSION_IDLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Session {
    lattice: Lattice,
    last_access: Instant,
}

/// In-memory registry of live lattices. Every session gets its own `WordIndex` over the shared
/// dictionary, so marking words used in one session never affects another. Sessions that sit idle
/// longer than the idle timeout are dropped by `sweep_expired`.
///
/// The store itself assumes a single writer; callers that serve several clients have to serialize
/// access (e.g. behind a `Mutex`).
#[derive(Debug)]
pub struct SessionStore {
    table: Arc<WordTable>,
    sessions: HashMap<SessionId, Session>,
    next_id: u64,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(table: Arc<WordTable>) -> SessionStore {
        SessionStore {
            table,
            sessions: HashMap::new(),
            next_id: 1,
            idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }

    pub fn with_idle_timeout(self, idle_timeout: Duration) -> SessionStore {
        SessionStore { idle_timeout, ..self }
    }

    pub fn table(&self) -> &Arc<WordTable> {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start a new session seeded with `seed` at `origin`.
    pub fn create_session(
        &mut self,
        seed: &str,
        origin: Coord,
        direction: Direction,
        options: EngineOptions,
    ) -> Result<SessionId> {
        let index = WordIndex::new(self.table.clone());
        let lattice = Lattice::new(index, seed, origin, direction, options)?;

        let id = SessionId(self.next_id);
        self.next_id += 1;
        self.sessions.insert(id, Session { lattice, last_access: Instant::now() });

        info!("created session {} seeded with {:?} ({} live)", id, seed, self.sessions.len());
        Ok(id)
    }

    /// Read-only access to a session's lattice. This doesn't count as activity.
    pub fn lattice(&self, id: SessionId) -> Result<&Lattice> {
        self.sessions.get(&id).map(|session| &session.lattice).ok_or(LatticeError::UnknownSession(id))
    }

    /// Look up a session for a request and mark it as recently used.
    fn touch(&mut self, id: SessionId) -> Result<&mut Lattice> {
        let session = self.sessions.get_mut(&id).ok_or(LatticeError::UnknownSession(id))?;
        session.last_access = Instant::now();
        Ok(&mut session.lattice)
    }

    pub fn generate_words(&mut self, id: SessionId, count: usize, depth: usize) -> Result<Vec<Placement>> {
        self.touch(id)?.generate(count, depth)
    }

    pub fn expand_region(&mut self, id: SessionId, rect: Rect, options: &ExpandOptions) -> Result<Vec<Placement>> {
        self.touch(id)?.expand_region(rect, options)
    }

    pub fn snapshot_view(&mut self, id: SessionId) -> Result<SnapshotView> {
        Ok(self.touch(id)?.view())
    }

    /// Drop a session. Returns false if it didn't exist.
    pub fn remove(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Drop every session that has been idle for longer than the idle timeout as of `now`, and
    /// return how many were dropped.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let idle_timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = now.saturating_duration_since(session.last_access) <= idle_timeout;
            if !keep {
                info!("session {} expired with {} placements", id, session.lattice.placements().len());
            }
            keep
        });
        before - self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use instant::{Duration, Instant};
    use std::sync::Arc;

    use crate::config::{EngineOptions, ExpandOptions};
    use crate::engine::tests::{init_logging, WORDS};
    use crate::error::LatticeError;
    use crate::placement::{Direction::*, Rect};
    use crate::session::{SessionId, SessionStore};
    use crate::word_index::WordTable;

    fn store() -> SessionStore {
        init_logging();
        SessionStore::new(Arc::new(WordTable::new(WORDS)))
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut store = store();
        let first = store.create_session("crossword", (0, 0), Horizontal, EngineOptions::default()).unwrap();
        let second = store.create_session("crossword", (0, 0), Horizontal, EngineOptions::default()).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);

        let added = store.generate_words(first, 3, 0).unwrap();
        assert_eq!(added.len(), 3);

        // Words used up in the first session are still available in the second.
        let second_lattice = store.lattice(second).unwrap();
        assert_eq!(second_lattice.placements().len(), 1);
        assert!(added.iter().all(|p| second_lattice.index().has_word(&p.word)));
        assert!(added.iter().all(|p| !store.lattice(first).unwrap().index().has_word(&p.word)));
    }

    #[test]
    fn test_unknown_session_is_rejected() {
        let mut store = store();
        let missing = SessionId(42);
        assert!(matches!(store.generate_words(missing, 1, 0), Err(LatticeError::UnknownSession(id)) if id == missing));
        assert!(matches!(store.snapshot_view(missing), Err(LatticeError::UnknownSession(_))));
        assert!(matches!(
            store.expand_region(missing, Rect::new(0, 0, 1, 1), &ExpandOptions::default()),
            Err(LatticeError::UnknownSession(_))
        ));
        assert!(!store.remove(missing));
    }

    #[test]
    fn test_invalid_seed_creates_nothing() {
        let mut store = store();
        assert!(matches!(
            store.create_session("two words", (0, 0), Vertical, EngineOptions::default()),
            Err(LatticeError::InvalidWord { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_drops_idle_sessions() {
        let mut store = store();
        let id = store.create_session("crossword", (0, 0), Horizontal, EngineOptions::default()).unwrap();
        store.create_session("rose", (5, 5), Vertical, EngineOptions::default()).unwrap();

        assert_eq!(store.sweep_expired(Instant::now()), 0);
        assert_eq!(store.len(), 2);

        let view = store.snapshot_view(id).unwrap();
        assert_eq!(view.placements.len(), 1);

        assert_eq!(store.sweep_expired(Instant::now() + Duration::from_secs(2 * 60 * 60)), 2);
        assert!(store.is_empty());
        assert!(store.lattice(id).is_err());
    }

    #[test]
    fn test_custom_idle_timeout() {
        let mut store = store().with_idle_timeout(Duration::from_secs(10));
        store.create_session("crossword", (0, 0), Horizontal, EngineOptions::default()).unwrap();
        assert_eq!(store.sweep_expired(Instant::now() + Duration::from_secs(5)), 0);
        assert_eq!(store.sweep_expired(Instant::now() + Duration::from_secs(60)), 1);
    }
}
