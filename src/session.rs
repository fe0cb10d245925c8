//! Incremental solving sessions.
//!
//! A session pins a board and piece set and owns a resumable `Enumerator`,
//! letting a caller fetch solutions in batches across separate requests
//! instead of re-solving from scratch each time. This generalizes the
//! reference implementation's `SolverSession`/`_SESSIONS` module-level
//! registry into an explicit, injectable type.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::dlx::Enumerator;
use crate::grid::{stamp_placements, Board};
use crate::pieces::Piece;
use crate::placements::Placement;

/// Maximum number of concurrently live sessions. Creating a session beyond
/// this capacity evicts the least-recently-used one, mirroring the
/// reference implementation's `_evict_old_sessions`.
pub const MAX_SESSIONS: usize = 32;

/// One incremental-solving session: a pinned board/piece set, a resumable
/// enumerator, and the running total of solutions produced so far.
pub struct Session {
    pub id: String,
    pub width: usize,
    pub height: usize,
    pub pieces: Vec<Piece>,
    pub base_board: Board,
    enumerator: Enumerator,
    placements_by_id: FxHashMap<usize, Placement>,
    pub cumulative_total: usize,
    pub exhausted: bool,
    /// How many solutions have been served out of the external cache for
    /// this session's fingerprint. Independent of `cumulative_total`: a
    /// batch may be served entirely from cache without advancing the
    /// enumerator, or vice versa.
    pub cache_cursor: usize,
    last_use: Instant,
}

impl Session {
    fn touch(&mut self) {
        self.last_use = Instant::now();
    }

    /// Pulls up to `batch_size` more solutions (as full boards) from the
    /// enumerator, advancing its resumable state, checking `deadline`
    /// between solutions. Returns fewer than `batch_size` boards, possibly
    /// zero, once the enumeration is exhausted (`self.exhausted` is then
    /// set) or the deadline has elapsed (the second return value is then
    /// `true`).
    pub fn next_batch(&mut self, batch_size: usize, deadline: Option<Instant>) -> (Vec<Board>, bool) {
        self.touch();
        let mut boards = Vec::with_capacity(batch_size);
        let mut timed_out = false;
        for _ in 0..batch_size {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    timed_out = true;
                    break;
                }
            }
            match self.enumerator.advance() {
                Some(row_ids) => {
                    let placed: Vec<(u32, Vec<(i32, i32)>)> = row_ids
                        .iter()
                        .map(|id| {
                            let placement = &self.placements_by_id[id];
                            (placement.piece_id, placement.cells.clone())
                        })
                        .collect();
                    boards.push(stamp_placements(&self.base_board, &placed));
                    self.cumulative_total += 1;
                }
                None => {
                    self.exhausted = true;
                    debug!(session = %self.id, total = self.cumulative_total, "enumeration exhausted");
                    break;
                }
            }
        }
        (boards, timed_out)
    }
}

/// A bounded, LRU-evicting registry of live sessions, keyed by session id.
/// Each session's mutable state is behind its own lock, so unrelated
/// sessions never contend with each other.
pub struct SessionRegistry {
    sessions: Mutex<FxHashMap<String, Arc<Mutex<Session>>>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            sessions: Mutex::new(FxHashMap::default()),
        }
    }

    /// Registers a session under the caller-supplied `key`, built from an
    /// already-primed enumerator and placement table. A key already in use
    /// is replaced outright (the idempotent delete-then-recreate flow a
    /// host uses to restart a session under the same key), which does not
    /// count against `MAX_SESSIONS`; only a genuinely new key can trigger
    /// least-recently-used eviction.
    #[allow(clippy::too_many_arguments)]
    pub fn create_session(
        &self,
        key: impl Into<String>,
        width: usize,
        height: usize,
        pieces: Vec<Piece>,
        base_board: Board,
        enumerator: Enumerator,
        placements_by_id: FxHashMap<usize, Placement>,
    ) -> String {
        let id: String = key.into();

        let session = Session {
            id: id.clone(),
            width,
            height,
            pieces,
            base_board,
            enumerator,
            placements_by_id,
            cumulative_total: 0,
            exhausted: false,
            cache_cursor: 0,
            last_use: Instant::now(),
        };

        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(&id) {
            self.evict_lru_locked(&mut sessions);
        }
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    fn evict_lru_locked(&self, sessions: &mut FxHashMap<String, Arc<Mutex<Session>>>) {
        while sessions.len() >= MAX_SESSIONS {
            let Some(oldest_id) = sessions
                .iter()
                .min_by_key(|(_, s)| s.lock().last_use)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            info!(session = %oldest_id, "evicting least-recently-used session");
            sessions.remove(&oldest_id);
        }
    }

    /// Looks up a live session by id, without touching its LRU timestamp
    /// (only `Session::next_batch` does that, since a lookup alone isn't
    /// "use").
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.sessions.lock().get(id).cloned()
    }

    /// Removes a session, if present.
    pub fn delete(&self, id: &str) -> bool {
        self.sessions.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dlx::Dlx;
    use crate::grid::empty_board;

    fn dummy_enumerator() -> Enumerator {
        let mut dlx = Dlx::new(1);
        dlx.add_row(0, &[1]);
        Enumerator::new(dlx)
    }

    #[test]
    fn create_and_fetch_session() {
        let registry = SessionRegistry::new();
        let id = registry.create_session(
            "solve:1",
            3,
            3,
            Vec::new(),
            empty_board(3, 3),
            dummy_enumerator(),
            FxHashMap::default(),
        );
        assert_eq!(id, "solve:1");
        assert!(registry.get(&id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn delete_removes_session() {
        let registry = SessionRegistry::new();
        let id = registry.create_session(
            "solve:1",
            3,
            3,
            Vec::new(),
            empty_board(3, 3),
            dummy_enumerator(),
            FxHashMap::default(),
        );
        assert!(registry.delete(&id));
        assert!(registry.get(&id).is_none());
    }

    #[test]
    fn recreate_under_same_key_replaces_without_evicting() {
        let registry = SessionRegistry::new();
        registry.create_session(
            "solve:1",
            3,
            3,
            Vec::new(),
            empty_board(3, 3),
            dummy_enumerator(),
            FxHashMap::default(),
        );
        registry.get("solve:1").unwrap().lock().cumulative_total = 7;

        registry.create_session(
            "solve:1",
            3,
            3,
            Vec::new(),
            empty_board(3, 3),
            dummy_enumerator(),
            FxHashMap::default(),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("solve:1").unwrap().lock().cumulative_total, 0);
    }

    #[test]
    fn evicts_least_recently_used_beyond_capacity() {
        let registry = SessionRegistry::new();
        let mut ids = Vec::new();
        for i in 0..MAX_SESSIONS {
            ids.push(registry.create_session(
                format!("solve:{i}"),
                3,
                3,
                Vec::new(),
                empty_board(3, 3),
                dummy_enumerator(),
                FxHashMap::default(),
            ));
        }
        assert_eq!(registry.len(), MAX_SESSIONS);

        // touch every session but the first, so it becomes the LRU victim
        for id in &ids[1..] {
            if let Some(session) = registry.get(id) {
                session.lock().touch();
            }
        }

        let newest = registry.create_session(
            "solve:new",
            3,
            3,
            Vec::new(),
            empty_board(3, 3),
            dummy_enumerator(),
            FxHashMap::default(),
        );
        assert_eq!(registry.len(), MAX_SESSIONS);
        assert!(registry.get(&ids[0]).is_none());
        assert!(registry.get(&newest).is_some());
    }
}
