//! Readiness handle for the search engine.
//!
//! Index construction can take minutes when the snapshot is cold, so the
//! surrounding service builds the engine on a background worker. The
//! handle makes the two states explicit: callers get
//! `SearchError::NotReady` before publication, never an empty result
//! set, and the engine reference only becomes visible after construction
//! fully completes. Once published the engine is immutable, so query
//! reads need no further coordination.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::error::{SearchError, SearchResult};
use crate::scoring::{SearchEngine, SearchHit};

enum HandleState {
    Uninitialized,
    Ready(Arc<SearchEngine>),
}

/// Two-state handle: `Uninitialized` until a fully built engine is
/// published, `Ready` afterwards.
pub struct SearchHandle {
    state: RwLock<HandleState>,
}

impl SearchHandle {
    /// Creates a handle with no engine yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HandleState::Uninitialized),
        }
    }

    /// Publishes a fully built engine, flipping the handle to ready.
    ///
    /// Publishing again replaces the engine wholesale; in-flight queries
    /// keep their `Arc` to the old one.
    pub fn publish(&self, engine: Arc<SearchEngine>) {
        info!(records = engine.index().len(), "search engine published");
        *self.state.write() = HandleState::Ready(engine);
    }

    /// True once an engine has been published.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), HandleState::Ready(_))
    }

    /// The published engine, if any.
    #[must_use]
    pub fn engine(&self) -> Option<Arc<SearchEngine>> {
        match &*self.state.read() {
            HandleState::Uninitialized => None,
            HandleState::Ready(engine) => Some(Arc::clone(engine)),
        }
    }

    /// Runs a search on the published engine.
    ///
    /// # Errors
    /// `SearchError::NotReady` before publication; this is distinct from
    /// a ready engine returning zero matches.
    pub fn search(&self, query: &str, limit: usize) -> SearchResult<Vec<SearchHit>> {
        let engine = self.engine().ok_or(SearchError::NotReady)?;
        engine.search(query, limit)
    }
}

impl Default for SearchHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
