use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use uuid::Uuid;

use crate::{repository::TodoRepository, state::Console};

/// Request header carrying the page's session id; htmx sends it on every
/// request through `hx-headers`.
pub const SESSION_HEADER: &str = "X-Console-Session";

struct Entry {
    console: Arc<Console>,
    last_seen: Instant,
}

/// One `Console` per loaded page, so inputs, edit mode and status never leak
/// between tabs. Sessions untouched for `idle` are dropped.
pub struct Sessions {
    repository: Arc<dyn TodoRepository>,
    consoles: DashMap<Uuid, Entry>,
    idle: Duration,
}

impl Sessions {
    pub fn new(repository: Arc<dyn TodoRepository>, idle: Duration) -> Self {
        Self {
            repository,
            consoles: DashMap::new(),
            idle,
        }
    }

    /// Starts a fresh session for a page load.
    pub fn open(&self) -> (Uuid, Arc<Console>) {
        self.sweep();
        let id = Uuid::new_v4();
        let console = Arc::new(Console::new(self.repository.clone()));
        self.consoles.insert(
            id,
            Entry {
                console: console.clone(),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session = %id, open = self.len(), "session opened");
        (id, console)
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Console>> {
        let mut entry = self.consoles.get_mut(id)?;
        if entry.last_seen.elapsed() >= self.idle {
            drop(entry);
            self.consoles.remove(id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.console.clone())
    }

    pub fn len(&self) -> usize {
        self.consoles.len()
    }

    fn sweep(&self) {
        let idle = self.idle;
        self.consoles.retain(|_, entry| entry.last_seen.elapsed() < idle);
    }
}
