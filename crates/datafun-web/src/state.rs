//! Shared application state for the web server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use datafun_common::Result;
use datafun_core::contact::ContactForm;
use datafun_core::{generate, Dataset, DatasetCache, Event, Rendered, SessionState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;

/// Widget values a page needs besides its blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub contact: ContactForm,
    pub columns: Vec<String>,
    pub selected_column: Option<String>,
}

impl SessionSnapshot {
    fn of(session: &SessionState) -> Self {
        let upload = session.upload();
        Self {
            contact: session.contact().clone(),
            columns: upload.map(|u| u.table.columns().to_vec()).unwrap_or_default(),
            selected_column: upload
                .and_then(|u| u.selected_column())
                .map(|(_, name)| name.to_string()),
        }
    }
}

struct SessionEntry {
    state: SessionState,
    last_seen: Instant,
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    datasets: DatasetCache,
    /// One entry per session cookie; each is only touched by its own requests.
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    rng: Mutex<StdRng>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Build state around a caller-supplied random source.
    pub fn with_rng(config: Config, rng: StdRng) -> Self {
        Self {
            config,
            datasets: DatasetCache::new(),
            sessions: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// The dashboard dataset at the configured size.
    pub fn dataset(&self) -> Result<Dataset> {
        self.datasets.get_or_generate(self.config.data.rows)
    }

    /// A dataset of any size. Only the configured size is cached.
    pub fn dataset_of(&self, rows: usize) -> Result<Dataset> {
        if rows == self.config.data.rows {
            self.dataset()
        } else {
            generate(rows)
        }
    }

    /// Run one render cycle for `session`, creating the session on first use.
    pub fn dispatch(&self, session: Uuid, event: Event) -> Result<(Rendered, SessionSnapshot)> {
        self.dispatch_at(session, event, Instant::now())
    }

    pub(crate) fn dispatch_at(
        &self,
        session: Uuid,
        event: Event,
        now: Instant,
    ) -> Result<(Rendered, SessionSnapshot)> {
        let dataset = self.dataset()?;
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        self.evict(&mut sessions, session, now);

        let entry = sessions.entry(session).or_insert_with(|| {
            info!("New session {}", session);
            SessionEntry {
                state: SessionState::new(&mut *rng),
                last_seen: now,
            }
        });
        entry.last_seen = now;
        let rendered = entry.state.handle(event, &dataset, &mut *rng)?;
        Ok((rendered, SessionSnapshot::of(&entry.state)))
    }

    /// Drop idle sessions, then make room for `incoming` if the store is full.
    fn evict(&self, sessions: &mut HashMap<Uuid, SessionEntry>, incoming: Uuid, now: Instant) {
        let ttl = self.config.session_ttl();
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= ttl);
        if sessions.len() < before {
            debug!("Expired {} idle sessions", before - sessions.len());
        }

        if sessions.contains_key(&incoming) {
            return;
        }
        while sessions.len() >= self.config.server.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    debug!("Session store full, dropping {}", id);
                    sessions.remove(&id);
                }
                None => break,
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn cached_datasets(&self) -> usize {
        self.datasets.len()
    }
}

pub type SharedState = Arc<AppState>;
