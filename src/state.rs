//! Application state: the session registry, the article desk, the optional
//! LLM client, and the on-disk session store.
//!
//! Each session lives behind its own `Mutex`, so at most one operation runs
//! against a session at a time; the registry map is only locked long enough
//! to look the session up.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::load_agent_config_from_env;
use crate::error::{CoreError, Result};
use crate::generator::LlmClient;
use crate::session::Session;
use crate::source::NewsDesk;
use crate::store::SessionStore;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
    pub desk: Arc<NewsDesk>,
    pub llm: Option<LlmClient>,
    pub store: SessionStore,
}

impl AppState {
    /// Build state from env: load config, build the article desk, init the
    /// LLM client (if an API key is present), open the session store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();

        let desk = Arc::new(NewsDesk::new(&cfg.articles));
        let llm = LlmClient::from_env(cfg.prompts);
        if let Some(c) = &llm {
            info!(target: "newslex_backend", base_url = %c.base_url, fast_model = %c.fast_model, strong_model = %c.strong_model, "LLM enabled.");
        } else {
            info!(target: "newslex_backend", "LLM disabled (no OPENAI_API_KEY). Generation-backed operations will fail as retryable.");
        }

        let store = SessionStore::from_env();
        info!(target: "newslex_backend", dir = %store.dir().display(), "Session store ready");

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            desk,
            llm,
            store,
        }
    }

    /// Create, register, and persist a fresh session.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> SharedSession {
        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone());
        if let Err(e) = self.store.save(&session) {
            warn!(target: "store", session = %id, error = %e, "Could not persist new session");
        }
        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .await
            .insert(id.clone(), shared.clone());
        info!(target: "session", session = %id, "Session created");
        shared
    }

    /// Look up a live session, falling back to the on-disk record so sessions
    /// survive a process restart.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn session(&self, id: &str) -> Result<SharedSession> {
        if let Some(s) = { self.sessions.read().await.get(id).cloned() } {
            return Ok(s);
        }
        if let Some(loaded) = self.store.load(id) {
            info!(target: "session", session = %id, "Session revived from disk");
            let mut map = self.sessions.write().await;
            // a concurrent request may have revived it first; keep that one
            let shared = map
                .entry(id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(loaded)))
                .clone();
            return Ok(shared);
        }
        Err(CoreError::UnknownSession(id.to_string()))
    }

    /// Best-effort persistence after a successful operation. A write failure
    /// is logged, not surfaced: the in-memory session stays authoritative.
    pub fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session) {
            warn!(target: "store", session = %session.id, error = %e, "Could not persist session");
        }
    }

    /// Drop the session from the registry and delete its record.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn remove_session(&self, id: &str) {
        self.sessions.write().await.remove(id);
        self.store.remove(id);
        info!(target: "session", session = %id, "Session removed");
    }
}
