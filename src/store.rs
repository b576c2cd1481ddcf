//! File-backed session persistence: one pretty-printed JSON document per
//! session under `SESSION_DIR` (default `./data/sessions`).
//!
//! Writes go through a temp file plus rename so a crash mid-write never
//! leaves a truncated record behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::session::Session;

#[derive(Clone, Debug)]
pub struct SessionStore {
  dir: PathBuf,
}

impl SessionStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn from_env() -> Self {
    let dir = std::env::var("SESSION_DIR").unwrap_or_else(|_| "./data/sessions".into());
    Self::new(dir)
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, session_id: &str) -> PathBuf {
    // ids are uuids, but never trust a path component from outside
    let safe: String = session_id
      .chars()
      .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
      .collect();
    self.dir.join(format!("{safe}.json"))
  }

  pub fn save(&self, session: &Session) -> io::Result<()> {
    fs::create_dir_all(&self.dir)?;
    let path = self.path_for(&session.id);
    let json = serde_json::to_string_pretty(session)
      .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    info!(target: "store", session = %session.id, path = %path.display(), "Session persisted");
    Ok(())
  }

  /// Load a session record if one exists on disk. Unreadable records are
  /// reported as absent after a warning so one corrupt file cannot wedge
  /// the whole server.
  pub fn load(&self, session_id: &str) -> Option<Session> {
    let path = self.path_for(session_id);
    let raw = fs::read_to_string(&path).ok()?;
    match serde_json::from_str::<Session>(&raw) {
      Ok(session) => Some(session),
      Err(e) => {
        warn!(target: "store", session = %session_id, error = %e, "Dropping unreadable session record");
        None
      }
    }
  }

  pub fn remove(&self, session_id: &str) {
    let path = self.path_for(session_id);
    if let Err(e) = fs::remove_file(&path) {
      if e.kind() != io::ErrorKind::NotFound {
        warn!(target: "store", session = %session_id, error = %e, "Could not remove session record");
      }
    }
  }
}
