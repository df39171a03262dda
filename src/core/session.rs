//! # Session Persistence
//!
//! The logged-in session lives in `~/.painel/session.json`: the token sent
//! with every resource call, who logged in and when, and whether the user
//! asked to be remembered. Whatever else the login endpoint returned is kept
//! alongside in `extra`.
//!
//! All writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::AuthResponse;
use crate::core::config::painel_dir;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub remember: bool,
    /// RFC 3339 timestamp of the login.
    pub logged_in_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn from_login(username: &str, remember: bool, auth: AuthResponse) -> Self {
        let mut extra = auth.extra;
        for key in ["username", "remember", "logged_in_at"] {
            extra.remove(key);
        }
        Self {
            token: auth.token,
            username: username.to_string(),
            remember,
            logged_in_at: Utc::now().to_rfc3339(),
            extra,
        }
    }
}

/// Returns `~/.painel/session.json`, creating the directory if needed.
pub fn session_path() -> io::Result<PathBuf> {
    let dir = painel_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
    fs::create_dir_all(&dir)?;
    Ok(dir.join("session.json"))
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn save_session_to(path: &Path, session: &Session) -> io::Result<()> {
    atomic_write_json(path, session)
}

/// Reads a stored session. A missing file is `Ok(None)`.
pub fn load_session_from(path: &Path) -> io::Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let session =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(session))
}

pub fn clear_session_at(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Persists the session. This is the single entry point for saving; call it
/// from the TUI on the `SaveSession` effect.
pub fn save_session(session: &Session) {
    match session_path().and_then(|path| save_session_to(&path, session)) {
        Ok(()) => debug!("Session saved for {}", session.username),
        Err(e) => warn!("Failed to save session: {}", e),
    }
}

/// Loads the stored session, if any. Unreadable files are logged and
/// treated as no session.
pub fn load_session() -> Option<Session> {
    match session_path().and_then(|path| load_session_from(&path)) {
        Ok(session) => session,
        Err(e) => {
            warn!("Failed to load session: {}", e);
            None
        }
    }
}

pub fn clear_session() {
    match session_path().and_then(|path| clear_session_at(&path)) {
        Ok(()) => debug!("Session cleared"),
        Err(e) => warn!("Failed to clear session: {}", e),
    }
}
