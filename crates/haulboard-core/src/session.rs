//! Explicit session context handed to anything that talks to the backend.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable that overrides the saved session token.
pub const TOKEN_ENV: &str = "HAULBOARD_TOKEN";

/// Backend location and credentials for one operator session.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct SavedSession {
    token: String,
}

impl Session {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let token = token.filter(|t| !t.trim().is_empty());
        Self { base_url, token }
    }

    /// Build a session from config, taking the token from `HAULBOARD_TOKEN`
    /// or, failing that, the saved session file.
    pub fn from_config(config: &crate::Config) -> crate::Result<Self> {
        let token = match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Some(token),
            _ => Self::load_saved_token()?,
        };
        Ok(Self::new(config.api.base_url.clone(), token))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Absolute URL for an API path such as `/search`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Persist the token to the session file.
    pub fn save(&self) -> crate::Result<()> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| crate::Error::Session("No token to save".to_string()))?;

        let path = crate::paths::session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&SavedSession { token })?;
        std::fs::write(&path, content)?;
        tracing::debug!("Saved session to {}", path.display());
        Ok(())
    }

    /// Remove the saved session. Returns `false` if there was none.
    pub fn clear_saved() -> crate::Result<bool> {
        let path = crate::paths::session_path();
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&path)?;
        Ok(true)
    }

    fn load_saved_token() -> crate::Result<Option<String>> {
        let path = crate::paths::session_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let saved: SavedSession = serde_json::from_str(&content)
            .map_err(|e| crate::Error::Session(format!("{}: {}", path.display(), e)))?;
        Ok(Some(saved.token))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
