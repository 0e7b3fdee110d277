//! Common filesystem paths used by haulboard.

use std::path::PathBuf;

/// Base directory for haulboard state (config, saved session).
///
/// Defaults to `~/.config/haulboard`, but can be overridden via
/// `HAULBOARD_DIR` for testing or multi-account setups.
pub fn haulboard_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HAULBOARD_DIR") {
        return PathBuf::from(dir);
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".config").join("haulboard")
}

/// Path to the haulboard configuration file.
pub fn config_path() -> PathBuf {
    haulboard_dir().join("config.toml")
}

/// Path to the persisted session file.
pub fn session_path() -> PathBuf {
    haulboard_dir().join("session.json")
}

#[doc(hidden)]
pub fn test_env_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
