//! Session cache persistence.
//!
//! Stores the current session in `<base>/credentials.json` with restricted
//! permissions (0600) so a signed-in user stays signed in across restarts.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::auth::session::Session;
use crate::config::paths;

/// Loads the cached session from the default credentials path.
/// Returns `None` if no session has been cached.
pub fn load() -> Result<Option<Session>> {
    load_from(&paths::credentials_path())
}

/// Loads a cached session from a specific path.
pub fn load_from(path: &Path) -> Result<Option<Session>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

    let session = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;

    Ok(Some(session))
}

/// Saves the session to the default credentials path.
pub fn save(session: &Session) -> Result<()> {
    save_to(&paths::credentials_path(), session)
}

/// Saves the session to a specific path with restricted permissions (0600).
pub fn save_to(path: &Path, session: &Session) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let contents =
        serde_json::to_string_pretty(session).context("Failed to serialize credentials")?;

    // Write with restricted permissions
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        file.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    #[cfg(not(unix))]
    {
        fs::write(path, contents)
            .with_context(|| format!("Failed to write to {}", path.display()))?;
    }

    Ok(())
}

/// Removes the cached session at the default credentials path.
/// Returns true if a cache file was present.
pub fn clear() -> Result<bool> {
    clear_at(&paths::credentials_path())
}

/// Removes the cached session at a specific path.
pub fn clear_at(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(path)
        .with_context(|| format!("Failed to remove credentials at {}", path.display()))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::auth::session::{Identity, now_secs};

    fn session() -> Session {
        Session {
            access_token: "access-token-for-tests-1234".to_string(),
            refresh_token: Some("refresh-token-for-tests".to_string()),
            expires_at: now_secs() + 3600,
            identity: Identity {
                user_id: "user-1".to_string(),
                email: Some("dev@example.com".to_string()),
                metadata: serde_json::Value::Null,
            },
        }
    }

    /// Cache: save then load returns the same session.
    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        save_to(&path, &session()).unwrap();

        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-token-for-tests-1234");
        assert_eq!(loaded.identity.user_id, "user-1");
    }

    /// Cache: missing file loads as None, not an error.
    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        assert!(load_from(&path).unwrap().is_none());
    }

    /// Cache: parent directories are created on save.
    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        save_to(&path, &session()).unwrap();
        assert!(path.exists());
    }

    /// Cache: file is written with owner-only permissions.
    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        save_to(&path, &session()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    /// Cache: clear removes the file and reports whether it existed.
    #[test]
    fn test_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        assert!(!clear_at(&path).unwrap());

        save_to(&path, &session()).unwrap();
        assert!(clear_at(&path).unwrap());
        assert!(!path.exists());
    }
}
