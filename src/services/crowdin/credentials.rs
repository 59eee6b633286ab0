use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,

    #[serde(default)]
    saved_at: String,
}

/// Keeps the Crowdin access token between runs, as a small JSON file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>, CredentialsError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = fs::read_to_string(&self.path).map_err(|source| self.io_error(source))?;
        let stored: StoredToken =
            serde_json::from_str(&data).map_err(|source| CredentialsError::Parse {
                path: self.path.display().to_string(),
                source,
            })?;

        if stored.access_token.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(stored.access_token))
    }

    pub fn save(&self, token: &str) -> Result<(), CredentialsError> {
        let stored = StoredToken {
            access_token: token.to_string(),
            saved_at: chrono::Local::now().to_rfc3339(),
        };
        let json = serde_json::to_string_pretty(&stored).map_err(|source| CredentialsError::Parse {
            path: self.path.display().to_string(),
            source,
        })?;

        write_atomic(&self.path, json.as_bytes()).map_err(|source| self.io_error(source))
    }

    pub fn clear(&self) -> Result<(), CredentialsError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| self.io_error(source))?;
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> CredentialsError {
        CredentialsError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = tmp_path(path);

    if let Some(parent) = tmp.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, bytes)?;

    // owner read/write only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "credentials".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested").join("token.json"));

        assert_eq!(store.load().unwrap(), None);

        store.save("tok-1").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-1"));
        assert!(!dir.path().join("nested").join("token.json.tmp").exists());

        store.save("tok-2").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("tok-2"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("token.json"));
        store.save("secret").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        fs::write(&path, "garbage").unwrap();

        let err = CredentialStore::new(&path).load().unwrap_err();
        assert!(matches!(err, CredentialsError::Parse { .. }));
    }
}
