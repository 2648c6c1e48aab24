use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app::{InkpostError, Result};
use crate::session::TokenPair;

/// Keeps the access/refresh pair between runs as a small JSON file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.local/share/inkpost/session.json` (platform data dir).
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| InkpostError::Config("Could not find data directory".into()))?;
        Ok(data_dir.join("inkpost").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored tokens, or `None` when absent or unreadable.
    pub fn load(&self) -> Option<TokenPair> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, tokens: &TokenPair) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(tokens)?)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tokens() -> TokenPair {
        TokenPair {
            access: "access-token".into(),
            refresh: "refresh-token".into(),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("session.json"));

        store.save(&tokens()).unwrap();
        assert_eq!(store.load(), Some(tokens()));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("session.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(TokenStore::new(path).load(), None);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("session.json"));
        store.save(&tokens()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }
}
