//! File-backed cache of the signed-in user.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{SessionError, UserRecord};

/// Session file name inside the data directory.
pub const SESSION_FILENAME: &str = "session.json";

/// Owns the current session for the whole process.
///
/// Create one per process and pass it to whatever needs identity.
#[derive(Debug)]
pub struct SessionCache {
    path: PathBuf,
    current: Option<UserRecord>,
}

impl SessionCache {
    /// Cache stored at `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
        }
    }

    /// Cache stored in `data_dir/session.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> Option<&UserRecord> {
        self.current.as_ref()
    }

    /// Read the session from disk.
    ///
    /// A missing file means no session. A corrupt file is treated the same
    /// and logged, so a bad cache never locks a user out.
    pub async fn load(&mut self) -> Result<Option<&UserRecord>, SessionError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.current = None;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        self.current = match serde_json::from_str::<UserRecord>(&contents) {
            Ok(user) => {
                debug!("Loaded session for {}", user.masked_email());
                Some(user)
            }
            Err(e) => {
                warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        };
        Ok(self.current.as_ref())
    }

    /// Persist `user` as the current session.
    pub async fn save(&mut self, user: UserRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&user)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Saved session for {}", user.masked_email());
        self.current = Some(user);
        Ok(())
    }

    /// Forget the current session. Clearing an empty cache is not an error.
    pub async fn clear(&mut self) -> Result<(), SessionError> {
        self.current = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use chrono::TimeZone;

    fn patient() -> UserRecord {
        UserRecord {
            full_name: "Jane Roe".to_string(),
            email: "jane@example.com".to_string(),
            phone: Some("555-0101".to_string()),
            role: Role::Patient,
            created_at: chrono::Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = SessionCache::in_dir(dir.path());
        assert!(cache.load().await.unwrap().is_none());
        assert!(cache.current().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_in_new_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = SessionCache::in_dir(&dir.path().join("nested"));
        cache.save(patient()).await.unwrap();
        assert_eq!(cache.current(), Some(&patient()));

        let mut fresh = SessionCache::in_dir(&dir.path().join("nested"));
        let loaded = fresh.load().await.unwrap().cloned();
        assert_eq!(loaded, Some(patient()));
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = SessionCache::in_dir(dir.path());
        cache.save(patient()).await.unwrap();
        cache.clear().await.unwrap();

        assert!(cache.current().is_none());
        assert!(!cache.path().exists());
        // Second clear is a no-op.
        cache.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = SessionCache::in_dir(dir.path());
        std::fs::write(cache.path(), "{not json").unwrap();

        assert!(cache.load().await.unwrap().is_none());
    }
}
