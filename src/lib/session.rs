//! Bearer token persistence and the current-user cache.
use std::{
    error::Error,
    fs::File,
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::api::{models::UserProfile, ApiClient, ApiError};

#[derive(Deserialize, Serialize, Debug, PartialEq)]
struct StoredSession {
    token: String,
}

/// File-backed token storage. A missing file means nobody is logged in.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<String>, Box<dyn Error>> {
        if !self.path.exists() {
            return Ok(None);
        }
        debug!("Reading session from {}", self.path.display());
        let file = BufReader::new(File::open(&self.path)?);
        let session: StoredSession = serde_json::from_reader(file)?;
        Ok(Some(session.token))
    }

    pub fn save(&self, token: &str) -> Result<(), Box<dyn Error>> {
        info!("Writing session to {}", self.path.display());
        let file = File::create(&self.path)?;
        serde_json::to_writer_pretty(
            file,
            &StoredSession {
                token: token.to_owned(),
            },
        )?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), Box<dyn Error>> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed session {}", self.path.display());
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Memo of the logged-in user's profile.
///
/// Owned by whoever drives the session and invalidated on logout and
/// after every profile mutation.
#[derive(Debug, Default)]
pub struct UserCache {
    current: Option<UserProfile>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    pub fn store(&mut self, profile: UserProfile) {
        self.current = Some(profile);
    }

    pub fn invalidate(&mut self) {
        if self.current.take().is_some() {
            debug!("User cache invalidated");
        }
    }

    pub async fn get_or_fetch(&mut self, api: &ApiClient) -> Result<&UserProfile, ApiError> {
        if self.current.is_none() {
            let profile = api.profile().await?;
            self.current = Some(profile);
        }
        self.current.as_ref().ok_or(ApiError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Role;

    fn temp_session(name: &str) -> SessionStore {
        let path = std::env::temp_dir().join(format!(
            "portal-session-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        SessionStore::new(path)
    }

    #[test]
    fn missing_session_file_means_logged_out() {
        let store = temp_session("missing");
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn token_survives_save_and_clear() {
        let store = temp_session("roundtrip");
        store.save("abc.def").unwrap();
        assert_eq!(store.load().unwrap(), Some("abc.def".to_owned()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn cache_invalidation_drops_profile() {
        let mut cache = UserCache::new();
        cache.store(UserProfile {
            id: "u1".to_owned(),
            email: "teacher@school.test".to_owned(),
            first_name: "Mira".to_owned(),
            last_name: "Shah".to_owned(),
            role: Role::Teacher,
            phone: None,
        });
        assert!(cache.cached().is_some());
        cache.invalidate();
        assert!(cache.cached().is_none());
    }
}
