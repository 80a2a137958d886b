//! Per-user baseline registry.
//!
//! Requests for the same user queue on that user's lock while other users
//! proceed. The store is opened from disk each time the lock is taken, so a
//! baseline reset by another process is seen by the next request. A user's
//! lock is dropped from the registry once nobody holds or waits on it.

use crate::baseline::store::{BaselineError, FileBaselineStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Longest accepted user identifier.
pub const MAX_USER_ID_LEN: usize = 64;

/// Lock serializing one user's read-then-update sequence.
pub type UserLock = Arc<Mutex<()>>;

/// Registry of per-user baseline files under one directory.
#[derive(Debug)]
pub struct BaselineRegistry {
    dir: PathBuf,
    locks: Mutex<HashMap<String, UserLock>>,
}

impl BaselineRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` against the user's store while holding that user's lock.
    ///
    /// Blocks the calling thread while another request for the same user is
    /// in progress, so call it from a blocking context.
    pub fn with_store<T, E, F>(&self, user_id: &str, f: F) -> Result<T, E>
    where
        E: From<BaselineError>,
        F: FnOnce(&mut FileBaselineStore) -> Result<T, E>,
    {
        let path = baseline_path(&self.dir, user_id)?;
        let lock = self.acquire(user_id)?;

        let result = {
            // The guarded value is (), so a poisoned lock carries no bad state
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            FileBaselineStore::open(path)
                .map_err(E::from)
                .and_then(|mut store| f(&mut store))
        };

        drop(lock);
        self.release(user_id);
        result
    }

    /// Number of users with a request in progress.
    pub fn active_users(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    fn acquire(&self, user_id: &str) -> Result<UserLock, BaselineError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| BaselineError::Unavailable("baseline registry poisoned".to_string()))?;
        Ok(Arc::clone(locks.entry(user_id.to_string()).or_default()))
    }

    fn release(&self, user_id: &str) {
        if let Ok(mut locks) = self.locks.lock() {
            let idle = locks
                .get(user_id)
                .is_some_and(|lock| Arc::strong_count(lock) == 1);
            if idle {
                locks.remove(user_id);
            }
        }
    }
}

/// Check that a user id is safe to use as a file name.
pub fn validate_user_id(user_id: &str) -> bool {
    !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Location of a user's baseline file under `dir`.
pub fn baseline_path(dir: &Path, user_id: &str) -> Result<PathBuf, BaselineError> {
    if !validate_user_id(user_id) {
        return Err(BaselineError::Unavailable(format!(
            "invalid user id {user_id:?}"
        )));
    }
    Ok(dir.join(format!("{user_id}.json")))
}
