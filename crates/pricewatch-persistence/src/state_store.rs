//! Scheduling state snapshot file.

use crate::error::{PersistenceError, PersistenceResult};
use pricewatch_scheduler::ScheduleState;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON file holding the last committed `ScheduleState`.
///
/// Writes go to a sibling temp file that is renamed over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state.
    ///
    /// A missing file yields `None`. So does an unreadable or corrupt one,
    /// after a warning: the daemon starts fresh rather than refusing to run.
    pub fn load(&self) -> Option<ScheduleState> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved schedule state");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read schedule state");
                return None;
            }
        };

        match serde_json::from_str::<ScheduleState>(&contents) {
            Ok(state) => {
                info!(
                    path = %self.path.display(),
                    civil_date = ?state.current_civil_date,
                    "Restored schedule state"
                );
                Some(state)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt schedule state, starting fresh");
                None
            }
        }
    }

    /// Atomically replace the saved state.
    pub fn save(&self, state: &ScheduleState) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(PersistenceError::io(parent))?;
            }
        }

        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.tmp_path();
        fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .map_err(PersistenceError::io(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(PersistenceError::io(&self.path))?;

        debug!(path = %self.path.display(), bytes = json.len(), "Saved schedule state");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested/state.json"));

        let mut state = ScheduleState::new();
        state.roll_over(NaiveDate::from_ymd_opt(2025, 2, 11).unwrap());
        state.day_flags.session_open_notified = true;
        state.last_routine_update_at = Some(Utc::now());

        store.save(&state).unwrap();
        assert_eq!(store.load(), Some(state.clone()));

        // overwrite
        state.day_flags.session_close_notified = true;
        store.save(&state).unwrap();
        assert_eq!(store.load(), Some(state));
        assert!(!dir.path().join("nested/state.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(StateStore::new(path).load().is_none());
    }

    #[test]
    fn test_save_error_names_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let store = StateStore::new(blocker.join("state.json"));
        let err = store.save(&ScheduleState::new()).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
