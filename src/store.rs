use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::core::task::Task;
use crate::core::tracker::TrackerConfig;

pub const TASKS_KEY: &str = "taskflow_todos";
pub const TRACKER_KEY: &str = "taskflow_gh_config";
pub const VIEW_STATE_KEY: &str = "taskflow_view_state";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// View preferences that survive between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Task ids whose subtasks are shown.
    #[serde(default)]
    pub expanded: BTreeSet<String>,
}

/// Keyed JSON blobs in one directory. Every save replaces the whole value.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Missing and unparsable values both read as `None`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let content = std::fs::read_to_string(self.path(key)).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding unreadable {}: {}", key, e);
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { key, source })?;

        // Write beside the target and rename so readers never see half a file.
        // Temp names are unique per save.
        let target = self.path(key);
        let io_err = |source: io::Error| StoreError::Io { key, source };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.flush().map_err(io_err)?;
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &'static str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        self.load(TASKS_KEY).unwrap_or_default()
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        self.save(TASKS_KEY, tasks)
    }

    pub fn load_tracker(&self) -> Option<TrackerConfig> {
        self.load(TRACKER_KEY)
    }

    pub fn save_tracker(&self, config: &TrackerConfig) -> Result<(), StoreError> {
        self.save(TRACKER_KEY, config)
    }

    pub fn clear_tracker(&self) -> Result<(), StoreError> {
        self.remove(TRACKER_KEY)
    }

    pub fn load_view_state(&self) -> ViewState {
        self.load(VIEW_STATE_KEY).unwrap_or_default()
    }

    pub fn save_view_state(&self, state: &ViewState) -> Result<(), StoreError> {
        self.save(VIEW_STATE_KEY, state)
    }
}
