//! Persistent translation history
//! Newest entries first, bounded to the most recent translations

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of history entries to keep
pub const MAX_HISTORY_SIZE: usize = 20;

const HISTORY_FILE: &str = "translation_history.json";

/// One completed online translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub original: String,
    pub translated: String,
    /// Source language code
    pub from: String,
    /// Target language code
    pub to: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Identity and time of a history entry, stamped by the runtime when the
/// translation completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStamp {
    pub id: String,
    pub timestamp: i64,
}

impl HistoryStamp {
    pub fn now() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Bounded list of history items (newest first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryItem>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(mut entries: Vec<HistoryItem>) -> Self {
        entries.truncate(MAX_HISTORY_SIZE);
        Self { entries }
    }

    /// Add a new entry at the front, evicting the oldest past the limit
    pub fn push(&mut self, item: HistoryItem) {
        self.entries.insert(0, item);
        self.entries.truncate(MAX_HISTORY_SIZE);
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.entries.first()
    }
}

/// JSON file holding the serialized history
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside the app config directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(HISTORY_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load history from disk. A missing or unreadable file yields an empty
    /// history.
    pub fn load(&self) -> History {
        let Ok(data) = fs::read_to_string(&self.path) else {
            return History::default();
        };
        match serde_json::from_str::<Vec<HistoryItem>>(&data) {
            Ok(items) => History::from_items(items),
            Err(e) => {
                tracing::warn!("ignoring corrupt history file {}: {}", self.path.display(), e);
                History::default()
            }
        }
    }

    /// Rewrite the whole file
    pub fn save(&self, history: &History) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(history)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
