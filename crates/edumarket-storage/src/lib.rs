//! Session state container for EduMarket: favorites, view history, and the
//! selected-course pointer, with JSON persistence to the session directory.
//!
//! All mutable view state lives here and changes only through the defined
//! mutation entry points; presentation code never edits the lists directly.
//! Persistence is two plain JSON arrays with no versioning, so loads fail
//! soft to empty on anything unreadable.

use std::path::{Path, PathBuf};

use anyhow::Context;
use edumarket_core::{Course, VIEW_HISTORY_LIMIT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

pub const CRATE_NAME: &str = "edumarket-storage";

const FAVORITES_FILE: &str = "favorites.json";
const VIEW_HISTORY_FILE: &str = "view_history.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session state io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session state encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Holds the per-session mutable state and owns its persistence.
///
/// Favorites keep insertion order; the view history is newest-first,
/// deduplicated by course id, and capped at [`VIEW_HISTORY_LIMIT`].
#[derive(Debug)]
pub struct SessionStore {
    root: PathBuf,
    favorites: Vec<String>,
    history: Vec<Course>,
    selected: Option<Course>,
}

impl SessionStore {
    /// Loads session state from `root`, creating the directory if needed.
    /// Missing or malformed files load as empty and are never surfaced to
    /// the user.
    pub async fn load(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("creating session directory {}", root.display()))?;

        let favorites = read_json_or_default(&root.join(FAVORITES_FILE)).await;
        let history: Vec<Course> = read_json_or_default(&root.join(VIEW_HISTORY_FILE)).await;

        Ok(Self {
            root,
            favorites,
            history,
            selected: None,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn history(&self) -> &[Course] {
        &self.history
    }

    pub fn is_favorite(&self, course_id: &str) -> bool {
        self.favorites.iter().any(|id| id == course_id)
    }

    /// The favorited subset of `catalog`, in catalog order.
    pub fn favorite_courses(&self, catalog: &[Course]) -> Vec<Course> {
        catalog
            .iter()
            .filter(|course| self.is_favorite(&course.id))
            .cloned()
            .collect()
    }

    pub fn selected(&self) -> Option<&Course> {
        self.selected.as_ref()
    }

    pub fn select_course(&mut self, course: Course) {
        self.selected = Some(course);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Adds or removes `course_id` from favorites and persists the list.
    /// Returns whether the course is a favorite afterwards. Toggling twice
    /// restores the original state.
    pub async fn toggle_favorite(&mut self, course_id: &str) -> Result<bool, StoreError> {
        let now_favorite = if self.is_favorite(course_id) {
            self.favorites.retain(|id| id != course_id);
            false
        } else {
            self.favorites.push(course_id.to_string());
            true
        };
        write_json_atomic(&self.root.join(FAVORITES_FILE), &self.favorites).await?;
        Ok(now_favorite)
    }

    /// Front-inserts `course` into the view history, removing any earlier
    /// entry with the same id, then truncates to the cap and persists.
    pub async fn record_view(&mut self, course: &Course) -> Result<(), StoreError> {
        self.history.retain(|seen| seen.id != course.id);
        self.history.insert(0, course.clone());
        self.history.truncate(VIEW_HISTORY_LIMIT);
        write_json_atomic(&self.root.join(VIEW_HISTORY_FILE), &self.history).await
    }
}

async fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(_) => return T::default(),
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), %err, "discarding unreadable session state");
            T::default()
        }
    }
}

/// Serializes `value` and writes it via a unique temp file renamed into
/// place, so a crash mid-write never leaves a truncated document behind.
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let temp_path = parent.join(format!(".{}.tmp", Uuid::new_v4()));

    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&temp_path)
        .await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    match fs::rename(&temp_path, path).await {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&temp_path).await;
            Err(err.into())
        }
    }
}
