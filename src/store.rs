//! Portfolio persistence: the saved-item list and satoshi goal as one JSON
//! document, rewritten atomically on every mutation.

use crate::domain::{Sats, SavedItem};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Default satoshi goal for a fresh portfolio.
const DEFAULT_SATOSHI_GOAL: u64 = 1_000_000;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("portfolio document at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("item not found: {0}")]
    ItemNotFound(Uuid),
}

/// The on-disk document: every saved item plus the goal, serialized wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioDocument {
    items: Vec<SavedItem>,
    #[serde(default = "default_goal")]
    satoshi_goal: Sats,
}

fn default_goal() -> Sats {
    Sats::new(DEFAULT_SATOSHI_GOAL)
}

impl Default for PortfolioDocument {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            satoshi_goal: default_goal(),
        }
    }
}

/// File-backed portfolio store.
///
/// All mutations rewrite the whole document through a temp file and rename,
/// so a crash mid-write never leaves a half-written portfolio behind. Each
/// mutation persists a modified copy and commits it to memory only once the
/// rewrite succeeds, so a failed write leaves the in-memory document matching
/// the file. The document is held behind an async mutex; there are no
/// concurrent writers beyond the API handlers sharing this store.
#[derive(Debug)]
pub struct PortfolioStore {
    path: PathBuf,
    state: Mutex<PortfolioDocument>,
}

impl PortfolioStore {
    /// Open the store at `path`, loading the existing document if present.
    ///
    /// A missing file yields an empty portfolio. A file that exists but does
    /// not parse is an error; it is never overwritten with a fresh document.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No portfolio document at {}, starting empty", path.display());
                PortfolioDocument::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            state: Mutex::new(document),
        })
    }

    async fn persist(&self, document: &PortfolioDocument) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document).expect("document always serializes");
        let tmp_path = tmp_path_for(&self.path);
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        debug!(
            "Persisted portfolio document with {} items",
            document.items.len()
        );
        Ok(())
    }

    /// All saved items, in insertion order.
    pub async fn list_items(&self) -> Vec<SavedItem> {
        self.state.lock().await.items.clone()
    }

    /// Look up one item by id.
    pub async fn get_item(&self, id: Uuid) -> Result<SavedItem, StoreError> {
        self.state
            .lock()
            .await
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(StoreError::ItemNotFound(id))
    }

    /// Append a new item and persist.
    pub async fn insert_item(&self, item: SavedItem) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.items.push(item);
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    /// Replace the item with the same id and persist.
    pub async fn replace_item(&self, item: SavedItem) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let slot = next
            .items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or(StoreError::ItemNotFound(item.id))?;
        *slot = item;
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    /// Remove an item by id and persist, returning the removed item.
    pub async fn remove_item(&self, id: Uuid) -> Result<SavedItem, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let index = next
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StoreError::ItemNotFound(id))?;
        let removed = next.items.remove(index);
        self.persist(&next).await?;
        *state = next;
        Ok(removed)
    }

    /// Remove every item and persist, returning how many were cleared.
    pub async fn clear_items(&self) -> Result<usize, StoreError> {
        let mut state = self.state.lock().await;
        let cleared = state.items.len();
        if cleared > 0 {
            let mut next = state.clone();
            next.items.clear();
            self.persist(&next).await?;
            *state = next;
        }
        Ok(cleared)
    }

    /// The satoshi goal.
    pub async fn goal(&self) -> Sats {
        self.state.lock().await.satoshi_goal
    }

    /// Update the satoshi goal and persist.
    pub async fn set_goal(&self, goal: Sats) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.satoshi_goal = goal;
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "portfolio.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
