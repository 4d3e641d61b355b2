//! Persistence for auction snapshots.
//!
//! Only durable state is stored (see [`AuctionSnapshot`]). The reentrancy
//! guard and the event outbox are runtime-only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sealbid_types::{AuctionError, AuctionId, Result};

use crate::engine::{AuctionEngine, AuctionSnapshot};

/// Keyed storage for auction snapshots.
pub trait AuctionStore {
    /// Insert or replace the snapshot for its auction.
    fn save(&mut self, snapshot: &AuctionSnapshot) -> Result<()>;

    /// # Errors
    /// Returns `AuctionNotFound` if nothing is stored under `id`.
    fn load(&self, id: AuctionId) -> Result<AuctionSnapshot>;

    fn contains(&self, id: AuctionId) -> bool;

    /// Snapshot `engine` and save it.
    fn save_engine(&mut self, engine: &AuctionEngine) -> Result<()> {
        self.save(&engine.snapshot())
    }

    /// Load and restore an engine.
    fn load_engine(&self, id: AuctionId) -> Result<AuctionEngine> {
        AuctionEngine::restore(self.load(id)?)
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: HashMap<AuctionId, AuctionSnapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl AuctionStore for MemoryStore {
    fn save(&mut self, snapshot: &AuctionSnapshot) -> Result<()> {
        self.snapshots
            .insert(snapshot.config.auction_id, snapshot.clone());
        Ok(())
    }

    fn load(&self, id: AuctionId) -> Result<AuctionSnapshot> {
        self.snapshots
            .get(&id)
            .cloned()
            .ok_or(AuctionError::AuctionNotFound(id))
    }

    fn contains(&self, id: AuctionId) -> bool {
        self.snapshots.contains_key(&id)
    }
}

/// One pretty-printed JSON file per auction under a directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a
/// reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: AuctionId) -> PathBuf {
        self.dir.join(format!("{}.json", id.0))
    }
}

impl AuctionStore for JsonFileStore {
    fn save(&mut self, snapshot: &AuctionSnapshot) -> Result<()> {
        let id = snapshot.config.auction_id;
        let path = self.path_for(id);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!(auction = %id, path = %path.display(), "Snapshot saved");
        Ok(())
    }

    fn load(&self, id: AuctionId) -> Result<AuctionSnapshot> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(AuctionError::AuctionNotFound(id));
        }
        let data = std::fs::read_to_string(&path)?;
        AuctionSnapshot::from_json(&data)
    }

    fn contains(&self, id: AuctionId) -> bool {
        self.path_for(id).exists()
    }
}
