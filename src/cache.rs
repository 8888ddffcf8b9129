use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pet::{PetRecord, StoredPet};

const CACHE_DIR_NAME: &str = "petform";
const SNAPSHOT_FILE_NAME: &str = "pets.json";

/// Repository the form reads seed records from and writes confirmed updates into.
pub trait PetStore {
    fn get_by_id(&self, id: &str) -> Option<&PetRecord>;
    fn upsert(&mut self, id: &str, record: PetRecord);
}

/// In-memory pet records keyed by backend id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetCache {
    pets: BTreeMap<String, PetRecord>,
}

impl PetCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the whole cache with a freshly listed set of pets.
    pub fn replace_all(&mut self, pets: Vec<StoredPet>) {
        self.pets = pets.into_iter().map(|p| (p.id, p.record)).collect();
    }

    /// Pets in id order.
    pub fn pets(&self) -> Vec<(&str, &PetRecord)> {
        self.pets.iter().map(|(id, r)| (id.as_str(), r)).collect()
    }

    pub fn len(&self) -> usize {
        self.pets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pets.is_empty()
    }
}

impl PetStore for PetCache {
    fn get_by_id(&self, id: &str) -> Option<&PetRecord> {
        self.pets.get(id)
    }

    fn upsert(&mut self, id: &str, record: PetRecord) {
        self.pets.insert(id.to_string(), record);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheSnapshot {
    saved_at_unix_secs: u64,
    cache: PetCache,
}

#[derive(Debug, Clone)]
pub struct StartupSnapshot {
    pub cache: PetCache,
    pub age_secs: u64,
}

/// Returns the petform cache directory (`~/.cache/petform/`).
pub fn cache_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME not set")?;
    Ok(PathBuf::from(home).join(".cache").join(CACHE_DIR_NAME))
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Load a previously written snapshot from `dir`. Any read or parse failure yields `None`.
pub fn load_snapshot(dir: &Path) -> Option<StartupSnapshot> {
    let content = std::fs::read_to_string(dir.join(SNAPSHOT_FILE_NAME)).ok()?;
    let snapshot: CacheSnapshot = serde_json::from_str(&content).ok()?;
    let age_secs = now_unix_secs().saturating_sub(snapshot.saved_at_unix_secs);
    Some(StartupSnapshot {
        cache: snapshot.cache,
        age_secs,
    })
}

/// Write the cache to `dir`, creating the directory if needed.
pub fn save_snapshot(dir: &Path, cache: &PetCache) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
    let path = dir.join(SNAPSHOT_FILE_NAME);
    let snapshot = CacheSnapshot {
        saved_at_unix_secs: now_unix_secs(),
        cache: cache.clone(),
    };
    let json = serde_json::to_string(&snapshot).context("Failed to serialize pet cache")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write pet cache snapshot: {}", path.display()))?;
    tracing::debug!(path = %path.display(), pets = cache.len(), "pet cache snapshot written");
    Ok(())
}
