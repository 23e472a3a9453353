//! Storage collaborators for the cache layer.
//!
//! The aggregator only needs the slice of the application's storage interface
//! that deals with external-data caching. [`ProductStore`] models that slice;
//! [`MemoryProductStore`] and [`FileProductStore`] are the two bundled
//! implementations.

use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::types::{CacheEntry, SourceRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Logical source descriptor under which aggregated results are cached.
pub const EXTERNAL_APIS_SOURCE: &str = "External APIs";

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Look up the cached aggregation for `query`, expired or not.
    async fn get_cached_external_data(&self, query: &str)
        -> Result<Option<CacheEntry>, StoreError>;

    async fn get_product_source_by_name(&self, name: &str)
        -> Result<Option<SourceRef>, StoreError>;

    /// Store a serialized batch under `query`. The store stamps the creation
    /// time; an existing entry for the same query is replaced.
    async fn cache_external_data(
        &self,
        query: &str,
        source_id: Option<i64>,
        payload: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    sources: Vec<SourceRef>,
    #[serde(default)]
    entries: HashMap<String, CacheEntry>,
}

impl StoreState {
    fn seeded() -> Self {
        Self {
            sources: vec![SourceRef {
                id: 1,
                name: EXTERNAL_APIS_SOURCE.to_string(),
            }],
            entries: HashMap::new(),
        }
    }

    fn source_by_name(&self, name: &str) -> Option<SourceRef> {
        self.sources.iter().find(|s| s.name == name).cloned()
    }

    fn upsert(
        &mut self,
        query: &str,
        source_id: Option<i64>,
        payload: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) {
        self.entries.insert(
            query.to_string(),
            CacheEntry {
                query: query.to_string(),
                source_id,
                payload,
                created_at,
                expires_at,
            },
        );
    }
}

/// A simple in-memory store, mainly for testing.
pub struct MemoryProductStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::seeded()),
            clock,
        }
    }

    /// Insert an entry verbatim, bypassing the clock.
    pub fn insert_entry(&self, entry: CacheEntry) -> Result<(), StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .entries
            .insert(entry.query.clone(), entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn get_cached_external_data(
        &self,
        query: &str,
    ) -> Result<Option<CacheEntry>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        Ok(state.entries.get(query).cloned())
    }

    async fn get_product_source_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SourceRef>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {}", e)))?;
        Ok(state.source_by_name(name))
    }

    async fn cache_external_data(
        &self,
        query: &str,
        source_id: Option<i64>,
        payload: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let created_at = self.clock.now();
        self.state
            .lock()
            .map_err(|e| StoreError::Persist(format!("lock poisoned: {}", e)))?
            .upsert(query, source_id, payload, created_at, expires_at);
        Ok(())
    }
}

/// A file-backed JSON store, by default at `<data_dir>/chemfind/cache.json`.
pub struct FileProductStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileProductStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clock: Arc::new(SystemClock),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn read_state(&self) -> Result<StoreState, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => {
                let mut state: StoreState = serde_json::from_str(&s)?;
                if state.source_by_name(EXTERNAL_APIS_SOURCE).is_none() {
                    state.sources.extend(StoreState::seeded().sources);
                }
                Ok(state)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreState::seeded()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    /// Current state for a write. Unreadable contents are discarded so one
    /// bad write cannot disable the cache.
    async fn read_state_for_write(&self) -> Result<StoreState, StoreError> {
        match self.read_state().await {
            Err(StoreError::Serialize(e)) => {
                warn!(
                    target: "chemfind.cache",
                    path = %self.path.display(),
                    error = %e,
                    "cache file unreadable, starting fresh"
                );
                Ok(StoreState::seeded())
            }
            other => other,
        }
    }

    /// Replace the file atomically: write a sibling temp file, then rename.
    async fn write_state(&self, state: &StoreState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Persist(e.to_string()))?;
        }
        let s = serde_json::to_string_pretty(state)?;
        let tmp = temp_path(&self.path);
        tokio::fs::write(&tmp, s)
            .await
            .map_err(|e| StoreError::Persist(e.to_string()))?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Persist(e.to_string()));
        }
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cache.json".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

#[async_trait]
impl ProductStore for FileProductStore {
    async fn get_cached_external_data(
        &self,
        query: &str,
    ) -> Result<Option<CacheEntry>, StoreError> {
        Ok(self.read_state().await?.entries.remove(query))
    }

    async fn get_product_source_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SourceRef>, StoreError> {
        Ok(self.read_state().await?.source_by_name(name))
    }

    async fn cache_external_data(
        &self,
        query: &str,
        source_id: Option<i64>,
        payload: String,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut state = self.read_state_for_write().await?;
        state.upsert(query, source_id, payload, self.clock.now(), expires_at);
        self.write_state(&state).await
    }
}

pub fn default_cache_path() -> PathBuf {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("chemfind").join("cache.json")
}
