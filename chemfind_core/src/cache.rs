//! Time-bounded result cache on top of a [`ProductStore`].
//!
//! Validity is decided at read time from the entry's creation timestamp;
//! nothing is ever evicted here. All store failures are logged and treated as
//! a miss (reads) or a no-op (writes).

use crate::clock::Clock;
use crate::store::{ProductStore, EXTERNAL_APIS_SOURCE};
use crate::types::CandidateRecord;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default time-to-live for cached aggregations.
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

pub struct ResultCache {
    store: Arc<dyn ProductStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn ProductStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Return the cached records for `query`, or `None` on a miss.
    pub async fn get(&self, query: &str) -> Option<Vec<CandidateRecord>> {
        let entry = match self.store.get_cached_external_data(query).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(target: "chemfind.cache", %query, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(target: "chemfind.cache", %query, error = %e, "cache read failed");
                return None;
            }
        };

        let age = self.clock.now() - entry.created_at;
        if age >= self.ttl {
            debug!(
                target: "chemfind.cache",
                %query,
                age_minutes = age.num_minutes(),
                "cache entry expired"
            );
            return None;
        }

        match serde_json::from_str::<Vec<CandidateRecord>>(&entry.payload) {
            Ok(records) => {
                debug!(target: "chemfind.cache", %query, count = records.len(), "cache hit");
                Some(records)
            }
            Err(e) => {
                warn!(target: "chemfind.cache", %query, error = %e, "cached payload unreadable");
                None
            }
        }
    }

    /// Store `records` under `query`. Best-effort.
    pub async fn put(&self, query: &str, records: &[CandidateRecord]) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(target: "chemfind.cache", %query, error = %e, "failed to serialize records");
                return;
            }
        };

        let source_id = match self.store.get_product_source_by_name(EXTERNAL_APIS_SOURCE).await {
            Ok(source) => source.map(|s| s.id),
            Err(e) => {
                warn!(target: "chemfind.cache", %query, error = %e, "source lookup failed");
                None
            }
        };

        let expires_at = self.clock.now() + self.ttl;
        match self
            .store
            .cache_external_data(query, source_id, payload, expires_at)
            .await
        {
            Ok(()) => {
                debug!(target: "chemfind.cache", %query, count = records.len(), "cached results")
            }
            Err(e) => warn!(target: "chemfind.cache", %query, error = %e, "cache write failed"),
        }
    }
}
