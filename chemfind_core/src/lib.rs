// src/lib.rs
pub mod aggregator;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod sources;
pub mod store;
pub mod types;

use crate::error::SourceError;
use async_trait::async_trait;
use tracing::{debug, warn};

pub use crate::aggregator::{AggregateReport, ExternalProductService, SourceFailure};
pub use crate::types::{
    CacheEntry, CandidateRecord, NumericRange, OriginalProduct, ReplacementCriteria, SourceInfo,
    SourceRef,
};

/// One external chemical database.
///
/// Implementations return errors through `Result`; callers that need the
/// "never fails" adapter contract use [`search_or_empty`](Self::search_or_empty)
/// and [`details_or_none`](Self::details_or_none), which log and discard them.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Returns the source tag stamped on every record (e.g., "pubchem").
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Confidence assigned to every record this source produces.
    fn baseline_confidence(&self) -> f64;

    /// Whether the source has what it needs (credentials, endpoints) to make
    /// network calls. Unconfigured sources answer every search with no results.
    fn is_configured(&self) -> bool {
        true
    }

    async fn search(&self, query: &str) -> Result<Vec<CandidateRecord>, SourceError>;

    /// Fetch full detail for a record previously produced by this source.
    async fn get_details(&self, source_id: &str) -> Result<Option<CandidateRecord>, SourceError>;

    async fn search_or_empty(&self, query: &str) -> Vec<CandidateRecord> {
        match self.search(query).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    target: "chemfind.source",
                    source = self.name(),
                    %query,
                    code = e.code_str(),
                    error = %e,
                    "source search failed"
                );
                Vec::new()
            }
        }
    }

    async fn details_or_none(&self, source_id: &str) -> Option<CandidateRecord> {
        match self.get_details(source_id).await {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                debug!(target: "chemfind.source", source = self.name(), %source_id, "record not found");
                None
            }
            Err(e) => {
                warn!(
                    target: "chemfind.source",
                    source = self.name(),
                    %source_id,
                    code = e.code_str(),
                    error = %e,
                    "detail fetch failed"
                );
                None
            }
        }
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name().to_string(),
            description: self.description().to_string(),
            baseline_confidence: self.baseline_confidence(),
            configured: self.is_configured(),
        }
    }
}
