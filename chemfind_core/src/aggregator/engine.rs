//! Aggregation engine.
//!
//! Fans a query out to every source adapter, merges what comes back and keeps
//! the result in the cache layer.

use super::dedupe::dedupe;
use super::scoring::score;
use super::AggregateReport;
use crate::cache::ResultCache;
use crate::clock::{Clock, SystemClock};
use crate::config::ChemfindConfig;
use crate::error::SourceError;
use crate::sources::build_sources;
use crate::store::{FileProductStore, ProductStore};
use crate::types::{CandidateRecord, OriginalProduct, ReplacementCriteria, SourceInfo};
use crate::ProductSource;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Results taken from each derived query during replacement search.
pub const REPLACEMENT_QUERY_LIMIT: usize = 10;

/// Entry point for external product lookups.
///
/// Holds its collaborators explicitly; construct one per application and share
/// it by reference (or `Arc`) with request handlers.
pub struct ExternalProductService {
    sources: Vec<Arc<dyn ProductSource>>,
    cache: ResultCache,
}

enum SourceOutcome {
    Completed(Vec<CandidateRecord>),
    Skipped,
    Failed { code: String, error: String },
}

impl ExternalProductService {
    pub fn new(
        sources: Vec<Arc<dyn ProductSource>>,
        store: Arc<dyn ProductStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sources,
            cache: ResultCache::new(store, clock),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.cache = self.cache.with_ttl(ttl);
        self
    }

    /// Build the configured adapters on top of the file-backed store.
    pub fn from_config(config: &ChemfindConfig) -> Result<Self, SourceError> {
        let store = Arc::new(FileProductStore::new(config.cache_path()));
        Ok(Self::new(build_sources(config)?, store, Arc::new(SystemClock))
            .with_cache_ttl(chrono::Duration::hours(config.cache.ttl_hours)))
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        self.sources.iter().map(|s| s.info()).collect()
    }

    /// Search every source for `query` and return up to `limit` records, best
    /// first. Never fails: sources that error contribute nothing.
    pub async fn search_external_products(&self, query: &str, limit: usize) -> Vec<CandidateRecord> {
        self.search_with_report(query, limit).await.records
    }

    /// Like [`search_external_products`](Self::search_external_products), also
    /// reporting which sources answered and whether the cache was used.
    pub async fn search_with_report(&self, query: &str, limit: usize) -> AggregateReport {
        let start = Instant::now();
        let mut report = AggregateReport::new(query);

        if query.trim().is_empty() {
            debug!(target: "chemfind.aggregator", "blank query, nothing to search");
            return report;
        }

        if let Some(cached) = self.cache.get(query).await {
            report.gathered = cached.len();
            report.records = cached.into_iter().take(limit).collect();
            report.from_cache = true;
            report.duration_ms = Some(start.elapsed().as_millis() as u64);
            debug!(target: "chemfind.aggregator", %query, count = report.records.len(), "served from cache");
            return report;
        }

        let mut gathered = Vec::new();
        for (source, outcome) in self.fan_out(query).await {
            match outcome {
                SourceOutcome::Completed(records) => {
                    report.completed.push(source.to_string());
                    gathered.extend(records);
                }
                SourceOutcome::Skipped => report.skipped.push(source.to_string()),
                SourceOutcome::Failed { code, error } => report.add_failure(source, code, error),
            }
        }
        report.gathered = gathered.len();

        let mut records = dedupe(gathered);
        sort_by_confidence(&mut records);
        records.truncate(limit);

        self.cache.put(query, &records).await;

        info!(
            target: "chemfind.aggregator",
            %query,
            count = records.len(),
            completed = report.completed.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            elapsed_ms = %start.elapsed().as_millis(),
            "aggregated search complete"
        );

        report.records = records;
        report.duration_ms = Some(start.elapsed().as_millis() as u64);
        report
    }

    /// Query every configured source concurrently and wait for all of them. A
    /// failing or panicking source does not affect the others.
    async fn fan_out(&self, query: &str) -> Vec<(&'static str, SourceOutcome)> {
        let calls = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            async move {
                let name = source.name();
                if !source.is_configured() {
                    debug!(target: "chemfind.aggregator", source = name, "source not configured, skipped");
                    return (name, SourceOutcome::Skipped);
                }
                let t0 = Instant::now();
                let outcome = match AssertUnwindSafe(source.search(query)).catch_unwind().await {
                    Ok(Ok(records)) => {
                        debug!(
                            target: "chemfind.aggregator",
                            source = name,
                            count = records.len(),
                            elapsed_ms = %t0.elapsed().as_millis(),
                            "source answered"
                        );
                        SourceOutcome::Completed(records)
                    }
                    Ok(Err(e)) => {
                        warn!(
                            target: "chemfind.aggregator",
                            source = name,
                            %query,
                            code = e.code_str(),
                            error = %e,
                            "source failed, continuing without it"
                        );
                        SourceOutcome::Failed {
                            code: e.code_str().to_string(),
                            error: e.to_string(),
                        }
                    }
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        error!(
                            target: "chemfind.aggregator",
                            source = name,
                            %query,
                            %reason,
                            "source panicked during search"
                        );
                        SourceOutcome::Failed {
                            code: "internal_error".to_string(),
                            error: format!("source panicked: {}", reason),
                        }
                    }
                };
                (name, outcome)
            }
        });

        futures::future::join_all(calls).await
    }

    /// Suggest substitutes for `original`, ranked against `criteria`.
    ///
    /// Each derived query runs through the full cached search, one after
    /// another; the merged results are scored, sorted and truncated.
    pub async fn find_replacements(
        &self,
        original: &OriginalProduct,
        criteria: &ReplacementCriteria,
        max_results: usize,
    ) -> Vec<CandidateRecord> {
        let queries = replacement_queries(original, criteria);
        if queries.is_empty() {
            warn!(
                target: "chemfind.aggregator",
                product = %original.name,
                "no searchable fields for replacement search"
            );
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for query in &queries {
            candidates.extend(
                self.search_external_products(query, REPLACEMENT_QUERY_LIMIT)
                    .await,
            );
        }

        let mut scored: Vec<CandidateRecord> =
            candidates.iter().map(|c| score(c, criteria)).collect();
        sort_by_confidence(&mut scored);
        scored.truncate(max_results);

        info!(
            target: "chemfind.aggregator",
            product = %original.name,
            queries = queries.len(),
            gathered = candidates.len(),
            returned = scored.len(),
            "replacement search complete"
        );
        scored
    }

    /// Fetch full detail for a record from the source that produced it.
    /// Unknown sources and failed lookups both yield `None`.
    pub async fn get_product_details(&self, source_id: &str, source: &str) -> Option<CandidateRecord> {
        let Some(adapter) = self
            .sources
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(source))
        else {
            debug!(target: "chemfind.aggregator", %source, "unknown source for detail lookup");
            return None;
        };
        adapter.details_or_none(source_id).await
    }
}

/// Search strings derived from the product and criteria, skipping blanks.
pub fn replacement_queries(original: &OriginalProduct, criteria: &ReplacementCriteria) -> Vec<String> {
    [
        original.chemical_name.as_deref(),
        original.cas_number.as_deref(),
        original.category.as_deref(),
        criteria.chemical_class.as_deref(),
    ]
    .into_iter()
    .flatten()
    .chain(criteria.functional_groups.iter().map(String::as_str))
    .map(str::trim)
    .filter(|q| !q.is_empty())
    .map(str::to_string)
    .collect()
}

/// Stable sort, highest confidence first.
fn sort_by_confidence(records: &mut [CandidateRecord]) {
    records.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_queries_order_and_blanks() {
        let original = OriginalProduct {
            name: "Acme Degreaser".into(),
            chemical_name: Some("Toluene".into()),
            cas_number: Some("108-88-3".into()),
            category: Some("  ".into()),
        };
        let criteria = ReplacementCriteria {
            chemical_class: Some("ester".into()),
            functional_groups: vec!["hydroxyl".into(), "".into(), "carbonyl".into()],
            ..ReplacementCriteria::default()
        };
        assert_eq!(
            replacement_queries(&original, &criteria),
            vec!["Toluene", "108-88-3", "ester", "hydroxyl", "carbonyl"]
        );
    }

    #[test]
    fn test_replacement_queries_empty() {
        let original = OriginalProduct::new("Mystery Product");
        assert!(replacement_queries(&original, &ReplacementCriteria::default()).is_empty());
    }

    #[test]
    fn test_sort_is_stable_descending() {
        let mut records = vec![
            CandidateRecord::new("a", "pubchem", "1", 0.8),
            CandidateRecord::new("b", "chemspider", "2", 0.85),
            CandidateRecord::new("c", "pubchem", "3", 0.8),
        ];
        sort_by_confidence(&mut records);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
