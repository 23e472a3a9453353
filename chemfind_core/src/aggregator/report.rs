use crate::types::CandidateRecord;
use serde::{Deserialize, Serialize};

/// A source that failed during an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    /// Short classifier, see [`SourceError::code_str`](crate::error::SourceError::code_str)
    pub code: String,
    pub error: String,
}

/// Outcome of one aggregated search, with per-source bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub query: String,

    /// Deduplicated records, best first, truncated to the requested limit
    pub records: Vec<CandidateRecord>,

    /// True when the records were served from the cache and no source was
    /// contacted
    pub from_cache: bool,

    /// Sources that answered (possibly with zero records)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<String>,

    /// Sources not contacted because they lack credentials or endpoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,

    /// Records gathered before deduplication and truncation
    #[serde(default)]
    pub gathered: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl AggregateReport {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            records: Vec::new(),
            from_cache: false,
            completed: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
            gathered: 0,
            duration_ms: None,
        }
    }

    pub fn add_failure(
        &mut self,
        source: impl Into<String>,
        code: impl Into<String>,
        error: impl Into<String>,
    ) {
        self.failures.push(SourceFailure {
            source: source.into(),
            code: code.into(),
            error: error.into(),
        });
    }

    /// Some sources failed but the search still produced an answer.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Every contacted source failed.
    pub fn all_failed(&self) -> bool {
        self.completed.is_empty() && !self.failures.is_empty()
    }
}
