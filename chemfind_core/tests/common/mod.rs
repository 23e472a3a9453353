#![allow(dead_code)]

use async_trait::async_trait;
use chemfind_core::clock::ManualClock;
use chemfind_core::error::SourceError;
use chemfind_core::store::MemoryProductStore;
use chemfind_core::{CandidateRecord, ExternalProductService, ProductSource};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub enum Behavior {
    /// Same records for every query
    Records(Vec<CandidateRecord>),
    /// Records keyed by query; unknown queries get nothing
    PerQuery(HashMap<String, Vec<CandidateRecord>>),
    Fail,
    Panic,
}

pub struct FakeSource {
    name: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
    queries: std::sync::Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            behavior,
            calls: AtomicUsize::new(0),
            queries: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductSource for FakeSource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "fake source for tests"
    }

    fn baseline_confidence(&self) -> f64 {
        0.8
    }

    async fn search(&self, query: &str) -> Result<Vec<CandidateRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        match &self.behavior {
            Behavior::Records(records) => Ok(records.clone()),
            Behavior::PerQuery(map) => Ok(map.get(query).cloned().unwrap_or_default()),
            Behavior::Fail => Err(SourceError::Other("upstream exploded".into())),
            Behavior::Panic => panic!("adapter bug"),
        }
    }

    async fn get_details(&self, source_id: &str) -> Result<Option<CandidateRecord>, SourceError> {
        match &self.behavior {
            Behavior::Records(records) => Ok(records.iter().find(|r| r.source_id == source_id).cloned()),
            Behavior::Fail => Err(SourceError::Other("upstream exploded".into())),
            _ => Ok(None),
        }
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
}

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryProductStore>,
    pub service: ExternalProductService,
}

pub fn harness(sources: Vec<Arc<dyn ProductSource>>) -> Harness {
    let clock = Arc::new(ManualClock::new(start()));
    let store = Arc::new(MemoryProductStore::with_clock(clock.clone()));
    let service = ExternalProductService::new(sources, store.clone(), clock.clone());
    Harness {
        clock,
        store,
        service,
    }
}

pub fn acetone() -> CandidateRecord {
    CandidateRecord::new("Acetone", "pubchem", "180", 0.8)
        .with_chemical_name("propan-2-one")
        .with_formula("C3H6O")
        .with_molecular_weight(58.08)
}
