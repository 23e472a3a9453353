//! Multi-source aggregation.
//!
//! This module provides:
//! - `ExternalProductService`: cached fan-out search and replacement search
//! - `dedupe`: first-wins collapsing of records for the same substance
//! - `scoring`: confidence adjustment against replacement criteria
//! - `AggregateReport`: per-source bookkeeping for one search
//!
//! # Example
//!
//! ```ignore
//! use chemfind_core::{config::ChemfindConfig, ExternalProductService};
//!
//! let service = ExternalProductService::from_config(&ChemfindConfig::load(None)?)?;
//! let results = service.search_external_products("acetone", 10).await;
//! ```

pub mod dedupe;
mod engine;
mod report;
pub mod scoring;

pub use dedupe::{dedupe, dedupe_key};
pub use engine::{replacement_queries, ExternalProductService, REPLACEMENT_QUERY_LIMIT};
pub use report::{AggregateReport, SourceFailure};
pub use scoring::score;
