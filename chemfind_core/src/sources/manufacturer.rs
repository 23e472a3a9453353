use crate::error::SourceError;
use crate::types::CandidateRecord;
use crate::ProductSource;
use async_trait::async_trait;
use tracing::debug;

/// Placeholder for manufacturer product catalogs.
///
/// Catalog integrations need per-manufacturer credentials and rate limits that
/// have not been defined yet, so this source reports itself as unconfigured and
/// never makes network calls.
#[derive(Debug, Default, Clone)]
pub struct ManufacturerCatalogSource;

impl ManufacturerCatalogSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProductSource for ManufacturerCatalogSource {
    fn name(&self) -> &'static str {
        "manufacturer"
    }

    fn description(&self) -> &'static str {
        "Manufacturer product catalogs (not yet available)"
    }

    fn baseline_confidence(&self) -> f64 {
        0.9
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn search(&self, query: &str) -> Result<Vec<CandidateRecord>, SourceError> {
        debug!(target: "chemfind.source.manufacturer", %query, "no catalogs configured");
        Ok(Vec::new())
    }

    async fn get_details(&self, _source_id: &str) -> Result<Option<CandidateRecord>, SourceError> {
        Ok(None)
    }
}
