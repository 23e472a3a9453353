//! Source adapters, one per external chemical database.

pub mod chemspider;
pub mod manufacturer;
pub mod pubchem;

#[cfg(test)]
pub(crate) mod stub_server;

use crate::config::{ChemfindConfig, HttpConfig};
use crate::error::SourceError;
use crate::ProductSource;
use std::sync::Arc;
use std::time::Duration;

pub use chemspider::ChemSpiderSource;
pub use manufacturer::ManufacturerCatalogSource;
pub use pubchem::PubChemSource;

/// Build the HTTP client shared by an adapter. The request timeout configured
/// here is the only bound on how long a single adapter call may take.
pub fn build_http_client(http: &HttpConfig) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .timeout(Duration::from_secs(http.timeout_secs))
        .pool_max_idle_per_host(2)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .user_agent(http.user_agent.clone())
        .build()
        .map_err(|e| SourceError::Other(format!("failed to build http client: {}", e)))
}

/// Build every adapter enabled in `config`, in fan-out order.
pub fn build_sources(config: &ChemfindConfig) -> Result<Vec<Arc<dyn ProductSource>>, SourceError> {
    let mut sources: Vec<Arc<dyn ProductSource>> = Vec::new();

    if config.pubchem.enabled {
        sources.push(Arc::new(PubChemSource::new(&config.http, &config.pubchem)?));
    }

    if config.chemspider.enabled {
        sources.push(Arc::new(ChemSpiderSource::new(
            &config.http,
            &config.chemspider,
        )?));
    }

    sources.push(Arc::new(ManufacturerCatalogSource::new()));

    Ok(sources)
}

/// Trim a configured base URL so paths can be appended with `/`.
pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sources_respects_enabled() {
        let mut config = ChemfindConfig::default();
        let names: Vec<_> = build_sources(&config)
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["pubchem", "chemspider", "manufacturer"]);

        config.chemspider.enabled = false;
        let names: Vec<_> = build_sources(&config)
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["pubchem", "manufacturer"]);
    }

    #[test]
    fn test_trim_base() {
        assert_eq!(trim_base("https://example.org/api/"), "https://example.org/api");
        assert_eq!(trim_base("https://example.org/api"), "https://example.org/api");
    }
}
