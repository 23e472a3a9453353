use crate::config::{HttpConfig, PubChemConfig};
use crate::error::SourceError;
use crate::sources::{build_http_client, trim_base};
use crate::types::CandidateRecord;
use crate::ProductSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{debug, info};

mod parse;
use parse::{extract_cas, parse_property_table, parse_synonyms, to_candidate, PROPERTY_LIST};

/// PubChem carries formula and weight but little product metadata.
pub const PUBCHEM_CONFIDENCE: f64 = 0.8;

/// PubChem PUG REST adapter. Keyless.
#[derive(Clone)]
pub struct PubChemSource {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl PubChemSource {
    pub fn new(http: &HttpConfig, config: &PubChemConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_http_client(http)?,
            base_url: trim_base(&config.base_url),
            max_results: config.max_results,
        })
    }

    fn name_url(&self, query: &str) -> String {
        format!(
            "{}/compound/name/{}/property/{}/JSON",
            self.base_url,
            urlencoding::encode(query),
            PROPERTY_LIST
        )
    }

    fn cid_url(&self, cid: u64) -> String {
        format!(
            "{}/compound/cid/{}/property/{}/JSON",
            self.base_url, cid, PROPERTY_LIST
        )
    }

    fn synonyms_url(&self, cid: u64) -> String {
        format!("{}/compound/cid/{}/synonyms/JSON", self.base_url, cid)
    }

    /// GET `url`, mapping 404 to `None`.
    async fn fetch(&self, url: &str) -> Result<Option<String>, SourceError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(target: "chemfind.source.pubchem", %url, "no compound for request");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                source_name: "pubchem",
                status,
            });
        }

        let body = response.text().await?;
        debug!(
            target: "chemfind.source.pubchem",
            %url,
            bytes = body.len(),
            total_ms = %t0.elapsed().as_millis(),
            "fetched pubchem response"
        );
        Ok(Some(body))
    }
}

#[async_trait]
impl ProductSource for PubChemSource {
    fn name(&self) -> &'static str {
        "pubchem"
    }

    fn description(&self) -> &'static str {
        "PubChem compound database (NCBI PUG REST)"
    }

    fn baseline_confidence(&self) -> f64 {
        PUBCHEM_CONFIDENCE
    }

    async fn search(&self, query: &str) -> Result<Vec<CandidateRecord>, SourceError> {
        let Some(body) = self.fetch(&self.name_url(query)).await? else {
            return Ok(Vec::new());
        };

        let records: Vec<CandidateRecord> = parse_property_table(&body)?
            .iter()
            .take(self.max_results)
            .map(|props| to_candidate(props, query, self.name(), PUBCHEM_CONFIDENCE))
            .collect();

        info!(target: "chemfind.source.pubchem", %query, count = records.len(), "pubchem search complete");
        Ok(records)
    }

    async fn get_details(&self, source_id: &str) -> Result<Option<CandidateRecord>, SourceError> {
        let cid: u64 = source_id
            .trim()
            .parse()
            .map_err(|_| SourceError::InvalidInput(format!("not a PubChem CID: {}", source_id)))?;

        let Some(body) = self.fetch(&self.cid_url(cid)).await? else {
            return Ok(None);
        };
        let Some(props) = parse_property_table(&body)?.into_iter().next() else {
            return Ok(None);
        };

        // Synonyms enrich the record but are not required for it.
        let synonyms = match self.fetch(&self.synonyms_url(cid)).await {
            Ok(Some(body)) => parse_synonyms(&body).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(target: "chemfind.source.pubchem", cid, error = %e, "synonym lookup failed");
                Vec::new()
            }
        };

        let fallback = synonyms
            .first()
            .cloned()
            .unwrap_or_else(|| format!("CID {}", cid));
        let mut record = to_candidate(&props, &fallback, self.name(), PUBCHEM_CONFIDENCE);
        if let Some(cas) = extract_cas(&synonyms) {
            record = record.with_cas_number(cas);
        }
        if !synonyms.is_empty() {
            record = record.with_synonyms(synonyms);
        }

        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::stub_server::StubServer;

    fn source(base: &str) -> PubChemSource {
        let config = PubChemConfig {
            base_url: base.to_string(),
            ..PubChemConfig::default()
        };
        PubChemSource::new(&HttpConfig::default(), &config).unwrap()
    }

    #[test]
    fn test_urls() {
        let s = source("https://pubchem.example/rest/pug/");
        assert_eq!(
            s.name_url("acetic acid"),
            format!(
                "https://pubchem.example/rest/pug/compound/name/acetic%20acid/property/{}/JSON",
                PROPERTY_LIST
            )
        );
        assert_eq!(
            s.synonyms_url(180),
            "https://pubchem.example/rest/pug/compound/cid/180/synonyms/JSON"
        );
    }

    #[tokio::test]
    async fn test_details_rejects_non_numeric_id() {
        let s = source("http://127.0.0.1:9");
        let err = s.get_details("CSID:171").await.unwrap_err();
        assert_eq!(err.code_str(), "invalid_input");
        assert!(s.details_or_none("CSID:171").await.is_none());
    }

    fn name_path(query: &str) -> String {
        format!("/compound/name/{}/property/{}/JSON", query, PROPERTY_LIST)
    }

    fn acetone_table() -> String {
        serde_json::json!({
            "PropertyTable": {
                "Properties": [{
                    "CID": 180,
                    "Title": "Acetone",
                    "IUPACName": "propan-2-one",
                    "MolecularFormula": "C3H6O",
                    "MolecularWeight": "58.08",
                    "XLogP": -0.1
                }]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_over_http() {
        let server = StubServer::start().await;
        server.route("GET", &name_path("acetone"), 200, acetone_table());

        let records = source(server.url()).search("acetone").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Acetone");
        assert_eq!(records[0].source_id, "180");
        assert_eq!(records[0].molecular_weight, Some(58.08));
        assert_eq!(records[0].confidence, PUBCHEM_CONFIDENCE);
        assert_eq!(server.hits("GET", &name_path("acetone")), 1);
    }

    #[tokio::test]
    async fn test_search_not_found_is_empty() {
        let server = StubServer::start().await;
        server.route("GET", &name_path("unobtainium"), 404, r#"{"Fault":{"Code":"PUGREST.NotFound"}}"#);

        let records = source(server.url()).search("unobtainium").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = StubServer::start().await;
        server.route("GET", &name_path("acetone"), 503, "");
        let s = source(server.url());

        let err = s.search("acetone").await.unwrap_err();
        assert_eq!(err.code_str(), "upstream_status");
        assert!(err.to_string().contains("503"));
        assert!(s.search_or_empty("acetone").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_malformed_payload() {
        let server = StubServer::start().await;
        server.route("GET", &name_path("acetone"), 200, "<html>busy</html>");
        let s = source(server.url());

        assert_eq!(s.search("acetone").await.unwrap_err().code_str(), "parse_error");
        assert!(s.search_or_empty("acetone").await.is_empty());
    }

    #[tokio::test]
    async fn test_details_with_synonyms() {
        let server = StubServer::start().await;
        let cid_path = format!("/compound/cid/180/property/{}/JSON", PROPERTY_LIST);
        server.route("GET", &cid_path, 200, acetone_table());
        server.route(
            "GET",
            "/compound/cid/180/synonyms/JSON",
            200,
            serde_json::json!({
                "InformationList": {
                    "Information": [{"CID": 180, "Synonym": ["acetone", "2-propanone", "67-64-1"]}]
                }
            })
            .to_string(),
        );

        let record = source(server.url()).get_details("180").await.unwrap().unwrap();
        assert_eq!(record.name, "Acetone");
        assert_eq!(record.cas_number.as_deref(), Some("67-64-1"));
        assert_eq!(record.synonyms.as_ref().map(|s| s.len()), Some(3));
    }

    #[tokio::test]
    async fn test_details_survive_synonym_failure() {
        let server = StubServer::start().await;
        let cid_path = format!("/compound/cid/180/property/{}/JSON", PROPERTY_LIST);
        server.route("GET", &cid_path, 200, acetone_table());
        server.route("GET", "/compound/cid/180/synonyms/JSON", 500, "");

        let record = source(server.url()).get_details("180").await.unwrap().unwrap();
        assert_eq!(record.name, "Acetone");
        assert!(record.cas_number.is_none());
        assert!(record.synonyms.is_none());
    }

    #[tokio::test]
    async fn test_details_unknown_cid() {
        let server = StubServer::start().await;
        let s = source(server.url());
        assert!(s.get_details("999999999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_yields_empty() {
        let s = source("http://127.0.0.1:9");
        assert!(s.search("acetone").await.is_err());
        assert!(s.search_or_empty("acetone").await.is_empty());
    }
}
