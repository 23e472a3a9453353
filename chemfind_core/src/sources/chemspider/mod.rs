use crate::config::{ChemSpiderConfig, HttpConfig};
use crate::error::SourceError;
use crate::sources::{build_http_client, trim_base};
use crate::types::CandidateRecord;
use crate::ProductSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// ChemSpider records carry curated names, so they rank above PubChem.
pub const CHEMSPIDER_CONFIDENCE: f64 = 0.85;

const DETAIL_FIELDS: &str = "CommonName,Formula,MolecularWeight,SMILES,InChIKey";
const STATUS_POLL_ATTEMPTS: usize = 5;
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(300);

#[derive(Debug, Serialize)]
struct NameFilterRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterResponse {
    query_id: String,
}

#[derive(Debug, Deserialize)]
struct FilterStatus {
    status: String,
}

#[derive(Debug, Deserialize)]
struct FilterResults {
    #[serde(default)]
    results: Vec<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordDetails {
    id: u64,
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    formula: Option<String>,
    #[serde(default)]
    molecular_weight: Option<f64>,
    #[serde(default)]
    smiles: Option<String>,
    #[serde(rename = "inchiKey", default)]
    inchi_key: Option<String>,
}

/// ChemSpider formulas mark subscripts as `C_{3}H_{6}O`.
fn normalize_formula(formula: &str) -> String {
    formula.replace("_{", "").replace('}', "")
}

fn to_candidate(details: RecordDetails) -> CandidateRecord {
    let name = details
        .common_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("ChemSpider {}", details.id));

    let mut record = CandidateRecord::new(
        name,
        "chemspider",
        details.id.to_string(),
        CHEMSPIDER_CONFIDENCE,
    );
    if let Some(common) = details.common_name.filter(|n| !n.trim().is_empty()) {
        record = record.with_chemical_name(common);
    }
    if let Some(formula) = details.formula {
        record = record.with_formula(normalize_formula(&formula));
    }
    if let Some(weight) = details.molecular_weight {
        record = record.with_molecular_weight(weight);
    }
    if let Some(smiles) = details.smiles {
        record = record.with_property("smiles", json!(smiles));
    }
    if let Some(key) = details.inchi_key {
        record = record.with_property("inchiKey", json!(key));
    }
    record
}

/// Royal Society of Chemistry compounds API adapter. Requires an API key.
#[derive(Clone)]
pub struct ChemSpiderSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    max_records: usize,
    poll_attempts: usize,
    poll_interval: Duration,
}

impl ChemSpiderSource {
    pub fn new(http: &HttpConfig, config: &ChemSpiderConfig) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_http_client(http)?,
            base_url: trim_base(&config.base_url),
            api_key: config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty()),
            max_records: config.max_records,
            poll_attempts: STATUS_POLL_ATTEMPTS,
            poll_interval: STATUS_POLL_INTERVAL,
        })
    }

    fn check_status(status: StatusCode) -> Result<(), SourceError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(SourceError::Status {
                source_name: "chemspider",
                status,
            })
        }
    }

    async fn submit_name_filter(&self, api_key: &str, query: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .post(format!("{}/filter/name", self.base_url))
            .header("apikey", api_key)
            .json(&NameFilterRequest { name: query })
            .send()
            .await?;
        Self::check_status(response.status())?;
        let filter: FilterResponse = response.json().await?;
        Ok(filter.query_id)
    }

    async fn wait_for_filter(&self, api_key: &str, query_id: &str) -> Result<(), SourceError> {
        for attempt in 0..self.poll_attempts {
            let response = self
                .client
                .get(format!("{}/filter/{}/status", self.base_url, query_id))
                .header("apikey", api_key)
                .send()
                .await?;
            Self::check_status(response.status())?;
            let status: FilterStatus = response.json().await?;
            match status.status.as_str() {
                "Complete" => return Ok(()),
                "Failed" | "Suspended" | "NotFound" => {
                    return Err(SourceError::Upstream {
                        source_name: "chemspider",
                        message: format!("filter {} ended with status {}", query_id, status.status),
                    })
                }
                other => {
                    debug!(target: "chemfind.source.chemspider", query_id, attempt, status = other, "filter pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
        Err(SourceError::Upstream {
            source_name: "chemspider",
            message: format!(
                "filter {} did not complete after {} polls",
                query_id, self.poll_attempts
            ),
        })
    }

    async fn filter_results(&self, api_key: &str, query_id: &str) -> Result<Vec<u64>, SourceError> {
        let response = self
            .client
            .get(format!(
                "{}/filter/{}/results?start=0&count={}",
                self.base_url, query_id, self.max_records
            ))
            .header("apikey", api_key)
            .send()
            .await?;
        Self::check_status(response.status())?;
        let results: FilterResults = response.json().await?;
        Ok(results.results)
    }

    async fn record_details(
        &self,
        api_key: &str,
        record_id: u64,
    ) -> Result<Option<CandidateRecord>, SourceError> {
        let response = self
            .client
            .get(format!(
                "{}/records/{}/details?fields={}",
                self.base_url, record_id, DETAIL_FIELDS
            ))
            .header("apikey", api_key)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::check_status(response.status())?;
        let details: RecordDetails = response.json().await?;
        Ok(Some(to_candidate(details)))
    }
}

#[async_trait]
impl ProductSource for ChemSpiderSource {
    fn name(&self) -> &'static str {
        "chemspider"
    }

    fn description(&self) -> &'static str {
        "ChemSpider via the RSC compounds API (requires API key)"
    }

    fn baseline_confidence(&self) -> f64 {
        CHEMSPIDER_CONFIDENCE
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn search(&self, query: &str) -> Result<Vec<CandidateRecord>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!(target: "chemfind.source.chemspider", %query, "no API key configured, skipping");
            return Ok(Vec::new());
        };

        let query_id = self.submit_name_filter(api_key, query).await?;
        self.wait_for_filter(api_key, &query_id).await?;
        let ids = self.filter_results(api_key, &query_id).await?;

        let lookups = ids
            .iter()
            .take(self.max_records)
            .map(|id| self.record_details(api_key, *id));
        let mut records = Vec::new();
        for (id, result) in ids.iter().zip(futures::future::join_all(lookups).await) {
            match result {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    warn!(target: "chemfind.source.chemspider", record_id = id, error = %e, "record lookup failed")
                }
            }
        }

        info!(target: "chemfind.source.chemspider", %query, count = records.len(), "chemspider search complete");
        Ok(records)
    }

    async fn get_details(&self, source_id: &str) -> Result<Option<CandidateRecord>, SourceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SourceError::NotConfigured("chemspider"));
        };
        let record_id: u64 = source_id.trim().parse().map_err(|_| {
            SourceError::InvalidInput(format!("not a ChemSpider record id: {}", source_id))
        })?;
        self.record_details(api_key, record_id).await
    }
}
