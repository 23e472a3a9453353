use crate::error::SourceError;
use crate::types::CandidateRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

/// Properties requested from the PUG REST property endpoints.
pub(super) const PROPERTY_LIST: &str = "Title,IUPACName,MolecularFormula,MolecularWeight,XLogP,ExactMass,TPSA";

static CAS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").expect("valid CAS regex"));

#[derive(Debug, Deserialize)]
struct PropertyResponse {
    #[serde(rename = "PropertyTable")]
    property_table: PropertyTable,
}

#[derive(Debug, Deserialize)]
struct PropertyTable {
    #[serde(rename = "Properties", default)]
    properties: Vec<CompoundProperties>,
}

/// One row of a PUG REST property table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct CompoundProperties {
    #[serde(rename = "CID")]
    pub cid: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "IUPACName", default)]
    pub iupac_name: Option<String>,
    #[serde(default)]
    pub molecular_formula: Option<String>,
    /// PubChem has served this both as a number and as a decimal string.
    #[serde(default)]
    pub molecular_weight: Option<Value>,
    #[serde(rename = "XLogP", default)]
    pub xlogp: Option<f64>,
    #[serde(default)]
    pub exact_mass: Option<Value>,
    #[serde(rename = "TPSA", default)]
    pub tpsa: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SynonymResponse {
    #[serde(rename = "InformationList")]
    information_list: InformationList,
}

#[derive(Debug, Deserialize)]
struct InformationList {
    #[serde(rename = "Information", default)]
    information: Vec<Information>,
}

#[derive(Debug, Deserialize)]
struct Information {
    #[serde(rename = "Synonym", default)]
    synonym: Vec<String>,
}

pub(super) fn parse_property_table(body: &str) -> Result<Vec<CompoundProperties>, SourceError> {
    let response: PropertyResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::MalformedPayload(format!("PubChem property table: {}", e)))?;
    Ok(response.property_table.properties)
}

pub(super) fn parse_synonyms(body: &str) -> Result<Vec<String>, SourceError> {
    let response: SynonymResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::MalformedPayload(format!("PubChem synonyms: {}", e)))?;
    Ok(response
        .information_list
        .information
        .into_iter()
        .flat_map(|info| info.synonym)
        .collect())
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First synonym shaped like a CAS registry number.
pub(super) fn extract_cas(synonyms: &[String]) -> Option<String> {
    synonyms
        .iter()
        .find(|s| CAS_PATTERN.is_match(s.trim()))
        .map(|s| s.trim().to_string())
}

/// Map a property row onto a candidate. `fallback_name` is used when PubChem
/// has no title for the compound.
pub(super) fn to_candidate(
    props: &CompoundProperties,
    fallback_name: &str,
    source: &str,
    confidence: f64,
) -> CandidateRecord {
    let name = props
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    let mut record = CandidateRecord::new(name, source, props.cid.to_string(), confidence);

    if let Some(iupac) = props.iupac_name.as_ref().filter(|s| !s.is_empty()) {
        record = record.with_chemical_name(iupac.clone());
    }
    if let Some(formula) = props.molecular_formula.as_ref() {
        record = record.with_formula(formula.clone());
    }
    if let Some(weight) = props.molecular_weight.as_ref().and_then(number_of) {
        record = record.with_molecular_weight(weight);
    }
    if let Some(xlogp) = props.xlogp {
        record = record.with_property("xlogp", json!(xlogp));
    }
    if let Some(mass) = props.exact_mass.as_ref().and_then(number_of) {
        record = record.with_property("exactMass", json!(mass));
    }
    if let Some(tpsa) = props.tpsa {
        record = record.with_property("tpsa", json!(tpsa));
    }

    record
}
