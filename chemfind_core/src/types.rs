//! Core types shared by the adapters, the aggregator and the cache layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A normalized chemical product match produced by one source adapter.
///
/// `source` and `source_id` together identify the record upstream and are
/// enough to fetch full details again through
/// [`ExternalProductService::get_product_details`](crate::ExternalProductService::get_product_details).
/// `confidence` is a ranking heuristic, not a probability; only the scorer
/// clamps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    /// Display name
    pub name: String,

    /// CAS registry number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas_number: Option<String>,

    /// Systematic or common chemical name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_formula: Option<String>,

    /// Molecular weight in g/mol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecular_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,

    /// Free-form physical/chemical properties reported by the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Value>>,

    /// Free-form safety data (GHS codes, hazard statements, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_data: Option<HashMap<String, Value>>,

    /// Adapter name that produced this record (e.g., "pubchem")
    pub source: String,

    /// Identifier within the source (PubChem CID, ChemSpider record id)
    pub source_id: String,

    pub confidence: f64,
}

impl CandidateRecord {
    /// Create a record with the required fields; everything else starts empty.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        source_id: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            name: name.into(),
            cas_number: None,
            chemical_name: None,
            manufacturer: None,
            molecular_formula: None,
            molecular_weight: None,
            synonyms: None,
            properties: None,
            safety_data: None,
            source: source.into(),
            source_id: source_id.into(),
            confidence,
        }
    }

    pub fn with_cas_number(mut self, cas: impl Into<String>) -> Self {
        self.cas_number = Some(cas.into());
        self
    }

    pub fn with_chemical_name(mut self, name: impl Into<String>) -> Self {
        self.chemical_name = Some(name.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.molecular_formula = Some(formula.into());
        self
    }

    pub fn with_molecular_weight(mut self, weight: f64) -> Self {
        self.molecular_weight = Some(weight);
        self
    }

    pub fn with_synonyms(mut self, synonyms: Vec<String>) -> Self {
        self.synonyms = Some(synonyms);
        self
    }

    /// Insert a single property, creating the mapping if needed.
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }

    pub fn with_safety_data(mut self, data: HashMap<String, Value>) -> Self {
        self.safety_data = Some(data);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Inclusive numeric range; either bound may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// True only when both bounds are present and `value` lies within them.
    pub fn contains(&self, value: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => value >= min && value <= max,
            _ => false,
        }
    }
}

/// Caller-supplied preferences for replacement search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_class: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_groups: Vec<String>,

    #[serde(default)]
    pub molecular_weight_range: NumericRange,

    #[serde(default)]
    pub boiling_point_range: NumericRange,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solubility_requirements: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_profile: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regulatory_status: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_substances: Vec<String>,
}

/// The product a caller wants to replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalProduct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chemical_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl OriginalProduct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Reference to a logical data source row in the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub id: i64,
    pub name: String,
}

/// A cached aggregation result as held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<i64>,
    /// JSON-serialized `Vec<CandidateRecord>`
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Descriptive information about a registered source adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub description: String,
    pub baseline_confidence: f64,
    pub configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidate_builder() {
        let record = CandidateRecord::new("Acetone", "pubchem", "180", 0.8)
            .with_cas_number("67-64-1")
            .with_chemical_name("propan-2-one")
            .with_formula("C3H6O")
            .with_molecular_weight(58.08)
            .with_property("xlogp", json!(-0.1));

        assert_eq!(record.name, "Acetone");
        assert_eq!(record.cas_number.as_deref(), Some("67-64-1"));
        assert_eq!(record.molecular_weight, Some(58.08));
        assert_eq!(record.properties.unwrap().get("xlogp"), Some(&json!(-0.1)));
        assert_eq!(record.confidence, 0.8);
    }

    #[test]
    fn test_candidate_serialization_is_camel_case() {
        let record = CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_cas_number("67-64-1");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["casNumber"], "67-64-1");
        assert_eq!(value["sourceId"], "180");
        assert!(value.get("chemicalName").is_none());
    }

    #[test]
    fn test_range_requires_both_bounds() {
        assert!(NumericRange::new(Some(50.0), Some(60.0)).contains(50.0));
        assert!(NumericRange::new(Some(50.0), Some(60.0)).contains(60.0));
        assert!(!NumericRange::new(Some(50.0), Some(60.0)).contains(60.01));
        assert!(!NumericRange::new(Some(50.0), None).contains(55.0));
        assert!(!NumericRange::default().contains(55.0));
    }

    #[test]
    fn test_criteria_deserialize_partial() {
        let criteria: ReplacementCriteria = serde_json::from_value(json!({
            "chemicalClass": "ketone",
            "excludedSubstances": ["toluene"],
            "molecularWeightRange": {"min": 40.0, "max": 80.0}
        }))
        .unwrap();
        assert_eq!(criteria.chemical_class.as_deref(), Some("ketone"));
        assert_eq!(criteria.excluded_substances, vec!["toluene"]);
        assert!(criteria.molecular_weight_range.contains(58.08));
        assert!(criteria.functional_groups.is_empty());
    }
}
