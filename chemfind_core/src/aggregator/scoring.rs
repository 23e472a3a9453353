//! Replacement scoring.
//!
//! Adjustments are additive on top of the record's existing confidence and the
//! total is clamped to `[0.0, 1.0]`.

use crate::types::{CandidateRecord, ReplacementCriteria};

pub const CHEMICAL_CLASS_BONUS: f64 = 0.20;
pub const WEIGHT_RANGE_BONUS: f64 = 0.15;
pub const SAFETY_DATA_BONUS: f64 = 0.10;
pub const EXCLUSION_PENALTY: f64 = 0.30;

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Confidence delta for `candidate` under `criteria`, before clamping.
pub fn adjustment(candidate: &CandidateRecord, criteria: &ReplacementCriteria) -> f64 {
    let mut delta = 0.0;

    if let (Some(class), Some(chemical)) = (
        non_empty(&criteria.chemical_class),
        non_empty(&candidate.chemical_name),
    ) {
        if contains_ci(chemical, class) {
            delta += CHEMICAL_CLASS_BONUS;
        }
    }

    if let Some(weight) = candidate.molecular_weight {
        if criteria.molecular_weight_range.contains(weight) {
            delta += WEIGHT_RANGE_BONUS;
        }
    }

    if non_empty(&criteria.safety_profile).is_some() && candidate.safety_data.is_some() {
        delta += SAFETY_DATA_BONUS;
    }

    let excluded = criteria
        .excluded_substances
        .iter()
        .filter(|s| !s.is_empty())
        .any(|substance| {
            contains_ci(&candidate.name, substance)
                || candidate
                    .chemical_name
                    .as_deref()
                    .is_some_and(|chemical| contains_ci(chemical, substance))
        });
    if excluded {
        delta -= EXCLUSION_PENALTY;
    }

    delta
}

/// Return a copy of `candidate` with its confidence rescored.
pub fn score(candidate: &CandidateRecord, criteria: &ReplacementCriteria) -> CandidateRecord {
    let confidence = (candidate.confidence + adjustment(candidate, criteria)).clamp(0.0, 1.0);
    candidate.clone().with_confidence(confidence)
}
