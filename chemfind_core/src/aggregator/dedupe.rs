use crate::types::CandidateRecord;
use std::collections::HashSet;

/// Identity key for a record: CAS number, else chemical name, else display
/// name, lowercased. Empty strings count as absent.
pub fn dedupe_key(record: &CandidateRecord) -> String {
    record
        .cas_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .or_else(|| record.chemical_name.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(&record.name)
        .to_lowercase()
}

/// Drop records whose key was already seen. Order is preserved and the first
/// occurrence wins, whatever the confidences.
pub fn dedupe(records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(dedupe_key(record)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_cas_first_wins() {
        let records = vec![
            CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_cas_number("67-64-1"),
            CandidateRecord::new("ACETONE", "chemspider", "175", 0.85).with_cas_number("67-64-1"),
        ];
        let deduped = dedupe(records);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].source, "pubchem");
        assert_eq!(deduped[0].confidence, 0.8);
    }

    #[test]
    fn test_key_priority() {
        let cas = CandidateRecord::new("Acetone", "pubchem", "180", 0.8)
            .with_cas_number("67-64-1")
            .with_chemical_name("propan-2-one");
        assert_eq!(dedupe_key(&cas), "67-64-1");

        let chem = CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_chemical_name("Propan-2-one");
        assert_eq!(dedupe_key(&chem), "propan-2-one");

        let name_only = CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_cas_number("");
        assert_eq!(dedupe_key(&name_only), "acetone");
    }

    #[test]
    fn test_chemical_name_case_insensitive() {
        let records = vec![
            CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_chemical_name("propan-2-one"),
            CandidateRecord::new("Dimethyl ketone", "chemspider", "175", 0.85)
                .with_chemical_name("Propan-2-One"),
            CandidateRecord::new("Ethanol", "pubchem", "702", 0.8),
        ];
        let deduped = dedupe(records);
        let ids: Vec<_> = deduped.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(ids, vec!["180", "702"]);
    }

    #[test]
    fn test_different_key_kinds_do_not_collide() {
        // A CAS-keyed record and a name-keyed record for the same substance
        // are kept apart.
        let records = vec![
            CandidateRecord::new("Acetone", "pubchem", "180", 0.8).with_cas_number("67-64-1"),
            CandidateRecord::new("Acetone", "chemspider", "175", 0.85),
        ];
        assert_eq!(dedupe(records).len(), 2);
    }
}
