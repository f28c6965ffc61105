use std::collections::HashSet;

use datasource_admin::domain::{DatasourceRecord, canonicalize, same_identifier};
use datasource_admin::store::RecordStore;

#[test]
fn canonical_set_has_one_entry_per_distinct_lowercase_value() {
    let inputs: Vec<Vec<&str>> = vec![
        vec![],
        vec!["pid"],
        vec!["PID", "pid", "Pid"],
        vec!["Reactome", "HumanCyc", "reactome", "KEGG", "kegg", "Kegg"],
        vec!["", " ", ""],
        vec!["ÄBC", "äbc"],
    ];

    for input in inputs {
        let expected: HashSet<String> = input.iter().map(|s| s.to_lowercase()).collect();
        let canonical = canonicalize(&input);
        assert_eq!(canonical, expected, "input {input:?}");
        assert_eq!(canonicalize(&canonical), canonical, "input {input:?}");
    }
}

#[test]
fn uniqueness_matches_lowercase_equality() {
    let ids = ["pid", "PSP", "ChEBI"];
    let store = RecordStore::from_records(
        ids.iter()
            .map(|id| DatasourceRecord {
                identifier: id.to_string(),
                ..DatasourceRecord::default()
            })
            .collect(),
    );

    for candidate in ["pid", "PID", "psp", "chebi", "CHEBI", "reactome", "pi", ""] {
        let taken = ids
            .iter()
            .any(|id| id.to_lowercase() == candidate.to_lowercase());
        assert_eq!(store.is_unique(candidate), !taken, "candidate {candidate:?}");
        assert_eq!(
            ids.iter().any(|id| same_identifier(id, candidate)),
            taken,
            "candidate {candidate:?}"
        );
    }
}
