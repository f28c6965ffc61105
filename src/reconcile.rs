use std::fmt;

use serde::Serialize;

use crate::domain::{DatasourcePayload, DatasourceRecord, canonicalize};
use crate::server::DatasourceServer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveDecision {
    Create,
    Update,
}

impl fmt::Display for SaveDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveDecision::Create => write!(f, "create"),
            SaveDecision::Update => write!(f, "update"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveReport {
    pub identifier: String,
    /// `None` when the server list could not be read and nothing was sent.
    pub decision: Option<SaveDecision>,
    pub delivered: bool,
}

/// Create-or-update decision against the server's current identifier set.
pub fn decide(existing: &[DatasourceRecord], identifier: &str) -> SaveDecision {
    let known = canonicalize(existing.iter().map(|record| record.identifier.as_str()));
    if known.contains(&identifier.to_lowercase()) {
        SaveDecision::Update
    } else {
        SaveDecision::Create
    }
}

/// Persists one record: project its persistable fields, re-read the server list, then
/// update or create. Transport failures are logged and never rolled back or returned.
pub fn save<S: DatasourceServer>(server: &S, record: &DatasourceRecord) -> SaveReport {
    let payload = DatasourcePayload::from(record);
    let identifier = payload.identifier.clone();
    tracing::debug!(
        %identifier,
        payload = %serde_json::to_string(&payload).unwrap_or_default(),
        "saving datasource"
    );

    let existing = match server.list() {
        Ok(existing) => existing,
        Err(err) => {
            tracing::warn!(%identifier, error = %err, "cannot read server datasources, save skipped");
            return SaveReport {
                identifier,
                decision: None,
                delivered: false,
            };
        }
    };

    let decision = decide(&existing, &identifier);
    let result = match decision {
        SaveDecision::Update => server.update(&payload),
        SaveDecision::Create => server.create(&payload),
    };
    let delivered = match result {
        Ok(()) => {
            tracing::info!(%identifier, %decision, "datasource saved");
            true
        }
        Err(err) => {
            tracing::warn!(%identifier, %decision, error = %err, "save failed");
            false
        }
    };

    SaveReport {
        identifier,
        decision: Some(decision),
        delivered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing(ids: &[&str]) -> Vec<DatasourceRecord> {
        ids.iter().map(|id| DatasourceRecord::new_local(id)).collect()
    }

    #[test]
    fn matching_identifier_updates() {
        assert_eq!(decide(&existing(&["pid", "psp"]), "PID"), SaveDecision::Update);
    }

    #[test]
    fn unknown_identifier_creates() {
        assert_eq!(decide(&existing(&["pid"]), "new1"), SaveDecision::Create);
        assert_eq!(decide(&[], "pid"), SaveDecision::Create);
    }

    #[test]
    fn server_identifiers_compare_case_insensitively() {
        let mut records = existing(&["x"]);
        records[0].identifier = "Reactome".to_string();
        assert_eq!(decide(&records, "reactome"), SaveDecision::Update);
    }
}
