#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use camino::Utf8Path;

use datasource_admin::citation::{CitationLookup, CitationSummary};
use datasource_admin::domain::{DatasourcePayload, DatasourceRecord, PubmedId};
use datasource_admin::error::AdminError;
use datasource_admin::server::DatasourceServer;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(DatasourcePayload),
    Update(DatasourcePayload),
    Delete(String),
    Upload(String, String),
}

#[derive(Default)]
struct MockState {
    records: Mutex<Vec<DatasourceRecord>>,
    calls: Mutex<Vec<Call>>,
    fail_list: bool,
    fail_writes: bool,
}

/// In-memory server double. Clones share state, so a test keeps a handle after giving
/// one to the app.
#[derive(Clone, Default)]
pub struct MockServer {
    state: Arc<MockState>,
}

impl MockServer {
    pub fn with_records(records: Vec<DatasourceRecord>) -> Self {
        Self::build(records, false, false)
    }

    pub fn with_ids(ids: &[&str]) -> Self {
        Self::with_records(ids.iter().map(|id| record(id)).collect())
    }

    pub fn failing_writes(ids: &[&str]) -> Self {
        Self::build(ids.iter().map(|id| record(id)).collect(), false, true)
    }

    pub fn unreachable() -> Self {
        Self::build(Vec::new(), true, true)
    }

    fn build(records: Vec<DatasourceRecord>, fail_list: bool, fail_writes: bool) -> Self {
        Self {
            state: Arc::new(MockState {
                records: Mutex::new(records),
                calls: Mutex::new(Vec::new()),
                fail_list,
                fail_writes,
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| *call != Call::List)
            .collect()
    }

    fn record_call(&self, call: Call) -> Result<(), AdminError> {
        self.state.calls.lock().unwrap().push(call);
        if self.state.fail_writes {
            return Err(AdminError::ServerStatus {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        Ok(())
    }
}

impl DatasourceServer for MockServer {
    fn list(&self) -> Result<Vec<DatasourceRecord>, AdminError> {
        self.state.calls.lock().unwrap().push(Call::List);
        if self.state.fail_list {
            return Err(AdminError::ServerHttp("connection refused".to_string()));
        }
        Ok(self.state.records.lock().unwrap().clone())
    }

    fn create(&self, payload: &DatasourcePayload) -> Result<(), AdminError> {
        self.record_call(Call::Create(payload.clone()))
    }

    fn update(&self, payload: &DatasourcePayload) -> Result<(), AdminError> {
        self.record_call(Call::Update(payload.clone()))
    }

    fn delete(&self, identifier: &str) -> Result<(), AdminError> {
        self.record_call(Call::Delete(identifier.to_string()))
    }

    fn upload_file(&self, identifier: &str, file: &Utf8Path) -> Result<(), AdminError> {
        self.record_call(Call::Upload(identifier.to_string(), file.to_string()))
    }
}

/// Citation double keyed by PubMed id; unknown ids fail like an empty search result.
/// Clones share the request log.
#[derive(Clone, Default)]
pub struct MockLookup {
    summaries: HashMap<String, CitationSummary>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockLookup {
    pub fn with(mut self, pubmed_id: &str, summary: CitationSummary) -> Self {
        self.summaries.insert(pubmed_id.to_string(), summary);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl CitationLookup for MockLookup {
    fn lookup(&self, pubmed_id: &PubmedId) -> Result<CitationSummary, AdminError> {
        self.requests
            .lock()
            .unwrap()
            .push(pubmed_id.as_str().to_string());
        self.summaries
            .get(pubmed_id.as_str())
            .cloned()
            .ok_or_else(|| AdminError::CitationMissing(pubmed_id.to_string()))
    }
}

pub fn record(identifier: &str) -> DatasourceRecord {
    DatasourceRecord {
        identifier: identifier.to_string(),
        name: vec![identifier.to_uppercase()],
        ..DatasourceRecord::default()
    }
}

pub fn cited(identifier: &str, pubmed_id: &str) -> DatasourceRecord {
    DatasourceRecord {
        pubmed_id: Some(pubmed_id.parse().unwrap()),
        ..record(identifier)
    }
}

pub fn doe_summary() -> CitationSummary {
    CitationSummary {
        author_string: Some("Doe J".to_string()),
        title: Some("T".to_string()),
        journal_title: Some("J".to_string()),
        pub_year: Some("2020".to_string()),
        journal_volume: Some("5".to_string()),
        issue: Some("2".to_string()),
        page_info: Some("10-20".to_string()),
    }
}
