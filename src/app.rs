use camino::Utf8PathBuf;
use serde::Serialize;

use crate::citation::CitationLookup;
use crate::domain::{DatasourceRecord, RecordEdit};
use crate::enricher::CitationEnricher;
use crate::error::AdminError;
use crate::reconcile::{self, SaveReport};
use crate::server::DatasourceServer;
use crate::store::RecordStore;
use crate::uploader::{UploadReport, Uploader};

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub fetched_at: String,
    pub loaded: bool,
    pub datasources: Vec<ListEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListEntry {
    pub identifier: String,
    pub name: Vec<String>,
    #[serde(rename = "type")]
    pub data_type: String,
    pub availability: String,
    pub description: Option<String>,
    pub url_to_homepage: Option<String>,
    pub pubmed_id: Option<String>,
    pub citation: Option<String>,
}

impl From<&DatasourceRecord> for ListEntry {
    fn from(record: &DatasourceRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            name: record.name.clone(),
            data_type: record.type_label().to_string(),
            availability: record.availability_label().to_string(),
            description: record.description.clone(),
            url_to_homepage: record.url_to_homepage.clone(),
            pubmed_id: record.pubmed_id.as_ref().map(|id| id.to_string()),
            citation: record.citation.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub identifier: String,
    /// False when the collection was never loaded, so `valid` says nothing.
    pub loaded: bool,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResult {
    pub identifier: String,
    pub remaining: usize,
}

/// One admin session: the local record collection, the upload staging area, and the
/// collaborators they are persisted through.
pub struct App<S: DatasourceServer, C: CitationLookup> {
    server: S,
    enricher: Option<CitationEnricher<C>>,
    store: RecordStore,
    uploader: Uploader,
    loaded: bool,
}

impl<S: DatasourceServer, C: CitationLookup + 'static> App<S, C> {
    /// Without a citation lookup, records are never enriched.
    pub fn new(server: S, citations: Option<C>) -> Self {
        Self {
            server,
            enricher: citations.map(CitationEnricher::new),
            store: RecordStore::new(),
            uploader: Uploader::new(),
            loaded: false,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// A failed reload keeps the previous collection, which still counts as loaded.
    pub fn load(&mut self) -> bool {
        let loaded = self.store.load_all(&self.server, self.enricher.as_ref());
        self.loaded |= loaded;
        loaded
    }

    /// Loads the collection and waits for the citation lookups it started.
    pub fn list(&mut self) -> ListResult {
        let loaded = self.load();
        let enriched = self.store.await_citations();
        tracing::debug!(enriched, "citations applied");
        ListResult {
            fetched_at: chrono::Utc::now().to_rfc3339(),
            loaded,
            datasources: self.store.records().iter().map(ListEntry::from).collect(),
        }
    }

    /// Trims the candidate the same way `create` does. Nothing is valid until the
    /// collection has been loaded at least once.
    pub fn check(&self, identifier: &str) -> CheckResult {
        let candidate = identifier.trim();
        CheckResult {
            identifier: candidate.to_string(),
            loaded: self.loaded,
            valid: self.loaded && !candidate.is_empty() && self.store.is_unique(candidate),
        }
    }

    /// Adds a new record locally and saves it.
    pub fn create(&mut self, identifier: &str) -> Result<SaveReport, AdminError> {
        let record = self.store.insert_new(identifier)?;
        Ok(reconcile::save(&self.server, record))
    }

    /// Applies `edit` to the record and saves it.
    pub fn edit(&mut self, identifier: &str, edit: &RecordEdit) -> Result<SaveReport, AdminError> {
        let index = self.position(identifier)?;
        let record = self
            .store
            .get_mut(index)
            .ok_or_else(|| AdminError::RecordNotFound(identifier.to_string()))?;
        edit.apply(record)?;
        Ok(reconcile::save(&self.server, record))
    }

    pub fn save(&self, identifier: &str) -> Result<SaveReport, AdminError> {
        let index = self.position(identifier)?;
        let record = self
            .store
            .get(index)
            .ok_or_else(|| AdminError::RecordNotFound(identifier.to_string()))?;
        Ok(reconcile::save(&self.server, record))
    }

    pub fn delete(&mut self, identifier: &str) -> Result<DeleteResult, AdminError> {
        let index = self.position(identifier)?;
        self.delete_at(index)
    }

    pub fn delete_at(&mut self, index: usize) -> Result<DeleteResult, AdminError> {
        let removed = self.store.remove_at(index, &self.server)?;
        Ok(DeleteResult {
            identifier: removed.identifier,
            remaining: self.store.len(),
        })
    }

    pub fn stage_file(
        &mut self,
        identifier: &str,
        file: impl Into<Utf8PathBuf>,
    ) -> Result<(), AdminError> {
        let index = self.position(identifier)?;
        let key = self.store.records()[index].identifier.clone();
        if let Some(previous) = self.uploader.stage(&key, file) {
            tracing::debug!(identifier = %key, %previous, "replaced staged file");
        }
        Ok(())
    }

    pub fn upload(&mut self, identifier: &str) -> Result<UploadReport, AdminError> {
        let index = self.position(identifier)?;
        let record = self
            .store
            .get_mut(index)
            .ok_or_else(|| AdminError::RecordNotFound(identifier.to_string()))?;
        self.uploader.upload(&self.server, record)
    }

    fn position(&self, identifier: &str) -> Result<usize, AdminError> {
        self.store
            .find(identifier)
            .ok_or_else(|| AdminError::RecordNotFound(identifier.to_string()))
    }
}
