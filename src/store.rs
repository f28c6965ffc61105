use crate::citation::CitationLookup;
use crate::domain::DatasourceRecord;
use crate::enricher::{CitationBatch, CitationEnricher, CitationUpdate};
use crate::error::AdminError;
use crate::server::DatasourceServer;

/// The client's working copy of the server's datasource list, in display order.
#[derive(Default)]
pub struct RecordStore {
    records: Vec<DatasourceRecord>,
    citations: Option<CitationBatch>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<DatasourceRecord>) -> Self {
        Self {
            records,
            citations: None,
        }
    }

    pub fn records(&self) -> &[DatasourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DatasourceRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut DatasourceRecord> {
        self.records.get_mut(index)
    }

    pub fn find(&self, identifier: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.has_identifier(identifier))
    }

    /// Local-only check: true when no record in the collection carries `candidate`,
    /// compared case-insensitively.
    pub fn is_unique(&self, candidate: &str) -> bool {
        self.find(candidate).is_none()
    }

    /// Replaces the collection with the server's list and starts citation lookups without
    /// waiting for them. A failed list request is logged and leaves the collection as it was.
    pub fn load_all<S, C>(&mut self, server: &S, enricher: Option<&CitationEnricher<C>>) -> bool
    where
        S: DatasourceServer,
        C: CitationLookup + 'static,
    {
        match server.list() {
            Ok(records) => {
                tracing::info!(count = records.len(), "loaded datasources");
                self.citations = enricher.map(|enricher| enricher.spawn(&records));
                self.records = records;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load datasources");
                false
            }
        }
    }

    /// Adds a not-yet-saved record at the top of the collection.
    pub fn insert_new(&mut self, identifier: &str) -> Result<&DatasourceRecord, AdminError> {
        let candidate = identifier.trim();
        if candidate.is_empty() {
            return Err(AdminError::EmptyIdentifier);
        }
        if !self.is_unique(candidate) {
            return Err(AdminError::DuplicateIdentifier(candidate.to_lowercase()));
        }
        self.records.insert(0, DatasourceRecord::new_local(candidate));
        Ok(&self.records[0])
    }

    /// Removes the record locally, then asks the server to delete it. The local removal
    /// stands whatever the server answers.
    pub fn remove_at<S: DatasourceServer>(
        &mut self,
        index: usize,
        server: &S,
    ) -> Result<DatasourceRecord, AdminError> {
        if index >= self.records.len() {
            return Err(AdminError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let record = self.records.remove(index);
        match server.delete(&record.identifier) {
            Ok(()) => tracing::info!(identifier = %record.identifier, "deleted datasource"),
            Err(err) => {
                tracing::warn!(identifier = %record.identifier, error = %err, "delete failed")
            }
        }
        Ok(record)
    }

    /// Applies whatever citations have arrived so far. Returns how many records changed.
    pub fn apply_citations(&mut self) -> usize {
        let updates = match &self.citations {
            Some(batch) => batch.drain_ready(),
            None => return 0,
        };
        self.apply_updates(updates)
    }

    /// Waits for every outstanding lookup, then applies the results.
    pub fn await_citations(&mut self) -> usize {
        match self.citations.take() {
            Some(batch) => {
                let updates = batch.wait_all();
                self.apply_updates(updates)
            }
            None => 0,
        }
    }

    /// Sets the citation on the record the lookup was made for, provided it still carries
    /// the same PubMed id.
    pub fn apply_citation(&mut self, update: CitationUpdate) -> bool {
        let target = self.records.iter_mut().find(|record| {
            record.has_identifier(&update.identifier)
                && record.pubmed_id.as_ref() == Some(&update.pubmed_id)
        });
        match target {
            Some(record) => {
                record.citation = Some(update.citation);
                true
            }
            None => false,
        }
    }

    fn apply_updates(&mut self, updates: Vec<CitationUpdate>) -> usize {
        let mut applied = 0;
        for update in updates {
            if self.apply_citation(update) {
                applied += 1;
            }
        }
        applied
    }
}
