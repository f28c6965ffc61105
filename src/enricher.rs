use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::citation::CitationLookup;
use crate::domain::{DatasourceRecord, PubmedId};

/// A formatted citation for the record that carried `pubmed_id` when the lookup started.
#[derive(Debug, Clone, PartialEq)]
pub struct CitationUpdate {
    pub identifier: String,
    pub pubmed_id: PubmedId,
    pub citation: String,
}

/// Lookups in flight. Dropping the batch detaches the workers; their results are discarded.
pub struct CitationBatch {
    receiver: Receiver<CitationUpdate>,
    requested: usize,
}

impl CitationBatch {
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Results that have already arrived.
    pub fn drain_ready(&self) -> Vec<CitationUpdate> {
        self.receiver.try_iter().collect()
    }

    /// Blocks until every worker has finished, successfully or not.
    pub fn wait_all(self) -> Vec<CitationUpdate> {
        self.receiver.into_iter().collect()
    }
}

/// Upper bound on concurrent citation requests.
pub const DEFAULT_CITATION_WORKERS: usize = 4;

struct CitationJob {
    identifier: String,
    pubmed_id: PubmedId,
}

pub struct CitationEnricher<C: CitationLookup> {
    lookup: Arc<C>,
    workers: usize,
}

impl<C: CitationLookup> Clone for CitationEnricher<C> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            workers: self.workers,
        }
    }
}

impl<C: CitationLookup + 'static> CitationEnricher<C> {
    pub fn new(lookup: C) -> Self {
        Self::with_workers(lookup, DEFAULT_CITATION_WORKERS)
    }

    pub fn with_workers(lookup: C, workers: usize) -> Self {
        Self {
            lookup: Arc::new(lookup),
            workers: workers.max(1),
        }
    }

    /// Queues one independent lookup per record that has a PubMed id and returns
    /// immediately. At most `workers` lookups run at a time.
    pub fn spawn(&self, records: &[DatasourceRecord]) -> CitationBatch {
        let (job_sender, job_receiver) = mpsc::channel();
        let mut requested = 0;
        for record in records {
            let Some(pubmed_id) = record.pubmed_id.clone() else {
                continue;
            };
            requested += 1;
            let _ = job_sender.send(CitationJob {
                identifier: record.identifier.clone(),
                pubmed_id,
            });
        }
        drop(job_sender);

        let (sender, receiver) = mpsc::channel();
        let jobs = Arc::new(Mutex::new(job_receiver));
        for _ in 0..self.workers.min(requested) {
            self.spawn_worker(Arc::clone(&jobs), sender.clone());
        }
        CitationBatch {
            receiver,
            requested,
        }
    }

    fn spawn_worker(
        &self,
        jobs: Arc<Mutex<Receiver<CitationJob>>>,
        sender: Sender<CitationUpdate>,
    ) {
        let lookup = Arc::clone(&self.lookup);
        thread::spawn(move || {
            while let Some(job) = next_job(&jobs) {
                let CitationJob {
                    identifier,
                    pubmed_id,
                } = job;
                match lookup.lookup(&pubmed_id) {
                    Ok(summary) => {
                        let citation = summary.format();
                        tracing::debug!(%identifier, %pubmed_id, %citation, "citation resolved");
                        let update = CitationUpdate {
                            identifier,
                            pubmed_id,
                            citation,
                        };
                        if sender.send(update).is_err() {
                            // batch dropped
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(%identifier, %pubmed_id, error = %err, "citation lookup failed");
                    }
                }
            }
        });
    }
}

fn next_job(jobs: &Mutex<Receiver<CitationJob>>) -> Option<CitationJob> {
    jobs.lock().ok()?.try_recv().ok()
}
