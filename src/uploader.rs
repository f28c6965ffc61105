use std::collections::HashMap;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::domain::DatasourceRecord;
use crate::error::AdminError;
use crate::server::DatasourceServer;

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub identifier: String,
    pub file: String,
    pub uploaded: bool,
}

/// Files chosen for upload, at most one per datasource identifier.
#[derive(Debug, Default)]
pub struct Uploader {
    staged: HashMap<String, Utf8PathBuf>,
}

impl Uploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `file` for the record, replacing any file staged for it before.
    pub fn stage(&mut self, identifier: &str, file: impl Into<Utf8PathBuf>) -> Option<Utf8PathBuf> {
        self.staged.insert(identifier.to_string(), file.into())
    }

    /// Sends the staged file. The staged entry is cleared whatever the outcome; only a
    /// missing file is reported as an error.
    pub fn upload<S: DatasourceServer>(
        &mut self,
        server: &S,
        record: &mut DatasourceRecord,
    ) -> Result<UploadReport, AdminError> {
        let identifier = record.identifier.clone();
        let file = self
            .staged
            .remove(&identifier)
            .ok_or_else(|| AdminError::NoFileStaged(identifier.clone()))?;

        let uploaded = match server.upload_file(&identifier, &file) {
            Ok(()) => {
                record.uploaded = true;
                tracing::info!(%identifier, %file, "file uploaded");
                true
            }
            Err(AdminError::ServerStatus { status, message }) => {
                tracing::warn!(%identifier, %file, status, body = %message, "upload rejected");
                false
            }
            Err(err) => {
                tracing::warn!(%identifier, %file, error = %err, "upload failed");
                false
            }
        };

        Ok(UploadReport {
            identifier,
            file: file.into_string(),
            uploaded,
        })
    }
}
