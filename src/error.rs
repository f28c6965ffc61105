use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AdminError {
    #[error("datasource identifier must not be empty")]
    EmptyIdentifier,

    #[error("{0} already exists")]
    DuplicateIdentifier(String),

    #[error("datasource not found: {0}")]
    RecordNotFound(String),

    #[error("no record at index {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid PubMed id: {0:?}")]
    InvalidPubmedId(String),

    #[error("no file selected, datasource: {0}")]
    NoFileStaged(String),

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("config file not found at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("server request failed: {0}")]
    ServerHttp(String),

    #[error("server returned status {status}: {message}")]
    ServerStatus { status: u16, message: String },

    #[error("unexpected server response: {0}")]
    ServerDecode(String),

    #[error("citation request failed: {0}")]
    CitationHttp(String),

    #[error("citation service returned status {status}: {message}")]
    CitationStatus { status: u16, message: String },

    #[error("unexpected citation response: {0}")]
    CitationDecode(String),

    #[error("no citation found for PubMed id {0}")]
    CitationMissing(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl AdminError {
    /// Validation failures are the only errors a workflow operation returns to its caller.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AdminError::EmptyIdentifier
                | AdminError::DuplicateIdentifier(_)
                | AdminError::RecordNotFound(_)
                | AdminError::IndexOutOfRange { .. }
                | AdminError::NoFileStaged(_)
                | AdminError::InvalidPubmedId(_)
        )
    }
}
