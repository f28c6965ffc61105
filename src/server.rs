use camino::Utf8Path;
use reqwest::Url;
use reqwest::blocking::{Client, Response, multipart};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::ResolvedConfig;
use crate::domain::{DatasourcePayload, DatasourceRecord};
use crate::error::AdminError;

/// The REST backend that owns datasource metadata.
pub trait DatasourceServer: Send + Sync {
    fn list(&self) -> Result<Vec<DatasourceRecord>, AdminError>;
    /// `PUT admin/datasources`
    fn create(&self, payload: &DatasourcePayload) -> Result<(), AdminError>;
    /// `POST admin/datasources`
    fn update(&self, payload: &DatasourcePayload) -> Result<(), AdminError>;
    fn delete(&self, identifier: &str) -> Result<(), AdminError>;
    fn upload_file(&self, identifier: &str, file: &Utf8Path) -> Result<(), AdminError>;
}

#[derive(Clone)]
pub struct HttpDatasourceServer {
    client: Client,
    base_url: Url,
}

impl HttpDatasourceServer {
    pub fn new(config: &ResolvedConfig) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("dsadmin/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AdminError::ServerHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdminError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AdminError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn handle_status(response: Response) -> Result<Response, AdminError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "server request failed".to_string());
        Err(AdminError::ServerStatus { status, message })
    }
}

impl DatasourceServer for HttpDatasourceServer {
    fn list(&self) -> Result<Vec<DatasourceRecord>, AdminError> {
        let url = self.endpoint(&["metadata", "datasources"])?;
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Self::handle_status(response)?
            .json()
            .map_err(|err| AdminError::ServerDecode(err.to_string()))
    }

    fn create(&self, payload: &DatasourcePayload) -> Result<(), AdminError> {
        let url = self.endpoint(&["admin", "datasources"])?;
        let response = self
            .client
            .put(url)
            .json(payload)
            .send()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Self::handle_status(response).map(|_| ())
    }

    fn update(&self, payload: &DatasourcePayload) -> Result<(), AdminError> {
        let url = self.endpoint(&["admin", "datasources"])?;
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Self::handle_status(response).map(|_| ())
    }

    fn delete(&self, identifier: &str) -> Result<(), AdminError> {
        let url = self.endpoint(&["admin", "datasources", identifier])?;
        let response = self
            .client
            .delete(url)
            .send()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Self::handle_status(response).map(|_| ())
    }

    fn upload_file(&self, identifier: &str, file: &Utf8Path) -> Result<(), AdminError> {
        let url = self.endpoint(&["admin", "datasources", identifier, "file"])?;
        let form = multipart::Form::new()
            .file("file", file.as_std_path())
            .map_err(|err| AdminError::Filesystem(format!("read {file}: {err}")))?;
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .map_err(|err| AdminError::ServerHttp(err.to_string()))?;
        Self::handle_status(response).map(|_| ())
    }
}
