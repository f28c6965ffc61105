use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Deserializer};

use crate::config::ResolvedConfig;
use crate::domain::{PubmedId, Scalar};
use crate::error::AdminError;

static JSONP_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*[A-Za-z_$][\w$.]*\s*\((.*)\)\s*;?\s*$").expect("valid JSONP regex")
});

/// Bibliographic fields of one search hit, every scalar kept as text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationSummary {
    #[serde(default, deserialize_with = "scalar_text")]
    pub author_string: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub journal_title: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub pub_year: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub journal_volume: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub issue: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub page_info: Option<String>,
}

impl CitationSummary {
    /// `<authors> <title> <journal>. <year>;<volume>(<issue>):<pages>`
    pub fn format(&self) -> String {
        format!(
            "{} {} {}. {};{}({}):{}",
            text(&self.author_string),
            text(&self.title),
            text(&self.journal_title),
            text(&self.pub_year),
            text(&self.journal_volume),
            text(&self.issue),
            text(&self.page_info),
        )
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    result_list: ResultList,
}

#[derive(Debug, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<CitationSummary>,
}

pub trait CitationLookup: Send + Sync {
    fn lookup(&self, pubmed_id: &PubmedId) -> Result<CitationSummary, AdminError>;
}

/// Europe PMC REST search, queried by external id.
#[derive(Clone)]
pub struct EuropePmcClient {
    client: Client,
    search_url: Url,
}

impl EuropePmcClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, AdminError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("dsadmin/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AdminError::CitationHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AdminError::CitationHttp(err.to_string()))?;
        Ok(Self {
            client,
            search_url: config.citation_url.clone(),
        })
    }

    pub fn query_url(&self, pubmed_id: &PubmedId) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("query", &format!("EXT_ID:{}", pubmed_id.as_str()))
            .append_pair("format", "json");
        url
    }
}

impl CitationLookup for EuropePmcClient {
    fn lookup(&self, pubmed_id: &PubmedId) -> Result<CitationSummary, AdminError> {
        let response = self
            .client
            .get(self.query_url(pubmed_id))
            .send()
            .map_err(|err| AdminError::CitationHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "citation request failed".to_string());
            return Err(AdminError::CitationStatus { status, message });
        }
        let body = response
            .text()
            .map_err(|err| AdminError::CitationHttp(err.to_string()))?;
        parse_search_response(&body, pubmed_id)
    }
}

/// Decodes a search response, with or without a JSONP callback wrapper, into its first hit.
pub fn parse_search_response(
    body: &str,
    pubmed_id: &PubmedId,
) -> Result<CitationSummary, AdminError> {
    let json = strip_jsonp(body);
    let response: SearchResponse =
        serde_json::from_str(json).map_err(|err| AdminError::CitationDecode(err.to_string()))?;
    response
        .result_list
        .result
        .into_iter()
        .next()
        .ok_or_else(|| AdminError::CitationMissing(pubmed_id.to_string()))
}

pub fn strip_jsonp(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }
    JSONP_WRAPPER
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str())
        .unwrap_or(trimmed)
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}
