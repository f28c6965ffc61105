use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::BaseDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::AdminError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
pub const DEFAULT_CITATION_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest/search";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONFIG_FILE_NAME: &str = "dsadmin.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub citation_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub citations: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: Url,
    pub citation_url: Url,
    pub timeout: Duration,
    pub citations: bool,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist. Without one, `dsadmin.json` in the current directory is
    /// tried, then the user config directory, then built-in defaults.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, AdminError> {
        let config = match path {
            Some(path) => {
                let config_path = PathBuf::from(path);
                if !config_path.exists() {
                    return Err(AdminError::MissingConfig(config_path));
                }
                Self::read(config_path)?
            }
            None => match Self::default_locations().into_iter().find(|p| p.exists()) {
                Some(config_path) => Self::read(config_path)?,
                None => Config::default(),
            },
        };

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, AdminError> {
        let base_url = parse_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let citation_url = parse_url(
            config
                .citation_url
                .as_deref()
                .unwrap_or(DEFAULT_CITATION_URL),
        )?;

        Ok(ResolvedConfig {
            base_url,
            citation_url,
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            citations: config.citations.unwrap_or(true),
        })
    }

    fn read(config_path: PathBuf) -> Result<Config, AdminError> {
        let content = fs::read_to_string(&config_path)
            .map_err(|_| AdminError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| AdminError::ConfigParse(err.to_string()))
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = BaseDirs::new() {
            locations.push(dirs.config_dir().join("dsadmin").join("config.json"));
        }
        locations
    }
}

impl ResolvedConfig {
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AdminError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }
}

/// Relative endpoint paths are joined onto the base URL, so it must end with a slash.
pub fn parse_base_url(value: &str) -> Result<Url, AdminError> {
    let trimmed = value.trim();
    if trimmed.ends_with('/') {
        parse_url(trimmed)
    } else {
        parse_url(&format!("{trimmed}/"))
    }
}

fn parse_url(value: &str) -> Result<Url, AdminError> {
    Url::parse(value.trim()).map_err(|err| AdminError::InvalidUrl {
        url: value.to_string(),
        message: err.to_string(),
    })
}
