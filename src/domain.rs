use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AdminError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DatasourceType {
    Warehouse,
    Biopax,
    PsiMi,
    PsiMitab,
    Mapping,
}

impl DatasourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasourceType::Warehouse => "WAREHOUSE",
            DatasourceType::Biopax => "BIOPAX",
            DatasourceType::PsiMi => "PSI_MI",
            DatasourceType::PsiMitab => "PSI_MITAB",
            DatasourceType::Mapping => "MAPPING",
        }
    }
}

impl fmt::Display for DatasourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Free,
    Academic,
    Purchase,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Free => "free",
            Availability::Academic => "academic",
            Availability::Purchase => "purchase",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// External publication identifier. The server may send it as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PubmedId(String);

impl PubmedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PubmedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PubmedId {
    type Err = AdminError;

    /// Accepts a bare PMID: ASCII digits, surrounding whitespace ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AdminError::InvalidPubmedId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for PubmedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Scalar::deserialize(deserializer)?.into_text();
        Ok(Self(text.trim().to_string()))
    }
}

/// A JSON scalar that callers want as text regardless of whether it arrived quoted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Scalar::Text(value) => value,
            Scalar::Number(value) => value.to_string(),
            Scalar::Bool(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourceRecord {
    pub identifier: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaner_classname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter_classname: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DatasourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(
        default,
        deserialize_with = "blank_pubmed_id_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub pubmed_id: Option<PubmedId>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: Vec<Value>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
    #[serde(skip)]
    pub uploaded: bool,
}

impl DatasourceRecord {
    /// A record created locally: lower-cased identifier, the identifier as its only name,
    /// and no content.
    pub fn new_local(identifier: &str) -> Self {
        let identifier = identifier.trim().to_lowercase();
        Self {
            name: vec![identifier.clone()],
            identifier,
            ..Self::default()
        }
    }

    pub fn has_identifier(&self, candidate: &str) -> bool {
        same_identifier(&self.identifier, candidate)
    }

    pub fn type_label(&self) -> &'static str {
        self.data_type.map(DatasourceType::as_str).unwrap_or("Null")
    }

    pub fn availability_label(&self) -> &'static str {
        self.availability.map(Availability::as_str).unwrap_or("Null")
    }
}

/// The persistable projection of a record. Client-only fields never reach the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasourcePayload {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaner_classname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converter_classname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub name: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_id: Option<PubmedId>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DatasourceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_to_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_to_homepage: Option<String>,
    pub content: Vec<Value>,
}

impl From<&DatasourceRecord> for DatasourcePayload {
    fn from(record: &DatasourceRecord) -> Self {
        Self {
            identifier: record.identifier.to_lowercase(),
            availability: record.availability,
            cleaner_classname: record.cleaner_classname.clone(),
            converter_classname: record.converter_classname.clone(),
            description: record.description.clone(),
            icon_url: record.icon_url.clone(),
            name: record.name.clone(),
            pubmed_id: record.pubmed_id.clone(),
            data_type: record.data_type,
            url_to_data: record.url_to_data.clone(),
            url_to_homepage: record.url_to_homepage.clone(),
            content: Vec::new(),
        }
    }
}

/// Field replacements for an existing record. Unset fields are left alone; an empty
/// string clears an optional text field.
#[derive(Debug, Clone, Default)]
pub struct RecordEdit {
    pub name: Option<Vec<String>>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub url_to_data: Option<String>,
    pub url_to_homepage: Option<String>,
    pub cleaner_classname: Option<String>,
    pub converter_classname: Option<String>,
    pub data_type: Option<DatasourceType>,
    pub availability: Option<Availability>,
    pub pubmed_id: Option<String>,
}

impl RecordEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.icon_url.is_none()
            && self.url_to_data.is_none()
            && self.url_to_homepage.is_none()
            && self.cleaner_classname.is_none()
            && self.converter_classname.is_none()
            && self.data_type.is_none()
            && self.availability.is_none()
            && self.pubmed_id.is_none()
    }

    /// Validates the edit before touching the record, so a rejected edit changes nothing.
    pub fn apply(&self, record: &mut DatasourceRecord) -> Result<(), AdminError> {
        let pubmed_id = match self.pubmed_id.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(value) => Some(Some(value.parse::<PubmedId>()?)),
        };

        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        replace_text(&mut record.description, &self.description);
        replace_text(&mut record.icon_url, &self.icon_url);
        replace_text(&mut record.url_to_data, &self.url_to_data);
        replace_text(&mut record.url_to_homepage, &self.url_to_homepage);
        replace_text(&mut record.cleaner_classname, &self.cleaner_classname);
        replace_text(&mut record.converter_classname, &self.converter_classname);
        if self.data_type.is_some() {
            record.data_type = self.data_type;
        }
        if self.availability.is_some() {
            record.availability = self.availability;
        }
        if let Some(pubmed_id) = pubmed_id {
            if pubmed_id != record.pubmed_id {
                record.citation = None;
            }
            record.pubmed_id = pubmed_id;
        }
        Ok(())
    }
}

fn replace_text(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = (!value.trim().is_empty()).then(|| value.clone());
    }
}

/// Lower-cases every string and drops duplicates. Iteration order of the result is unspecified.
pub fn canonicalize<I, S>(strings: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    strings
        .into_iter()
        .map(|value| value.as_ref().to_lowercase())
        .collect()
}

pub fn same_identifier(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_pubmed_id_as_none<'de, D>(deserializer: D) -> Result<Option<PubmedId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PubmedId>::deserialize(deserializer)?.filter(|id| !id.as_str().is_empty()))
}
