use std::{env, path::Path};

use config::{Config, ConfigError, File, FileFormat};
use indexmap::IndexMap;
use serde_derive::Deserialize;
use tracing::{debug, info};

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Target of a column. Unrecognized names become `Unknown` instead of failing.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "String")]
pub enum GithubField {
    Title,
    Label,
    Body,
    Unknown,
}

impl From<String> for GithubField {
    fn from(field: String) -> Self {
        match field.as_str() {
            "title" => Self::Title,
            "label" => Self::Label,
            "body" => Self::Body,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub github_field: GithubField,
    pub delimiter: Option<String>,
}

impl FieldMapping {
    pub fn new(github_field: GithubField) -> Self {
        Self {
            github_field,
            delimiter: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = Some(delimiter.to_string());
        self
    }
}

/// Column name to mapping, in configuration order.
pub type FieldMappings = IndexMap<String, FieldMapping>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Github {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub issue_template: Option<String>,
    /// API root for GitHub Enterprise; api.github.com when unset.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub github: Github,
    pub field_mapping: FieldMappings,
    pub retry: RetryPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        let field_mapping = [
            ("Name", FieldMapping::new(GithubField::Title)),
            (
                "Tags",
                FieldMapping::new(GithubField::Label).with_delimiter(","),
            ),
            ("Description", FieldMapping::new(GithubField::Body)),
        ]
        .into_iter()
        .map(|(column, mapping)| (column.to_string(), mapping))
        .collect();

        Self {
            github: Github {
                token: env::var(TOKEN_ENV).unwrap_or_default(),
                ..Github::default()
            },
            field_mapping,
            retry: RetryPolicy::default(),
        }
    }
}

/// Shape of the configuration file; every key is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    github: Option<GithubFile>,
    field_mapping: Option<FieldMappings>,
    retry: Option<RetryFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RetryFile {
    max_attempts: Option<LooseNumber>,
    delay_ms: Option<LooseNumber>,
}

/// Retry values are taken as written; nothing here rejects the file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Negative values clamp to zero; text that is not a number yields `None`.
    fn to_u64(&self) -> Option<u64> {
        let value = match self {
            Self::Int(n) => return Some((*n).max(0).unsigned_abs()),
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        // NaN and negatives saturate to 0
        Some(value as u64)
    }
}

impl RetryFile {
    fn into_policy(self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        let max_attempts = self
            .max_attempts
            .as_ref()
            .and_then(LooseNumber::to_u64)
            .map_or(defaults.max_attempts, |n| {
                u32::try_from(n).unwrap_or(u32::MAX)
            });
        let delay_ms = self
            .delay_ms
            .as_ref()
            .and_then(LooseNumber::to_u64)
            .unwrap_or(defaults.delay_ms);

        RetryPolicy {
            max_attempts,
            delay_ms,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GithubFile {
    token: Option<String>,
    owner: Option<String>,
    repo: Option<String>,
    issue_template: Option<String>,
    api_url: Option<String>,
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let Some(path) = path else {
            debug!("No configuration file given, using defaults");
            return Ok(defaults);
        };

        if !path.is_file() {
            info!(
                "Configuration file {} not found, using defaults",
                path.display()
            );
            return Ok(defaults);
        }

        debug!("Loading configuration file {}", path.display());

        let file: SettingsFile = Config::builder()
            .add_source(
                File::new(&path.to_string_lossy(), FileFormat::Json).required(false),
            )
            .build()?
            .try_deserialize()?;

        Ok(defaults.merge(file))
    }

    /// Top-level keys replace the defaults; only `github` merges per field.
    fn merge(self, file: SettingsFile) -> Self {
        let mut github = self.github;
        if let Some(overlay) = file.github {
            if let Some(token) = overlay.token {
                github.token = token;
            }
            if let Some(owner) = overlay.owner {
                github.owner = owner;
            }
            if let Some(repo) = overlay.repo {
                github.repo = repo;
            }
            if overlay.issue_template.is_some() {
                github.issue_template = overlay.issue_template;
            }
            if overlay.api_url.is_some() {
                github.api_url = overlay.api_url;
            }
        }

        Self {
            github,
            field_mapping: file.field_mapping.unwrap_or(self.field_mapping),
            retry: file.retry.map_or(self.retry, RetryFile::into_policy),
        }
    }
}
