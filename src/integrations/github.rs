use async_trait::async_trait;
use itertools::Itertools;
use octocrab::Octocrab;
use thiserror::Error;
use tracing::debug;

use crate::{migration::IssueDraft, settings::Github};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("not found")]
    NotFound,
    #[error("unprocessable entity: {0}")]
    Unprocessable(String),
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("GitHub client error: {0}")]
    Client(#[source] octocrab::Error),
}

impl From<octocrab::Error> for TrackerError {
    fn from(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { source, .. } = &err {
            let message = source.message.clone();
            return match source.status_code.as_u16() {
                404 => Self::NotFound,
                422 => Self::Unprocessable(message),
                status => Self::Api { status, message },
            };
        }
        Self::Client(err)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// octocrab splices path parameters into the URI verbatim.
fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Encodes each segment of a repository path, keeping the `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/').map(encode_segment).join("/")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub path: String,
    pub is_file: bool,
}

/// The slice of the issue tracker API the migration consumes.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn list_directory(&self, path: &str) -> TrackerResult<Vec<RepoEntry>>;
    async fn read_file(&self, path: &str) -> TrackerResult<String>;
    async fn label_exists(&self, name: &str) -> TrackerResult<bool>;
    async fn create_label(&self, name: &str, color: &str) -> TrackerResult<()>;
    /// Returns the URL of the created issue.
    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<String>;
}

pub struct GithubTracker {
    octo: Octocrab,
    owner: String,
    repo: String,
}

impl GithubTracker {
    pub fn new(cfg: &Github) -> anyhow::Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(api_url) = &cfg.api_url {
            debug!("Using GitHub API at {api_url}");
            builder = builder.base_uri(api_url.as_str())?;
        }
        let octo = builder.personal_token(cfg.token.clone()).build()?;

        Ok(Self {
            octo,
            owner: cfg.owner.clone(),
            repo: cfg.repo.clone(),
        })
    }
}

#[async_trait]
impl IssueTracker for GithubTracker {
    async fn list_directory(&self, path: &str) -> TrackerResult<Vec<RepoEntry>> {
        let items = self
            .octo
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(encode_path(path))
            .send()
            .await?;

        Ok(items
            .items
            .into_iter()
            .map(|item| RepoEntry {
                is_file: item.r#type == "file",
                name: item.name,
                path: item.path,
            })
            .collect())
    }

    async fn read_file(&self, path: &str) -> TrackerResult<String> {
        let items = self
            .octo
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(encode_path(path))
            .send()
            .await?;

        Ok(items
            .items
            .into_iter()
            .next()
            .and_then(|content| content.decoded_content())
            .unwrap_or_default())
    }

    async fn label_exists(&self, name: &str) -> TrackerResult<bool> {
        let label = self
            .octo
            .issues(&self.owner, &self.repo)
            .get_label(encode_segment(name))
            .await;

        match label {
            Ok(_) => Ok(true),
            Err(err) => match TrackerError::from(err) {
                TrackerError::NotFound => Ok(false),
                err => Err(err),
            },
        }
    }

    async fn create_label(&self, name: &str, color: &str) -> TrackerResult<()> {
        debug!("Creating label {name} with color #{color}");
        self.octo
            .issues(&self.owner, &self.repo)
            .create_label(name, color, "")
            .await?;
        Ok(())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<String> {
        let issue = self
            .octo
            .issues(&self.owner, &self.repo)
            .create(&draft.title)
            .body(&draft.body)
            .labels(draft.labels.iter().cloned().collect::<Vec<_>>())
            .send()
            .await?;

        Ok(issue.html_url.to_string())
    }
}
