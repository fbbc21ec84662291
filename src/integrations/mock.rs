use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;

use crate::{
    integrations::github::{IssueTracker, RepoEntry, TrackerError, TrackerResult},
    migration::{template::TEMPLATE_DIR, IssueDraft},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDirectory(String),
    ReadFile(String),
    LabelExists(String),
    CreateLabel { name: String, color: String },
    CreateIssue(IssueDraft),
}

/// In-memory tracker that records every call it receives.
#[derive(Debug, Default)]
pub struct MockTracker {
    entries: Vec<RepoEntry>,
    files: HashMap<String, String>,
    no_template_dir: bool,
    labels: Mutex<HashSet<String>>,
    broken_labels: HashSet<String>,
    issue_failures: Mutex<VecDeque<u16>>,
    always_fail: Option<u16>,
    calls: Mutex<Vec<Call>>,
}

fn status_error(status: u16) -> TrackerError {
    match status {
        404 => TrackerError::NotFound,
        422 => TrackerError::Unprocessable("Validation Failed".to_string()),
        status => TrackerError::Api {
            status,
            message: "mock failure".to_string(),
        },
    }
}

impl MockTracker {
    pub fn with_entry(mut self, entry: RepoEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_template(mut self, name: &str, content: &str) -> Self {
        let path = format!("{TEMPLATE_DIR}/{name}");
        self.files.insert(path.clone(), content.to_string());
        self.with_entry(RepoEntry {
            name: name.to_string(),
            path,
            is_file: true,
        })
    }

    pub fn without_template_dir(mut self) -> Self {
        self.no_template_dir = true;
        self
    }

    pub fn with_label(self, name: &str) -> Self {
        self.labels.lock().unwrap().insert(name.to_string());
        self
    }

    /// Existence checks for `name` fail with 403.
    pub fn with_broken_label(mut self, name: &str) -> Self {
        self.broken_labels.insert(name.to_string());
        self
    }

    /// Issue creation fails with these statuses, in order, then succeeds.
    pub fn failing_issues(self, statuses: &[u16]) -> Self {
        self.issue_failures.lock().unwrap().extend(statuses);
        self
    }

    pub fn always_failing_issues(mut self, status: u16) -> Self {
        self.always_fail = Some(status);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn issue_attempts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::CreateIssue(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    async fn list_directory(&self, path: &str) -> TrackerResult<Vec<RepoEntry>> {
        self.record(Call::ListDirectory(path.to_string()));
        if self.no_template_dir {
            return Err(TrackerError::NotFound);
        }
        Ok(self.entries.clone())
    }

    async fn read_file(&self, path: &str) -> TrackerResult<String> {
        self.record(Call::ReadFile(path.to_string()));
        self.files.get(path).cloned().ok_or(TrackerError::NotFound)
    }

    async fn label_exists(&self, name: &str) -> TrackerResult<bool> {
        self.record(Call::LabelExists(name.to_string()));
        if self.broken_labels.contains(name) {
            return Err(status_error(403));
        }
        Ok(self.labels.lock().unwrap().contains(name))
    }

    async fn create_label(&self, name: &str, color: &str) -> TrackerResult<()> {
        self.record(Call::CreateLabel {
            name: name.to_string(),
            color: color.to_string(),
        });
        self.labels.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn create_issue(&self, draft: &IssueDraft) -> TrackerResult<String> {
        self.record(Call::CreateIssue(draft.clone()));
        if let Some(status) = self.always_fail {
            return Err(status_error(status));
        }
        if let Some(status) = self.issue_failures.lock().unwrap().pop_front() {
            return Err(status_error(status));
        }
        Ok(format!(
            "https://github.com/acme/app/issues/{}",
            self.issue_attempts()
        ))
    }
}
