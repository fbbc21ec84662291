use tracing::{debug, info};

use crate::integrations::github::{IssueTracker, RepoEntry, TrackerResult};

pub const TEMPLATE_DIR: &str = ".github/ISSUE_TEMPLATE";

const TEMPLATE_EXTENSIONS: [&str; 3] = ["md", "yml", "yaml"];

/// Returns the issue body template, or an empty string when none can be read.
pub async fn fetch_template(tracker: &dyn IssueTracker, name: Option<&str>) -> String {
    match try_fetch_template(tracker, name).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            info!("No issue template found in {TEMPLATE_DIR}, using an empty body");
            String::new()
        }
        Err(e) => {
            info!("Could not load issue template from {TEMPLATE_DIR}: {e}");
            String::new()
        }
    }
}

async fn try_fetch_template(
    tracker: &dyn IssueTracker,
    name: Option<&str>,
) -> TrackerResult<Option<String>> {
    let entries = tracker.list_directory(TEMPLATE_DIR).await?;
    let files: Vec<&RepoEntry> = entries.iter().filter(|entry| entry.is_file).collect();

    let Some(file) = select_template(&files, name) else {
        return Ok(None);
    };

    debug!("Using issue template {}", file.path);
    tracker.read_file(&file.path).await.map(Some)
}

/// Exact name or name plus a known extension; otherwise the first listed file.
/// The listing order is whatever the API returns.
fn select_template<'a>(files: &[&'a RepoEntry], name: Option<&str>) -> Option<&'a RepoEntry> {
    let named = name.and_then(|name| {
        files.iter().copied().find(|file| {
            file.name == name
                || TEMPLATE_EXTENSIONS
                    .iter()
                    .any(|ext| file.name == format!("{name}.{ext}"))
        })
    });

    if named.is_none() {
        if let Some(name) = name {
            info!("Issue template {name} not found, falling back to the first template");
        }
    }

    named.or_else(|| files.first().copied())
}
