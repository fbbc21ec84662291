use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::{
    integrations::github::{IssueTracker, TrackerError},
    migration::IssueDraft,
    settings::RetryPolicy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    Created { url: String, attempts: u32 },
    /// The API refused the request as unprocessable; never retried.
    Rejected { reason: String },
    Exhausted { attempts: u32, last_error: String },
}

/// Submits the draft, retrying transient failures after a fixed delay.
///
/// At least one attempt is always made, even when `max_attempts` is zero.
pub async fn create_with_retry(
    tracker: &dyn IssueTracker,
    draft: &IssueDraft,
    policy: &RetryPolicy,
) -> IssueOutcome {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match tracker.create_issue(draft).await {
            Ok(url) => {
                info!("Created issue \"{}\": {url}", draft.title);
                return IssueOutcome::Created {
                    url,
                    attempts: attempt,
                };
            }
            Err(TrackerError::Unprocessable(reason)) => {
                error!("GitHub rejected issue \"{}\": {reason}", draft.title);
                return IssueOutcome::Rejected { reason };
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    "Attempt {attempt}/{max_attempts} to create issue \"{}\" failed: {e}; retrying in {}ms",
                    draft.title, policy.delay_ms
                );
                sleep(Duration::from_millis(policy.delay_ms)).await;
                attempt += 1;
            }
            Err(e) => {
                error!(
                    "Failed to create issue \"{}\" after {attempt} attempts: {e}",
                    draft.title
                );
                return IssueOutcome::Exhausted {
                    attempts: attempt,
                    last_error: e.to_string(),
                };
            }
        }
    }
}
