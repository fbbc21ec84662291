use itertools::Itertools;
use tracing::{error, info, warn};

use crate::{
    integrations::github::{IssueTracker, TrackerError},
    records::Record,
    settings::Settings,
};

mod labels;
mod mapper;
mod retry;
pub mod template;

pub use self::{
    labels::ensure_labels,
    mapper::{map_record, IssueDraft},
    retry::{create_with_retry, IssueOutcome},
    template::fetch_template,
};

#[derive(Debug)]
pub enum RecordOutcome {
    /// No title could be derived; nothing was sent.
    Skipped,
    /// Dry run: the draft was only logged.
    Previewed(IssueDraft),
    LabelsFailed(TrackerError),
    Issue(IssueOutcome),
}

/// Runs one import over a set of records, strictly in order.
pub struct Migration<'a> {
    settings: &'a Settings,
    tracker: &'a dyn IssueTracker,
    dry_run: bool,
}

impl<'a> Migration<'a> {
    pub fn new(settings: &'a Settings, tracker: &'a dyn IssueTracker) -> Self {
        Self {
            settings,
            tracker,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self, records: &[Record]) {
        let template = fetch_template(
            self.tracker,
            self.settings.github.issue_template.as_deref(),
        )
        .await;

        for (index, record) in records.iter().enumerate() {
            self.migrate_record(index + 1, record, &template).await;
        }

        info!("Migration completed");
    }

    pub async fn migrate_record(
        &self,
        row: usize,
        record: &Record,
        template: &str,
    ) -> RecordOutcome {
        let draft = map_record(record, &self.settings.field_mapping, template);

        if draft.title.is_empty() {
            warn!("Skipping row {row} without a title: {record:?}");
            return RecordOutcome::Skipped;
        }

        if self.dry_run {
            info!(
                "[dry run] Would create issue \"{}\" with labels [{}] and a {} byte body",
                draft.title,
                draft.labels.iter().join(", "),
                draft.body.len()
            );
            return RecordOutcome::Previewed(draft);
        }

        // A failed label check aborts this record only; the run goes on.
        if let Err(e) = ensure_labels(self.tracker, &draft.labels).await {
            error!(
                "Could not ensure labels for issue \"{}\", skipping it: {e}",
                draft.title
            );
            return RecordOutcome::LabelsFailed(e);
        }

        let outcome = create_with_retry(self.tracker, &draft, &self.settings.retry).await;
        RecordOutcome::Issue(outcome)
    }
}
