use indexmap::IndexSet;
use tracing::debug;

use crate::{
    records::Record,
    settings::{FieldMappings, GithubField},
};

const DEFAULT_LABEL_DELIMITER: &str = ",";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    /// Unique label names in discovery order.
    pub labels: IndexSet<String>,
}

/// Builds a draft from one record, starting the body from `template`.
///
/// Mappings apply in configuration order and columns that are missing or
/// empty are ignored, so a later `title` mapping overwrites an earlier one
/// and `body` mappings accumulate separated by a blank line.
pub fn map_record(record: &Record, mappings: &FieldMappings, template: &str) -> IssueDraft {
    let mut draft = IssueDraft {
        body: template.to_string(),
        ..IssueDraft::default()
    };

    for (column, mapping) in mappings {
        let Some(value) = record.get(column).filter(|v| !v.is_empty()) else {
            continue;
        };

        match mapping.github_field {
            GithubField::Title => draft.title = value.clone(),
            GithubField::Label => {
                let delimiter = mapping
                    .delimiter
                    .as_deref()
                    .unwrap_or(DEFAULT_LABEL_DELIMITER);
                draft.labels.extend(split_labels(value, delimiter));
            }
            GithubField::Body => {
                if !draft.body.is_empty() {
                    draft.body.push_str("\n\n");
                }
                draft.body.push_str(value);
            }
            GithubField::Unknown => {
                debug!("Ignoring column {column}: unsupported GitHub field");
            }
        }
    }

    draft
}

fn split_labels<'a>(value: &'a str, delimiter: &'a str) -> impl Iterator<Item = String> + 'a {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}
