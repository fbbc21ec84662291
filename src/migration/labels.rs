use indexmap::IndexSet;
use itertools::Itertools;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::integrations::github::{IssueTracker, TrackerResult};

/// Six hex digits derived from the label name alone.
pub fn label_color(name: &str) -> String {
    Sha256::digest(name.as_bytes())
        .iter()
        .take(3)
        .map(|byte| format!("{byte:02x}"))
        .join("")
}

/// Makes sure every label exists, one at a time and in order.
///
/// The first failing existence check or creation stops the loop and is
/// returned to the caller.
pub async fn ensure_labels(
    tracker: &dyn IssueTracker,
    labels: &IndexSet<String>,
) -> TrackerResult<()> {
    for name in labels {
        if tracker.label_exists(name).await? {
            debug!("Label {name} already exists");
            continue;
        }

        let color = label_color(name);
        tracker.create_label(name, &color).await?;
        info!("Created label {name} (#{color})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{
        github::TrackerError,
        mock::{Call, MockTracker},
    };

    fn set(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn color_is_stable_six_hex_digits() {
        let color = label_color("bug");

        assert_eq!(color.len(), 6);
        assert!(color.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(color, label_color("bug"));
        // sha256("bug") starts with 0xecb53f
        assert_eq!(color, "ecb53f");
    }

    #[test]
    fn color_ignores_other_labels() {
        let alone = label_color("feature");
        let _ = label_color("bug");
        assert_eq!(alone, label_color("feature"));
        assert_ne!(label_color("bug"), label_color("Bug"));
    }

    #[tokio::test]
    async fn creates_only_missing_labels_in_order() {
        let tracker = MockTracker::default().with_label("a");

        ensure_labels(&tracker, &set(&["a", "b", "c"])).await.unwrap();

        assert_eq!(
            tracker.calls(),
            vec![
                Call::LabelExists("a".to_string()),
                Call::LabelExists("b".to_string()),
                Call::CreateLabel {
                    name: "b".to_string(),
                    color: label_color("b"),
                },
                Call::LabelExists("c".to_string()),
                Call::CreateLabel {
                    name: "c".to_string(),
                    color: label_color("c"),
                },
            ]
        );
    }

    #[tokio::test]
    async fn check_failure_stops_and_propagates() {
        let tracker = MockTracker::default().with_broken_label("b");

        let err = ensure_labels(&tracker, &set(&["a", "b", "c"])).await.unwrap_err();

        assert!(matches!(err, TrackerError::Api { status: 403, .. }));
        assert!(!tracker.calls().contains(&Call::LabelExists("c".to_string())));
    }
}
