use crate::config::UploaderConfig;
use crate::error::RenderError;
use crate::gateway::RemoteArtifact;
use crate::session::Session;
use crate::upload::ConversionStatus;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Badge {
    /// A newer upload of an already converted file is in flight.
    Updating,
    /// The latest upload, or the wait for its conversion, failed; the listed artifact is the
    /// previous one.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState {
    Ready {
        download_url: Option<String>,
        html_url: Option<String>,
        size: u64,
        badge: Option<Badge>,
    },
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Converted artifact name, e.g. `notes.md`.
    pub name: String,
    /// Original upload behind this row, when known this session.
    pub source: Option<String>,
    pub state: RowState,
}

/// Merges the converted-directory listing with this session's statuses into a name-sorted list
/// with one row per artifact name.
pub fn project(
    config: &UploaderConfig,
    listing: &[RemoteArtifact],
    statuses: &BTreeMap<String, ConversionStatus>,
) -> Vec<DisplayRow> {
    // converted name -> (original name, status); an in-flight upload wins over older outcomes
    let mut by_artifact: HashMap<String, (&str, &ConversionStatus)> = HashMap::new();
    for (original, status) in statuses {
        let converted = config.converted_name(original);
        let keep_existing = matches!(
            by_artifact.get(&converted),
            Some((_, ConversionStatus::Uploading))
        );
        if !keep_existing {
            by_artifact.insert(converted, (original.as_str(), status));
        }
    }

    let mut rows: BTreeMap<String, DisplayRow> = BTreeMap::new();

    for artifact in listing
        .iter()
        .filter(|a| a.is_file() && !a.is_sentinel())
    {
        let tracked = by_artifact.get(&artifact.name);
        let badge = match tracked {
            Some((_, ConversionStatus::Uploading)) => Some(Badge::Updating),
            Some((_, ConversionStatus::Error(reason))) => Some(Badge::Failed {
                reason: reason.clone(),
            }),
            _ => None,
        };
        rows.entry(artifact.name.clone()).or_insert_with(|| DisplayRow {
            name: artifact.name.clone(),
            source: tracked.map(|(original, _)| original.to_string()),
            state: RowState::Ready {
                download_url: artifact.download_url.clone(),
                html_url: artifact.html_url.clone(),
                size: artifact.size,
                badge,
            },
        });
    }

    for (converted, (original, status)) in &by_artifact {
        if **status == ConversionStatus::Uploading && !rows.contains_key(converted) {
            rows.insert(
                converted.clone(),
                DisplayRow {
                    name: converted.clone(),
                    source: Some(original.to_string()),
                    state: RowState::Pending,
                },
            );
        }
    }

    rows.into_values().collect()
}

/// Fetches the converted directory and projects it against the session's statuses.
#[derive(Clone)]
pub struct ViewRenderer {
    session: Arc<Session>,
}

impl ViewRenderer {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub async fn render(&self) -> Result<Vec<DisplayRow>, RenderError> {
        let gateway = self.session.gateway()?;
        let config = self.session.config();
        let listing = gateway.list_directory(&config.converted_dir).await?;
        let statuses = self.session.statuses().snapshot();
        Ok(project(config, &listing, &statuses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn artifact(name: &str, kind: &str) -> RemoteArtifact {
        RemoteArtifact {
            name: name.to_string(),
            path: format!("converted/{}", name),
            sha: "abc".to_string(),
            size: 42,
            kind: kind.to_string(),
            download_url: Some(format!("https://raw.example/{}", name)),
            html_url: Some(format!("https://github.example/{}", name)),
            content: None,
        }
    }

    fn statuses(entries: &[(&str, ConversionStatus)]) -> BTreeMap<String, ConversionStatus> {
        entries
            .iter()
            .map(|(name, status)| (name.to_string(), status.clone()))
            .collect()
    }

    fn names(rows: &[DisplayRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn sorts_and_drops_sentinels_and_directories() {
        let config = UploaderConfig::default();
        let listing = vec![
            artifact("zeta.md", "file"),
            artifact(".gitkeep", "file"),
            artifact("alpha.md", "file"),
            artifact("archive", "dir"),
        ];

        let rows = project(&config, &listing, &BTreeMap::new());
        assert_eq!(names(&rows), vec!["alpha.md", "zeta.md"]);
        assert!(rows.iter().all(|r| matches!(
            r.state,
            RowState::Ready { badge: None, .. }
        )));
    }

    #[test]
    fn pending_uploads_appear_until_listed() {
        let config = UploaderConfig::default();
        let map = statuses(&[
            ("notes.docx", ConversionStatus::Uploading),
            ("draft.docx", ConversionStatus::Timeout),
            ("broken.docx", ConversionStatus::Error("422".to_string())),
        ]);

        let rows = project(&config, &[artifact("minutes.md", "file")], &map);
        assert_eq!(names(&rows), vec!["minutes.md", "notes.md"]);
        assert_eq!(rows[1].state, RowState::Pending);
        assert_eq!(rows[1].source.as_deref(), Some("notes.docx"));
    }

    #[test]
    fn listed_artifacts_carry_badges_from_statuses() {
        let config = UploaderConfig::default();
        let map = statuses(&[
            ("a.docx", ConversionStatus::Completed),
            ("b.docx", ConversionStatus::Uploading),
            ("c.docx", ConversionStatus::Error("boom".to_string())),
        ]);
        let listing = vec![
            artifact("c.md", "file"),
            artifact("b.md", "file"),
            artifact("a.md", "file"),
        ];

        let badges: Vec<Option<Badge>> = project(&config, &listing, &map)
            .into_iter()
            .map(|row| match row.state {
                RowState::Ready { badge, .. } => badge,
                RowState::Pending => panic!("listed artifact rendered as pending"),
            })
            .collect();
        assert_eq!(
            badges,
            vec![
                None,
                Some(Badge::Updating),
                Some(Badge::Failed {
                    reason: "boom".to_string()
                })
            ]
        );
    }

    #[test]
    fn same_stem_collapses_to_one_row() {
        let config = UploaderConfig::default();
        let map = statuses(&[
            ("plan.doc", ConversionStatus::Uploading),
            ("plan.docx", ConversionStatus::Completed),
        ]);

        let rows = project(&config, &[artifact("plan.md", "file")], &map);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source.as_deref(), Some("plan.doc"));
    }

    #[test]
    fn projection_is_idempotent() {
        let config = UploaderConfig::default();
        let map = statuses(&[("x.docx", ConversionStatus::Uploading)]);
        let listing = vec![artifact("y.md", "file"), artifact("w.md", "file")];

        let first = project(&config, &listing, &map);
        let second = project(&config, &listing, &map);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_inputs_render_nothing() {
        let rows = project(&UploaderConfig::default(), &[], &BTreeMap::new());
        assert!(rows.is_empty());
    }
}
