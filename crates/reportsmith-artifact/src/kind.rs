//! Artifact kinds and their declared inputs

use reportsmith_model::DocumentField;
use serde::{Deserialize, Serialize};

/// The derived artifacts the pipeline manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Metrics chart raster
    Chart,
    /// Full rendered preview snapshot
    Preview,
}

impl ArtifactKind {
    /// Both kinds, chart first (the preview embeds the chart)
    pub const ALL: [Self; 2] = [Self::Chart, Self::Preview];

    /// Document fields that feed this artifact's fingerprint
    ///
    /// A change to any listed field invalidates the artifact; changes to
    /// unlisted fields never do.
    #[must_use]
    pub fn declared_inputs(self) -> &'static [DocumentField] {
        match self {
            Self::Chart => &[DocumentField::Metrics, DocumentField::Theme],
            Self::Preview => &[
                DocumentField::Client,
                DocumentField::Metrics,
                DocumentField::DailyEntries,
                DocumentField::Notes,
                DocumentField::Signature,
                DocumentField::ContactChannel,
                DocumentField::Theme,
                DocumentField::Media,
                DocumentField::DateRange,
                DocumentField::ChartRaster,
            ],
        }
    }

    /// True when a change to `field` invalidates this artifact
    #[inline]
    #[must_use]
    pub fn depends_on(self, field: DocumentField) -> bool {
        self.declared_inputs().contains(&field)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Chart => "chart",
            Self::Preview => "preview",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_depends_only_on_metrics_and_theme() {
        assert!(ArtifactKind::Chart.depends_on(DocumentField::Metrics));
        assert!(ArtifactKind::Chart.depends_on(DocumentField::Theme));
        assert!(!ArtifactKind::Chart.depends_on(DocumentField::Client));
        assert!(!ArtifactKind::Chart.depends_on(DocumentField::DailyEntries));
        assert!(!ArtifactKind::Chart.depends_on(DocumentField::ChartRaster));
    }

    #[test]
    fn preview_depends_on_chart_raster() {
        assert!(ArtifactKind::Preview.depends_on(DocumentField::ChartRaster));
    }

    #[test]
    fn preview_inputs_cover_every_field() {
        // Preview reads everything, including the derived chart.
        assert_eq!(
            ArtifactKind::Preview.declared_inputs().len(),
            DocumentField::ALL.len()
        );
    }
}
