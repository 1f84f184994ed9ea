//! Field and stage identifiers
//!
//! [`DocumentField`] names each top-level slot of canonical state; it is the
//! payload of change notifications and the vocabulary of artifact input
//! declarations. [`StageId`] names the wizard stages in editing order.

use serde::{Deserialize, Serialize};

/// Top-level fields of the canonical document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    /// Selected client
    Client,
    /// Weekly metrics
    Metrics,
    /// Seven daily narratives
    DailyEntries,
    /// Free-form notes
    Notes,
    /// Sign-off signature
    Signature,
    /// Delivery contact channel
    ContactChannel,
    /// Visual theme
    Theme,
    /// Media attachments
    Media,
    /// Reporting period
    DateRange,
    /// Derived chart raster (in-memory only, never persisted)
    ChartRaster,
}

impl DocumentField {
    /// All fields, in a stable order
    pub const ALL: [Self; 10] = [
        Self::Client,
        Self::Metrics,
        Self::DailyEntries,
        Self::Notes,
        Self::Signature,
        Self::ContactChannel,
        Self::Theme,
        Self::Media,
        Self::DateRange,
        Self::ChartRaster,
    ];

    /// Durable-store key for this field
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Client => "report.client",
            Self::Metrics => "report.metrics",
            Self::DailyEntries => "report.daily_entries",
            Self::Notes => "report.notes",
            Self::Signature => "report.signature",
            Self::ContactChannel => "report.contact_channel",
            Self::Theme => "report.theme",
            Self::Media => "report.media",
            Self::DateRange => "report.date_range",
            Self::ChartRaster => "report.chart_raster",
        }
    }
}

impl std::fmt::Display for DocumentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key().trim_start_matches("report."))
    }
}

/// Wizard stages, in editing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    /// Choose the client
    Client,
    /// Enter weekly metrics
    Metrics,
    /// Write daily narratives
    Narratives,
    /// Attach media
    Media,
    /// Adjust the visual theme
    Theme,
    /// Delivery settings
    Delivery,
    /// Rendered preview
    Preview,
    /// Paginated export
    Export,
}

impl StageId {
    /// All stages, first to last
    pub const ALL: [Self; 8] = [
        Self::Client,
        Self::Metrics,
        Self::Narratives,
        Self::Media,
        Self::Theme,
        Self::Delivery,
        Self::Preview,
        Self::Export,
    ];

    /// Position in editing order, zero-based
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

impl std::fmt::Display for StageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Client => "client",
            Self::Metrics => "metrics",
            Self::Narratives => "narratives",
            Self::Media => "media",
            Self::Theme => "theme",
            Self::Delivery => "delivery",
            Self::Preview => "preview",
            Self::Export => "export",
        };
        f.write_str(name)
    }
}
