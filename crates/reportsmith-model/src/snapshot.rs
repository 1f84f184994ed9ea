//! Point-in-time copy of the document

use crate::client::{ClientRef, ContactChannel};
use crate::entries::DailyEntries;
use crate::media::MediaSet;
use crate::metrics::WeeklyMetrics;
use crate::range::DateRange;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};

/// Owned copy of every durable document field at one instant
///
/// Snapshots are what stage predicates, artifact fingerprints, and the
/// exporter read; they never alias live state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Selected client, if any
    pub client: Option<ClientRef>,
    /// Weekly metrics
    pub metrics: WeeklyMetrics,
    /// Seven daily narratives
    pub daily_entries: DailyEntries,
    /// Free-form notes
    pub notes: String,
    /// Sign-off signature
    pub signature: String,
    /// Delivery contact channel
    pub contact_channel: ContactChannel,
    /// Visual theme
    pub theme: Theme,
    /// Media attachments
    pub media: MediaSet,
    /// Reporting period
    pub date_range: DateRange,
}

impl DocumentSnapshot {
    /// True once a client has been selected
    #[inline]
    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }
}
