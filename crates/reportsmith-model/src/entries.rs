//! Daily narrative entries
//!
//! A report always carries exactly seven entries, one per day of week.
//! [`DailyEntries`] enforces that by construction; there is no way to add
//! or remove a day.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Review state of one day's narrative
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Nothing written yet
    #[default]
    Pending,
    /// Narrative drafted, not yet reviewed
    Drafted,
    /// Reviewed and locked for export
    Reviewed,
}

/// Severity of the most significant event of the day
///
/// The four levels match the monitoring platform's threat grading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityCode {
    /// Routine activity only
    #[default]
    Low,
    /// Noteworthy but contained
    Medium,
    /// Required operator intervention
    High,
    /// Required dispatch or police involvement
    Critical,
}

/// One day's narrative record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntry {
    /// Day of week this entry covers
    pub day: Weekday,
    /// Free-text narrative
    pub narrative: String,
    /// Review state
    pub status: EntryStatus,
    /// Severity grade for the day
    pub severity: SeverityCode,
}

impl DailyEntry {
    fn empty(day: Weekday) -> Self {
        Self {
            day,
            narrative: String::new(),
            status: EntryStatus::default(),
            severity: SeverityCode::default(),
        }
    }
}

/// Sparse update for one day's entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntryPatch {
    /// New narrative text, if changed
    pub narrative: Option<String>,
    /// New review state, if changed
    pub status: Option<EntryStatus>,
    /// New severity grade, if changed
    pub severity: Option<SeverityCode>,
}

impl DailyEntryPatch {
    /// Patch only the narrative text
    #[must_use]
    pub fn narrative(text: impl Into<String>) -> Self {
        Self {
            narrative: Some(text.into()),
            ..Self::default()
        }
    }
}

/// The seven narrative entries of one report
///
/// # Invariants
/// - Always exactly seven records, Monday first
/// - Each record's `day` matches its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyEntries([DailyEntry; 7]);

impl DailyEntries {
    const DAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Entry for a given day
    #[inline]
    #[must_use]
    pub fn entry(&self, day: Weekday) -> &DailyEntry {
        &self.0[day.num_days_from_monday() as usize]
    }

    /// Apply a sparse patch to one day's entry
    pub fn apply(&mut self, day: Weekday, patch: DailyEntryPatch) {
        let entry = &mut self.0[day.num_days_from_monday() as usize];
        if let Some(text) = patch.narrative {
            entry.narrative = text;
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(severity) = patch.severity {
            entry.severity = severity;
        }
    }

    /// Iterate entries Monday through Sunday
    pub fn iter(&self) -> impl Iterator<Item = &DailyEntry> {
        self.0.iter()
    }

    /// True if at least one entry has moved past [`EntryStatus::Pending`]
    #[must_use]
    pub fn any_written(&self) -> bool {
        self.0.iter().any(|e| e.status != EntryStatus::Pending)
    }

    /// Highest severity across the week
    #[must_use]
    pub fn peak_severity(&self) -> SeverityCode {
        self.0
            .iter()
            .map(|e| e.severity)
            .max()
            .unwrap_or_default()
    }
}

impl Default for DailyEntries {
    fn default() -> Self {
        Self(Self::DAYS.map(DailyEntry::empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_seven_days_in_order() {
        let entries = DailyEntries::default();
        let days: Vec<Weekday> = entries.iter().map(|e| e.day).collect();
        assert_eq!(days, DailyEntries::DAYS);
    }

    #[test]
    fn apply_patches_only_named_fields() {
        let mut entries = DailyEntries::default();
        entries.apply(
            Weekday::Wed,
            DailyEntryPatch {
                narrative: Some("Perimeter breach at 02:14, resolved.".to_string()),
                status: Some(EntryStatus::Drafted),
                severity: None,
            },
        );

        let wed = entries.entry(Weekday::Wed);
        assert_eq!(wed.status, EntryStatus::Drafted);
        assert_eq!(wed.severity, SeverityCode::Low);
        assert_eq!(entries.entry(Weekday::Thu).status, EntryStatus::Pending);
    }

    #[test]
    fn any_written_reflects_status() {
        let mut entries = DailyEntries::default();
        assert!(!entries.any_written());
        entries.apply(
            Weekday::Mon,
            DailyEntryPatch {
                status: Some(EntryStatus::Reviewed),
                ..DailyEntryPatch::default()
            },
        );
        assert!(entries.any_written());
    }

    #[test]
    fn peak_severity_takes_maximum() {
        let mut entries = DailyEntries::default();
        entries.apply(
            Weekday::Fri,
            DailyEntryPatch {
                severity: Some(SeverityCode::High),
                ..DailyEntryPatch::default()
            },
        );
        entries.apply(
            Weekday::Sat,
            DailyEntryPatch {
                severity: Some(SeverityCode::Medium),
                ..DailyEntryPatch::default()
            },
        );
        assert_eq!(entries.peak_severity(), SeverityCode::High);
    }

    #[test]
    fn serde_round_trip() {
        let mut entries = DailyEntries::default();
        entries.apply(Weekday::Tue, DailyEntryPatch::narrative("quiet night"));
        let json = serde_json::to_string(&entries).unwrap();
        let decoded: DailyEntries = serde_json::from_str(&json).unwrap();
        assert_eq!(entries, decoded);
    }
}
