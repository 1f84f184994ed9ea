//! Document data model for the report wizard
//!
//! Defines the report being edited:
//! - Client identity and delivery contact
//! - Weekly monitoring metrics (per-day counters)
//! - Seven daily narrative entries
//! - Visual theme, media attachments, reporting period
//! - Field and stage identifiers shared by every component

pub mod client;
pub mod entries;
pub mod field;
pub mod media;
pub mod metrics;
pub mod range;
pub mod snapshot;
pub mod theme;

pub use client::{ClientRef, ContactChannel};
pub use entries::{DailyEntries, DailyEntry, DailyEntryPatch, EntryStatus, SeverityCode};
pub use field::{DocumentField, StageId};
pub use media::{MediaAttachment, MediaSet};
pub use metrics::{DayCounters, DayCountersPatch, MetricsPatch, WeeklyMetrics};
pub use range::{DateRange, RangeError};
pub use snapshot::DocumentSnapshot;
pub use theme::{RgbColor, Theme, ThemePatch};
