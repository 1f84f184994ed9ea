//! Typed bus events

use chrono::Weekday;
use reportsmith_artifact::ArtifactKind;
use reportsmith_model::{DailyEntryPatch, DocumentField, MetricsPatch, StageId, ThemePatch};
use serde::{Deserialize, Serialize};

/// A sparse edit published by a decoupled collaborator
///
/// Collaborators (the suggestion assistant, the upload widget, the theme
/// editor) publish these instead of mutating canonical state directly;
/// the facade applies them, which in turn emits [`BusEvent::FieldChanged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum FieldPatch {
    /// Edit one day's narrative entry
    DailyEntry {
        /// Day being edited
        day: Weekday,
        /// Sparse entry update
        patch: DailyEntryPatch,
    },
    /// Edit weekly metrics
    Metrics {
        /// Sparse metrics update
        patch: MetricsPatch,
    },
    /// Edit the theme
    Theme {
        /// Sparse theme update
        patch: ThemePatch,
    },
}

/// Events carried by the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BusEvent {
    /// A canonical field now holds a new value
    FieldChanged {
        /// Field that changed
        field: DocumentField,
    },
    /// A collaborator requests an edit to canonical state
    EditRequested {
        /// The requested edit
        patch: FieldPatch,
    },
    /// A stage transition is about to happen; subscribers get one
    /// synchronous turn to flush pending edits into canonical state
    NavigationRequested {
        /// Stage being left
        from: StageId,
        /// Stage being entered
        to: StageId,
    },
    /// A field feeding an artifact's fingerprint changed
    RegenerationNeeded {
        /// Artifact to regenerate
        kind: ArtifactKind,
    },
    /// An artifact finished generating and may be re-read
    ArtifactReady {
        /// Artifact that became ready
        kind: ArtifactKind,
    },
    /// An artifact capture pass failed (transient, retryable)
    ArtifactFailed {
        /// Artifact whose pass failed
        kind: ArtifactKind,
        /// Human-readable reason for the notice
        reason: String,
    },
}

/// Subscription topics, one per event family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// [`BusEvent::FieldChanged`]
    FieldChanged,
    /// [`BusEvent::EditRequested`]
    EditRequested,
    /// [`BusEvent::NavigationRequested`]
    NavigationRequested,
    /// [`BusEvent::RegenerationNeeded`]
    RegenerationNeeded,
    /// [`BusEvent::ArtifactReady`]
    ArtifactReady,
    /// [`BusEvent::ArtifactFailed`]
    ArtifactFailed,
}

impl BusEvent {
    /// Topic this event is delivered on
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::FieldChanged { .. } => Topic::FieldChanged,
            Self::EditRequested { .. } => Topic::EditRequested,
            Self::NavigationRequested { .. } => Topic::NavigationRequested,
            Self::RegenerationNeeded { .. } => Topic::RegenerationNeeded,
            Self::ArtifactReady { .. } => Topic::ArtifactReady,
            Self::ArtifactFailed { .. } => Topic::ArtifactFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_matches_event_family() {
        let event = BusEvent::FieldChanged {
            field: DocumentField::Metrics,
        };
        assert_eq!(event.topic(), Topic::FieldChanged);

        let event = BusEvent::NavigationRequested {
            from: StageId::Client,
            to: StageId::Metrics,
        };
        assert_eq!(event.topic(), Topic::NavigationRequested);
    }

    #[test]
    fn events_serialize_tagged() {
        let event = BusEvent::ArtifactFailed {
            kind: ArtifactKind::Chart,
            reason: "target not mounted".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"artifact_failed\""));
        assert!(json.contains("\"kind\":\"chart\""));
    }
}
