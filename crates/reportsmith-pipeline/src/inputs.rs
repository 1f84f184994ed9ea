//! Fingerprint input assembly
//!
//! The fingerprint of an artifact is the Blake3 hash of a canonical JSON
//! object holding exactly its declared input slices. The chart raster
//! contributes its content digest rather than its pixel buffer, so the
//! preview fingerprint stays cheap to compute.

use reportsmith_artifact::{ArtifactKind, Fingerprint, FingerprintError, Raster};
use reportsmith_model::{DocumentField, DocumentSnapshot};
use serde_json::{Map, Value};

/// Compute the fingerprint of `kind` from current canonical values
///
/// # Errors
/// Returns an error when an input slice cannot be serialized.
pub fn fingerprint_inputs(
    kind: ArtifactKind,
    snapshot: &DocumentSnapshot,
    chart: Option<&Raster>,
) -> Result<Fingerprint, FingerprintError> {
    let mut inputs = Map::new();
    for &field in kind.declared_inputs() {
        let value = match field {
            DocumentField::Client => serde_json::to_value(&snapshot.client)?,
            DocumentField::Metrics => serde_json::to_value(&snapshot.metrics)?,
            DocumentField::DailyEntries => serde_json::to_value(&snapshot.daily_entries)?,
            DocumentField::Notes => Value::String(snapshot.notes.clone()),
            DocumentField::Signature => Value::String(snapshot.signature.clone()),
            DocumentField::ContactChannel => serde_json::to_value(&snapshot.contact_channel)?,
            DocumentField::Theme => serde_json::to_value(&snapshot.theme)?,
            DocumentField::Media => serde_json::to_value(&snapshot.media)?,
            DocumentField::DateRange => serde_json::to_value(snapshot.date_range)?,
            DocumentField::ChartRaster => chart
                .map(|r| Value::String(Fingerprint::new(r.content_digest()).to_string()))
                .unwrap_or(Value::Null),
        };
        inputs.insert(field.storage_key().to_string(), value);
    }
    Fingerprint::of_inputs(&inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportsmith_model::{MetricsPatch, ThemePatch};

    #[test]
    fn chart_fingerprint_tracks_metrics_and_theme_only() {
        let mut snapshot = DocumentSnapshot::default();
        let base = fingerprint_inputs(ArtifactKind::Chart, &snapshot, None).unwrap();

        snapshot.notes = "changed".to_string();
        let after_notes = fingerprint_inputs(ArtifactKind::Chart, &snapshot, None).unwrap();
        assert_eq!(base, after_notes);

        snapshot.metrics.merge(MetricsPatch::cameras(12));
        let after_metrics = fingerprint_inputs(ArtifactKind::Chart, &snapshot, None).unwrap();
        assert_ne!(base, after_metrics);

        snapshot
            .theme
            .merge(ThemePatch::accent(reportsmith_model::RgbColor::new(0, 255, 0)));
        let after_theme = fingerprint_inputs(ArtifactKind::Chart, &snapshot, None).unwrap();
        assert_ne!(after_metrics, after_theme);
    }

    #[test]
    fn preview_fingerprint_tracks_chart_digest() {
        let snapshot = DocumentSnapshot::default();
        let without = fingerprint_inputs(ArtifactKind::Preview, &snapshot, None).unwrap();

        let chart = Raster::filled(8, 8, [9, 9, 9, 255]);
        let with = fingerprint_inputs(ArtifactKind::Preview, &snapshot, Some(&chart)).unwrap();
        assert_ne!(without, with);

        let same_chart = Raster::filled(8, 8, [9, 9, 9, 255]);
        let with_again =
            fingerprint_inputs(ArtifactKind::Preview, &snapshot, Some(&same_chart)).unwrap();
        assert_eq!(with, with_again);
    }
}
