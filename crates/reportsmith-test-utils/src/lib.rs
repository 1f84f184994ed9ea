//! Testing utilities for the reportsmith workspace
//!
//! Shared fixtures, fake capture backends, and overlay recorders.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc, Weekday};
use parking_lot::Mutex;
use reportsmith_artifact::{ArtifactKind, Raster};
use reportsmith_export::OverlayControl;
use reportsmith_model::{
    ClientRef, DailyEntryPatch, DateRange, EntryStatus, MediaAttachment, SeverityCode,
};
use reportsmith_pipeline::{CaptureBackend, CaptureError, CaptureRequest};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Install a compact tracing subscriber honoring `RUST_LOG`; safe to call
/// from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn sample_client() -> ClientRef {
    ClientRef::new("Acme Downtown").with_site("Lot B")
}

pub fn sample_period() -> DateRange {
    DateRange::new(
        Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).single().expect("valid date"),
        Utc.with_ymd_and_hms(2026, 8, 7, 23, 59, 59).single().expect("valid date"),
    )
    .expect("ordered range")
}

pub fn drafted_entry_patch() -> DailyEntryPatch {
    DailyEntryPatch {
        narrative: Some("Vehicle loitering near gate 3, operator voice-down at 02:14.".to_string()),
        status: Some(EntryStatus::Drafted),
        severity: Some(SeverityCode::Medium),
    }
}

pub fn sample_attachment() -> MediaAttachment {
    MediaAttachment::new("Gate 3 clip", "video/mp4", 1_048_576)
}

pub const SAMPLE_ENTRY_DAY: Weekday = Weekday::Tue;

/// Capture backend producing deterministic rasters, with per-kind failure
/// scripting and capture counting
#[derive(Default)]
pub struct FakeCaptureBackend {
    counts: Mutex<HashMap<ArtifactKind, usize>>,
    failing: Mutex<HashMap<ArtifactKind, bool>>,
    /// Height of the preview raster the fake produces
    pub preview_height: AtomicUsize,
}

impl FakeCaptureBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.preview_height.store(300, Ordering::SeqCst);
        backend
    }

    pub fn captures(&self, kind: ArtifactKind) -> usize {
        *self.counts.lock().get(&kind).unwrap_or(&0)
    }

    pub fn set_failing(&self, kind: ArtifactKind, failing: bool) {
        self.failing.lock().insert(kind, failing);
    }
}

#[async_trait]
impl CaptureBackend for FakeCaptureBackend {
    async fn capture(&self, request: CaptureRequest) -> Result<Raster, CaptureError> {
        *self.counts.lock().entry(request.kind).or_default() += 1;
        if self.failing.lock().get(&request.kind).copied().unwrap_or(false) {
            return Err(CaptureError::TargetNotMounted { kind: request.kind });
        }
        let raster = match request.kind {
            ArtifactKind::Chart => {
                let shade = (request.snapshot.metrics.weekly_total() % 256) as u8;
                Raster::filled(120, 80, [shade, 64, 32, 255])
            }
            ArtifactKind::Preview => {
                let height = self.preview_height.load(Ordering::SeqCst) as u32;
                let shade = (request.snapshot.notes.len() % 256) as u8;
                Raster::filled(160, height.max(1), [shade, shade, 200, 255])
            }
        };
        Ok(raster)
    }
}

/// Overlay control remembering whether markers are hidden and how often
/// they were toggled
#[derive(Default)]
pub struct RecordingOverlays {
    hidden: AtomicBool,
    toggles: AtomicUsize,
}

impl RecordingOverlays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    pub fn toggle_count(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl OverlayControl for RecordingOverlays {
    fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }
}
