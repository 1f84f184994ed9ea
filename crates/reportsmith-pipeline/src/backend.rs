//! Capture backend seam
//!
//! The pipeline does not render anything itself; the embedding application
//! supplies a [`CaptureBackend`] that rasterizes the on-screen region for
//! an artifact kind. Captures are asynchronous and may fail transiently
//! (for example when the target region is not mounted yet).

use async_trait::async_trait;
use reportsmith_artifact::{ArtifactKind, Raster};
use reportsmith_model::DocumentSnapshot;

/// Everything a backend needs to rasterize one artifact
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Which artifact to capture
    pub kind: ArtifactKind,
    /// Document contents at scheduling time
    pub snapshot: DocumentSnapshot,
    /// Current chart raster, for previews that embed it
    pub chart: Option<Raster>,
}

/// Transient capture failures
///
/// Every variant is retryable; the artifact keeps its last good raster.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The capture target is not mounted in the live view
    #[error("capture target for {kind} is not mounted")]
    TargetNotMounted {
        /// Artifact whose region is missing
        kind: ArtifactKind,
    },

    /// The renderer reported a failure
    #[error("render failed: {0}")]
    Render(String),
}

/// Rasterizes the on-screen region for an artifact
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Capture the region for `request.kind`
    ///
    /// # Errors
    /// Returns a [`CaptureError`] on transient failure; the pipeline keeps
    /// the artifact's last good raster and surfaces a retryable notice.
    async fn capture(&self, request: CaptureRequest) -> Result<Raster, CaptureError>;
}
