//! Derived-artifact regeneration pipeline
//!
//! Owns the decision of *when* each derived artifact (chart, preview) is
//! regenerated and *how* it is captured:
//! - a settle delay after the triggering change lets layout finish painting
//! - a fingerprint of the declared inputs decides regenerate-versus-reuse
//! - at most one capture pass per artifact is in flight; requests arriving
//!   mid-pass coalesce into exactly one follow-up pass
//! - a failed capture keeps the last good raster and is retryable

pub mod backend;
pub mod inputs;
pub mod pipeline;

pub use backend::{CaptureBackend, CaptureError, CaptureRequest};
pub use inputs::fingerprint_inputs;
pub use pipeline::{ArtifactPipeline, PipelineConfig};
