//! Derived rendering artifacts
//!
//! A derived artifact is an expensive-to-compute rendering (the metrics
//! chart, the full preview snapshot) cached and invalidated by a
//! [`Fingerprint`] of its declared document inputs. This crate holds the
//! value types and the validity rules; orchestration lives in the pipeline
//! crate.

pub mod fingerprint;
pub mod kind;
pub mod raster;
pub mod status;

pub use fingerprint::{Fingerprint, FingerprintError};
pub use kind::ArtifactKind;
pub use raster::{Raster, RasterError};
pub use status::{ArtifactStatus, StatusError};
