//! Artifact status machine
//!
//! Legal lifecycle:
//! Missing -> Generating -> Ready -> Stale -> Generating ...
//! with Generating -> Failed -> Generating on capture errors.

use serde::{Deserialize, Serialize};

/// Validity state of one derived artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Never generated
    #[default]
    Missing,
    /// A capture pass is producing it
    Generating,
    /// Stored fingerprint matches its inputs
    Ready,
    /// Inputs changed since the stored fingerprint
    Stale,
    /// Last capture pass failed; previous raster, if any, is retained
    Failed,
}

/// Illegal status transition
#[derive(Debug, thiserror::Error)]
#[error("illegal artifact status transition: {from:?} -> {to:?}")]
pub struct StatusError {
    /// Current status
    pub from: ArtifactStatus,
    /// Requested status
    pub to: ArtifactStatus,
}

/// Statuses reachable from `from`
#[must_use]
pub fn allowed_transitions(from: ArtifactStatus) -> &'static [ArtifactStatus] {
    use ArtifactStatus::{Failed, Generating, Missing, Ready, Stale};
    match from {
        Missing | Stale | Failed => &[Generating],
        Generating => &[Ready, Failed],
        Ready => &[Stale],
    }
}

/// Validate a transition, returning a typed error when illegal
///
/// # Errors
/// Returns [`StatusError`] when `to` is not reachable from `from`.
pub fn validate_transition(from: ArtifactStatus, to: ArtifactStatus) -> Result<(), StatusError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StatusError { from, to })
    }
}

impl ArtifactStatus {
    /// True when a regeneration pass should run
    #[inline]
    #[must_use]
    pub fn needs_generation(self) -> bool {
        matches!(self, Self::Missing | Self::Stale | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ArtifactStatus::{Failed, Generating, Missing, Ready, Stale};

    #[test]
    fn lifecycle_path_is_legal() {
        for (from, to) in [
            (Missing, Generating),
            (Generating, Ready),
            (Ready, Stale),
            (Stale, Generating),
            (Generating, Failed),
            (Failed, Generating),
        ] {
            validate_transition(from, to).unwrap();
        }
    }

    #[test]
    fn ready_cannot_skip_stale() {
        assert!(validate_transition(Ready, Generating).is_err());
    }

    #[test]
    fn missing_cannot_jump_to_ready() {
        assert!(validate_transition(Missing, Ready).is_err());
    }

    #[test]
    fn needs_generation_matches_table() {
        assert!(Missing.needs_generation());
        assert!(Stale.needs_generation());
        assert!(Failed.needs_generation());
        assert!(!Ready.needs_generation());
        assert!(!Generating.needs_generation());
    }
}
