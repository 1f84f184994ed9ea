//! Scoped hiding of preview-only overlay markers
//!
//! The live preview carries "preview only / do-not-export" markers that
//! must never appear in captured output. [`OverlayGuard`] hides them for
//! the duration of a capture and restores them on drop — including when
//! the capture fails partway.

/// Toggles the visibility of preview-only overlay markers in the live view
pub trait OverlayControl: Send + Sync {
    /// Hide or restore the markers
    fn set_hidden(&self, hidden: bool);
}

/// RAII scope during which overlay markers are hidden
#[must_use = "dropping the guard is what restores the overlays"]
pub struct OverlayGuard<'a> {
    control: &'a dyn OverlayControl,
}

impl<'a> OverlayGuard<'a> {
    /// Hide the overlays until the guard is dropped
    pub fn hide(control: &'a dyn OverlayControl) -> Self {
        control.set_hidden(true);
        Self { control }
    }
}

impl Drop for OverlayGuard<'_> {
    fn drop(&mut self) {
        self.control.set_hidden(false);
    }
}

impl std::fmt::Debug for OverlayGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Markers {
        hidden: AtomicBool,
    }

    impl OverlayControl for Markers {
        fn set_hidden(&self, hidden: bool) {
            self.hidden.store(hidden, Ordering::SeqCst);
        }
    }

    #[test]
    fn guard_hides_then_restores() {
        let markers = Markers::default();
        {
            let _guard = OverlayGuard::hide(&markers);
            assert!(markers.hidden.load(Ordering::SeqCst));
        }
        assert!(!markers.hidden.load(Ordering::SeqCst));
    }

    #[test]
    fn guard_restores_on_failure_path() {
        let markers = Markers::default();
        let result: Result<(), &str> = (|| {
            let _guard = OverlayGuard::hide(&markers);
            Err("capture failed")
        })();
        assert!(result.is_err());
        assert!(!markers.hidden.load(Ordering::SeqCst));
    }
}
