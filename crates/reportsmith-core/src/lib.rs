//! Report studio facade
//!
//! Wires the core together: canonical document state over a durable store,
//! the change notification bus, the stage sequencer, the derived-artifact
//! pipeline, and the paginated exporter. External collaborators (the
//! wizard's tab UI, the upload widget, the suggestion assistant) talk to
//! [`ReportStudio`] and the bus; nothing else holds mutable document state.

pub mod config;
pub mod studio;
pub mod telemetry;

pub use config::StudioConfig;
pub use studio::{ExportError, ReportStudio};
pub use telemetry::init_tracing;
