//! The studio facade

use crate::config::StudioConfig;
use parking_lot::Mutex;
use reportsmith_artifact::{ArtifactKind, ArtifactStatus};
use reportsmith_bus::{BusEvent, FieldPatch, NotificationBus, Subscription, Topic};
use reportsmith_export::{
    export_basename, paginate_document, ExportedDocument, OverlayControl, OverlayGuard,
    PaginationError,
};
use reportsmith_model::StageId;
use reportsmith_pipeline::{ArtifactPipeline, CaptureBackend};
use reportsmith_state::DocumentState;
use reportsmith_store::DurableStore;
use reportsmith_wizard::{ExportRequirement, NavigationError, StageSequencer};
use std::sync::Arc;

/// Export entry-point failures
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Rejected synchronously before any expensive work
    #[error("export preconditions not met: {missing:?}")]
    Preconditions {
        /// Everything still missing
        missing: Vec<ExportRequirement>,
    },

    /// The preview raster could not be produced
    #[error("preview raster unavailable (status {status:?})")]
    PreviewUnavailable {
        /// Status the preview settled in
        status: ArtifactStatus,
    },

    /// Pagination failed
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// One editing session over one report
///
/// Owns the wiring: every stage and collaborator reads and writes the same
/// [`DocumentState`] through this facade or through bus events; the
/// pipeline and exporter consume that state and nothing else.
pub struct ReportStudio {
    config: StudioConfig,
    bus: Arc<NotificationBus>,
    state: Arc<DocumentState>,
    sequencer: Mutex<StageSequencer>,
    pipeline: ArtifactPipeline,
    overlays: Arc<dyn OverlayControl>,
    _edit_sub: Subscription,
}

impl ReportStudio {
    /// Open a session: rehydrate state, wire the bus, start the pipeline
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn open(
        config: StudioConfig,
        store: Arc<dyn DurableStore>,
        backend: Arc<dyn CaptureBackend>,
        overlays: Arc<dyn OverlayControl>,
    ) -> Self {
        let bus = Arc::new(NotificationBus::new());
        let state = Arc::new(DocumentState::open(
            &store,
            Arc::clone(&bus),
            config.field_config(),
        ));
        let sequencer = Mutex::new(StageSequencer::new(Arc::clone(&state), Arc::clone(&bus)));
        let pipeline = ArtifactPipeline::new(
            Arc::clone(&state),
            Arc::clone(&bus),
            backend,
            config.pipeline_config(),
        );

        // Decoupled collaborators publish edits instead of mutating state;
        // applying them here keeps the state the only mutator and turns the
        // request into a FieldChanged fact.
        let edit_sub = {
            let state = Arc::clone(&state);
            bus.subscribe(Topic::EditRequested, move |event| {
                if let BusEvent::EditRequested { patch } = event {
                    match patch.clone() {
                        FieldPatch::DailyEntry { day, patch } => {
                            state.apply_daily_entry(day, patch);
                        }
                        FieldPatch::Metrics { patch } => state.apply_metrics(patch),
                        FieldPatch::Theme { patch } => state.apply_theme(patch),
                    }
                }
                Ok(())
            })
        };

        tracing::info!("report studio opened");
        Self {
            config,
            bus,
            state,
            sequencer,
            pipeline,
            overlays,
            _edit_sub: edit_sub,
        }
    }

    /// Canonical document state
    #[must_use]
    pub fn state(&self) -> &Arc<DocumentState> {
        &self.state
    }

    /// The session bus
    #[must_use]
    pub fn bus(&self) -> &Arc<NotificationBus> {
        &self.bus
    }

    /// The derived-artifact pipeline
    #[must_use]
    pub fn pipeline(&self) -> &ArtifactPipeline {
        &self.pipeline
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    // --- navigation surface (consumed by the wizard's tab UI) -------------

    /// The active stage
    #[must_use]
    pub fn current_stage(&self) -> StageId {
        self.sequencer.lock().current()
    }

    /// Whether the next stage is reachable
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.sequencer.lock().can_advance()
    }

    /// Move to the next stage
    ///
    /// # Errors
    /// Propagates the sequencer's typed rejection; state is unchanged.
    pub fn advance(&self) -> Result<StageId, NavigationError> {
        self.sequencer.lock().advance()
    }

    /// Move to the previous stage
    ///
    /// # Errors
    /// Propagates the sequencer's typed rejection; state is unchanged.
    pub fn retreat(&self) -> Result<StageId, NavigationError> {
        self.sequencer.lock().retreat()
    }

    /// Jump directly to a stage
    ///
    /// # Errors
    /// Propagates the sequencer's typed rejection; state is unchanged.
    pub fn jump_to(&self, stage: StageId) -> Result<StageId, NavigationError> {
        self.sequencer.lock().jump_to(stage)
    }

    // --- export ------------------------------------------------------------

    /// Produce the paginated document for the current state
    ///
    /// Preconditions are checked synchronously before any expensive work.
    /// Preview-only overlay markers are hidden for the duration of the
    /// capture and restored afterwards, also on the failure path.
    ///
    /// # Errors
    /// - [`ExportError::Preconditions`] with everything still missing
    /// - [`ExportError::PreviewUnavailable`] when capture cannot produce a
    ///   preview raster
    /// - [`ExportError::Pagination`] for geometry violations
    pub async fn export(&self) -> Result<ExportedDocument, ExportError> {
        let snapshot = self.state.snapshot();
        let missing = StageSequencer::missing_export_requirements(&snapshot);
        if !missing.is_empty() {
            tracing::debug!(?missing, "export rejected");
            return Err(ExportError::Preconditions { missing });
        }
        let Some(client) = snapshot.client.clone() else {
            return Err(ExportError::Preconditions {
                missing: vec![ExportRequirement::ClientSelected],
            });
        };

        let source = {
            let _overlays_hidden = OverlayGuard::hide(&*self.overlays);
            self.pipeline.ensure_ready(ArtifactKind::Chart);
            self.pipeline.wait_settled(ArtifactKind::Chart).await;
            self.pipeline.ensure_ready(ArtifactKind::Preview);
            let status = self.pipeline.wait_settled(ArtifactKind::Preview).await;
            if status != ArtifactStatus::Ready {
                return Err(ExportError::PreviewUnavailable { status });
            }
            self.pipeline
                .raster(ArtifactKind::Preview)
                .ok_or(ExportError::PreviewUnavailable { status })?
        };

        let basename = export_basename(&client, &snapshot.date_range);
        let document = paginate_document(basename, &source, self.config.page)?;
        tracing::info!(
            basename = %document.basename,
            pages = document.page_count(),
            "report exported"
        );
        Ok(document)
    }

    /// Flush every dirty field durably (shutdown path)
    pub fn shutdown(&self) {
        self.state.flush_all();
        tracing::info!("report studio closed");
    }
}

impl std::fmt::Debug for ReportStudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportStudio")
            .field("stage", &self.current_stage())
            .finish_non_exhaustive()
    }
}
