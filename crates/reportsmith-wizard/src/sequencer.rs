//! Stage sequencer

use crate::stage::{standard_stages, Stage};
use reportsmith_bus::{BusEvent, NotificationBus};
use reportsmith_model::{DocumentSnapshot, StageId};
use reportsmith_state::DocumentState;
use std::sync::Arc;

/// What the export stage still needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRequirement {
    /// No client selected
    ClientSelected,
    /// Media set is empty
    MediaAttached,
    /// Every daily entry is still pending
    EntryWritten,
}

/// Navigation failures, rejected synchronously with no side effects
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Target stage's prerequisites are not met
    #[error("stage {stage} is locked")]
    StageLocked {
        /// The locked stage
        stage: StageId,
    },

    /// Already at the first stage
    #[error("already at the first stage")]
    AtFirstStage,

    /// Already at the last stage
    #[error("already at the last stage")]
    AtLastStage,

    /// Export stage preconditions are not satisfied
    #[error("export preconditions not met: {missing:?}")]
    ExportPreconditions {
        /// Everything still missing
        missing: Vec<ExportRequirement>,
    },
}

/// Orders the stages and gates every transition
///
/// Before any transition completes, [`BusEvent::NavigationRequested`] is
/// published; the bus delivers it synchronously, giving subscribers one
/// turn to flush pending edits into canonical state. A rejected transition
/// publishes nothing and changes nothing.
pub struct StageSequencer {
    stages: Vec<Stage>,
    current: usize,
    state: Arc<DocumentState>,
    bus: Arc<NotificationBus>,
}

impl StageSequencer {
    /// Sequencer over the standard stage list, starting at the client stage
    #[must_use]
    pub fn new(state: Arc<DocumentState>, bus: Arc<NotificationBus>) -> Self {
        Self {
            stages: standard_stages(),
            current: 0,
            state,
            bus,
        }
    }

    /// The active stage
    #[must_use]
    pub fn current(&self) -> StageId {
        self.stages[self.current].id()
    }

    /// Export-stage requirements not yet satisfied by `snapshot`
    #[must_use]
    pub fn missing_export_requirements(snapshot: &DocumentSnapshot) -> Vec<ExportRequirement> {
        let mut missing = Vec::new();
        if !snapshot.has_client() {
            missing.push(ExportRequirement::ClientSelected);
        }
        if snapshot.media.is_empty() {
            missing.push(ExportRequirement::MediaAttached);
        }
        if !snapshot.daily_entries.any_written() {
            missing.push(ExportRequirement::EntryWritten);
        }
        missing
    }

    fn check_entry(&self, stage: &Stage, snapshot: &DocumentSnapshot) -> Result<(), NavigationError> {
        if stage.id() == StageId::Export {
            let missing = Self::missing_export_requirements(snapshot);
            if !missing.is_empty() {
                return Err(NavigationError::ExportPreconditions { missing });
            }
        }
        if !stage.is_reachable(snapshot) {
            return Err(NavigationError::StageLocked { stage: stage.id() });
        }
        Ok(())
    }

    /// True when the next stage exists and its prerequisites are met
    #[must_use]
    pub fn can_advance(&self) -> bool {
        match self.stages.get(self.current + 1) {
            Some(next) => self.check_entry(next, &self.state.snapshot()).is_ok(),
            None => false,
        }
    }

    fn transition_to(&mut self, target: usize) {
        let from = self.stages[self.current].id();
        let to = self.stages[target].id();
        // Synchronous flush window: subscribers commit pending edits into
        // canonical state before the transition completes.
        self.bus.publish(&BusEvent::NavigationRequested { from, to });
        tracing::debug!(%from, %to, "stage transition");
        self.current = target;
    }

    /// Move to the next stage
    ///
    /// # Errors
    /// Returns a typed error — with state unchanged and nothing published —
    /// when already at the last stage or the next stage is locked.
    pub fn advance(&mut self) -> Result<StageId, NavigationError> {
        let next = self
            .stages
            .get(self.current + 1)
            .ok_or(NavigationError::AtLastStage)?;
        self.check_entry(next, &self.state.snapshot())?;
        self.transition_to(self.current + 1);
        Ok(self.current())
    }

    /// Move to the previous stage
    ///
    /// # Errors
    /// Returns [`NavigationError::AtFirstStage`] when there is no previous
    /// stage.
    pub fn retreat(&mut self) -> Result<StageId, NavigationError> {
        if self.current == 0 {
            return Err(NavigationError::AtFirstStage);
        }
        self.transition_to(self.current - 1);
        Ok(self.current())
    }

    /// Jump directly to `stage`
    ///
    /// Jumping to the active stage is a no-op. Otherwise the target's
    /// prerequisites must hold.
    ///
    /// # Errors
    /// Returns a typed error when the target stage is locked or its export
    /// preconditions fail.
    pub fn jump_to(&mut self, stage: StageId) -> Result<StageId, NavigationError> {
        let target = stage.position();
        if target == self.current {
            return Ok(stage);
        }
        self.check_entry(&self.stages[target], &self.state.snapshot())?;
        self.transition_to(target);
        Ok(self.current())
    }
}

impl std::fmt::Debug for StageSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageSequencer")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
