//! Wizard stages and reachability predicates

use reportsmith_model::{DocumentSnapshot, StageId};

/// One step of the wizard
///
/// # Invariants
/// - Predicates are monotone in document completeness: adding required data
///   never re-locks an already-unlocked stage
pub struct Stage {
    id: StageId,
    reachable: fn(&DocumentSnapshot) -> bool,
}

impl Stage {
    /// Stage identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> StageId {
        self.id
    }

    /// Whether the stage is reachable given the current document
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, snapshot: &DocumentSnapshot) -> bool {
        (self.reachable)(snapshot)
    }
}

fn always(_: &DocumentSnapshot) -> bool {
    true
}

fn client_chosen(snapshot: &DocumentSnapshot) -> bool {
    snapshot.has_client()
}

/// The wizard's stages in editing order
///
/// The client stage is always open; everything after it unlocks once a
/// client is chosen. The export stage carries additional preconditions
/// checked by the sequencer.
#[must_use]
pub fn standard_stages() -> Vec<Stage> {
    StageId::ALL
        .iter()
        .map(|&id| Stage {
            id,
            reachable: match id {
                StageId::Client => always,
                _ => client_chosen,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportsmith_model::ClientRef;

    #[test]
    fn client_stage_always_reachable() {
        let stages = standard_stages();
        let empty = DocumentSnapshot::default();
        assert!(stages[0].is_reachable(&empty));
        assert!(!stages[1].is_reachable(&empty));
    }

    #[test]
    fn later_stages_unlock_with_client() {
        let stages = standard_stages();
        let snapshot = DocumentSnapshot {
            client: Some(ClientRef::new("Acme")),
            ..DocumentSnapshot::default()
        };
        assert!(stages.iter().all(|s| s.is_reachable(&snapshot)));
    }
}
