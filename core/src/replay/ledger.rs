//! Run ledger
//!
//! Holds the frozen recordings that can be played back, one per [`Slot`].

use std::sync::Arc;

use tracing::info;

use crate::replay::recording::Recording;
use crate::replay::types::Slot;

/// Fixed table of the three replay slots.
///
/// Slots are overwritten wholesale. `Last` and `Best` may share the same
/// recording.
#[derive(Debug, Clone, Default)]
pub struct ReplayLedger {
    last: Option<Arc<Recording>>,
    best: Option<Arc<Recording>>,
    saved: Option<Arc<Recording>>,
}

impl ReplayLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Arc<Recording>> {
        match slot {
            Slot::Last => &mut self.last,
            Slot::Best => &mut self.best,
            Slot::Saved => &mut self.saved,
        }
    }

    /// Store `recording` in `slot`, discarding the previous occupant
    pub fn put(&mut self, slot: Slot, recording: impl Into<Arc<Recording>>) {
        *self.slot_mut(slot) = Some(recording.into());
    }

    /// Recording stored in `slot`, if any
    pub fn get(&self, slot: Slot) -> Option<Arc<Recording>> {
        match slot {
            Slot::Last => self.last.clone(),
            Slot::Best => self.best.clone(),
            Slot::Saved => self.saved.clone(),
        }
    }

    /// Check if `slot` is occupied
    pub fn contains(&self, slot: Slot) -> bool {
        match slot {
            Slot::Last => self.last.is_some(),
            Slot::Best => self.best.is_some(),
            Slot::Saved => self.saved.is_some(),
        }
    }

    /// Store an externally loaded run in [`Slot::Saved`]
    pub fn set_saved(&mut self, recording: impl Into<Arc<Recording>>) {
        self.put(Slot::Saved, recording);
    }

    /// Empty `slot`, returning its previous occupant
    pub fn clear(&mut self, slot: Slot) -> Option<Arc<Recording>> {
        self.slot_mut(slot).take()
    }

    /// Record a finished run.
    ///
    /// The run always becomes [`Slot::Last`]. It also becomes [`Slot::Best`]
    /// when there is no best yet or its duration is less than or equal to the
    /// current best, so ties go to the most recent run.
    ///
    /// Returns whether the run is the new best.
    pub fn finish_and_promote(&mut self, recording: impl Into<Arc<Recording>>) -> bool {
        let recording = recording.into();
        let duration = recording.duration();
        self.last = Some(recording.clone());

        let is_new_best = match &self.best {
            None => true,
            Some(best) => duration <= best.duration(),
        };

        if is_new_best {
            info!(
                duration,
                previous = self.best.as_ref().map(|b| b.duration()),
                "new best run"
            );
            self.best = Some(recording);
        }

        is_new_best
    }
}
