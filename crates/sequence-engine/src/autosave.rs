//! Debounced autosave state machine.
//!
//! `AutosaveController` does not own a task or a timer. The caller reports
//! every new dirty signature through [`AutosaveController::observe`], sleeps
//! until [`AutosaveController::deadline`], calls
//! [`AutosaveController::poll`] and, when it yields a signature, performs the
//! save and reports the outcome with [`AutosaveController::complete`].
//!
//! States: `Idle → Pending → Firing`, and back to `Idle` only after a
//! successful save leaves nothing dirty. A failed save keeps the dirty flag
//! and re-arms the debounce.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::signature::Signature;

/// Quiet period before a silent save (milliseconds).
pub const DEFAULT_DEBOUNCE_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveState {
    /// Nothing to save.
    Idle,
    /// Dirty; fires at `deadline` unless another change restarts the timer.
    Pending { deadline: Instant },
    /// A save for `signature` is in flight.
    Firing { signature: Signature },
}

#[derive(Debug)]
pub struct AutosaveController {
    debounce: Duration,
    last_saved: Signature,
    current: Signature,
    state: AutosaveState,
    enabled: bool,
}

impl AutosaveController {
    /// Start clean: `initial` is both the current and the last-saved
    /// signature.
    pub fn new(debounce: Duration, initial: Signature) -> Self {
        Self {
            debounce,
            last_saved: initial.clone(),
            current: initial,
            state: AutosaveState::Idle,
            enabled: true,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn state(&self) -> &AutosaveState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.last_saved
    }

    pub fn last_saved(&self) -> &Signature {
        &self.last_saved
    }

    /// Disabled controllers still track dirtiness but never fire.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Report the signature after a mutation. A difference from the
    /// last-saved signature (re)starts the debounce; returning to the saved
    /// content cancels a pending save.
    pub fn observe(&mut self, signature: Signature, now: Instant) {
        if signature == self.current {
            return;
        }
        self.current = signature;
        if matches!(self.state, AutosaveState::Firing { .. }) {
            // Re-evaluated in `complete`.
            return;
        }
        if self.is_dirty() {
            let deadline = now + self.debounce;
            debug!(?deadline, "Autosave debounce restarted");
            self.state = AutosaveState::Pending { deadline };
        } else {
            self.state = AutosaveState::Idle;
        }
    }

    /// When the pending save is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            AutosaveState::Pending { deadline } if self.enabled => Some(deadline),
            _ => None,
        }
    }

    /// If the debounce has elapsed, move to `Firing` and return the signature
    /// that must be saved.
    pub fn poll(&mut self, now: Instant) -> Option<Signature> {
        let due = self.deadline().is_some_and(|deadline| now >= deadline);
        if !due {
            return None;
        }
        let signature = self.current.clone();
        self.state = AutosaveState::Firing {
            signature: signature.clone(),
        };
        debug!(signature = signature.short(), "Autosave firing");
        Some(signature)
    }

    /// Report the outcome of a save (silent or manual) of `signature`.
    pub fn complete(&mut self, signature: Signature, ok: bool, now: Instant) {
        if ok {
            self.last_saved = signature;
        }
        self.state = if self.is_dirty() {
            AutosaveState::Pending {
                deadline: now + self.debounce,
            }
        } else {
            AutosaveState::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(s: &str) -> Signature {
        crate::signature::dirty_signature(&[shotlist_sequence_model::Segment::new(s, 1.0)])
            .unwrap()
    }

    fn controller() -> AutosaveController {
        AutosaveController::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS), sig("a"))
    }

    #[test]
    fn starts_clean_and_idle() {
        let c = controller();
        assert!(!c.is_dirty());
        assert_eq!(c.state(), &AutosaveState::Idle);
        assert!(c.deadline().is_none());
    }

    #[test]
    fn change_arms_and_restarts_debounce() {
        let mut c = controller();
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        assert_eq!(c.deadline(), Some(t0 + Duration::from_secs(3)));

        let t1 = t0 + Duration::from_secs(2);
        c.observe(sig("c"), t1);
        assert_eq!(c.deadline(), Some(t1 + Duration::from_secs(3)));
        assert!(c.poll(t0 + Duration::from_secs(4)).is_none());
        assert!(c.poll(t1 + Duration::from_secs(3)).is_some());
    }

    #[test]
    fn reverting_to_saved_cancels_pending() {
        let mut c = controller();
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        c.observe(sig("a"), t0);
        assert_eq!(c.state(), &AutosaveState::Idle);
        assert!(!c.is_dirty());
    }

    #[test]
    fn successful_save_returns_to_idle() {
        let mut c = controller();
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        let due = t0 + Duration::from_secs(3);
        let firing = c.poll(due).unwrap();
        assert!(matches!(c.state(), AutosaveState::Firing { .. }));
        c.complete(firing, true, due);
        assert_eq!(c.state(), &AutosaveState::Idle);
        assert!(!c.is_dirty());
    }

    #[test]
    fn failed_save_keeps_dirty_and_rearms() {
        let mut c = controller();
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        let due = t0 + Duration::from_secs(3);
        let firing = c.poll(due).unwrap();
        c.complete(firing, false, due);
        assert!(c.is_dirty());
        assert_eq!(c.deadline(), Some(due + Duration::from_secs(3)));
    }

    #[test]
    fn change_during_firing_rearms_after_completion() {
        let mut c = controller();
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        let due = t0 + Duration::from_secs(3);
        let firing = c.poll(due).unwrap();
        c.observe(sig("c"), due);
        assert!(matches!(c.state(), AutosaveState::Firing { .. }));
        c.complete(firing, true, due);
        assert!(c.is_dirty());
        assert!(c.deadline().is_some());
    }

    #[test]
    fn disabled_controller_never_fires() {
        let mut c = controller();
        c.set_enabled(false);
        let t0 = Instant::now();
        c.observe(sig("b"), t0);
        assert!(c.is_dirty());
        assert!(c.poll(t0 + Duration::from_secs(60)).is_none());
    }
}
