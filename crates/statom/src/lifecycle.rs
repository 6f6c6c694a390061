#![forbid(unsafe_code)]

//! Mount/unmount handshake for subscription lifetimes.
//!
//! # Design
//!
//! The reactive graph's mount commit may be deferred relative to the moment
//! a subscription is actually installed, while unmount is synchronous and
//! unconditional. "Subscribe" and "register cleanup" are therefore not
//! atomic with respect to the external lifecycle signal, and a naive
//! ordering leaves a dangling subscription when unmount lands between them.
//!
//! [`MountSlot`] resolves the race as a three-state handshake:
//!
//! | event                     | Pending        | Committed        | Cancelled          |
//! |---------------------------|----------------|------------------|--------------------|
//! | `commit(teardown)`        | store teardown | replace          | run it immediately |
//! | `release()` (unmount)     | → Cancelled    | run teardown once| no-op              |
//!
//! A teardown registered after its unmount already happened is executed on
//! the spot rather than left dangling, and no ordering of events runs a
//! teardown twice.

use tracing::trace;

/// Teardown action recorded for one mount.
type Teardown = Box<dyn FnOnce()>;

/// Per-binding mount lifecycle slot.
///
/// One slot serves the whole life of a binding; a new mount cycle re-arms
/// the same slot after the previous cycle released it.
#[derive(Default)]
pub struct MountSlot {
    state: State,
}

#[derive(Default)]
enum State {
    /// No mount has begun.
    #[default]
    Idle,
    /// Mount began; teardown not yet registered.
    Pending,
    /// Teardown registered and ready to run on unmount.
    Committed(Teardown),
    /// Unmounted (or unmounted before commit).
    Cancelled,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Committed(_) => "committed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl MountSlot {
    /// Fresh, idle slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount has begun: open a pending cleanup slot.
    pub fn arm(&mut self) {
        trace!(from = self.state.name(), "mount slot armed");
        // Dropping a still-committed teardown unexecuted would leak its
        // subscription; run it before starting the new cycle.
        if let State::Committed(teardown) = std::mem::replace(&mut self.state, State::Pending) {
            teardown();
        }
    }

    /// Register the teardown for the current mount.
    ///
    /// If unmount already arrived, the teardown runs immediately instead of
    /// dangling.
    pub fn commit(&mut self, teardown: impl FnOnce() + 'static) {
        match std::mem::replace(&mut self.state, State::Committed(Box::new(teardown))) {
            State::Cancelled => {
                trace!("mount slot committed after cancel; tearing down now");
                if let State::Committed(td) = std::mem::replace(&mut self.state, State::Cancelled) {
                    td();
                }
            }
            State::Committed(previous) => {
                trace!("mount slot re-committed; running previous teardown");
                previous();
            }
            State::Idle | State::Pending => trace!("mount slot committed"),
        }
    }

    /// Unmount: run a committed teardown exactly once, or mark a pending
    /// mount cancelled. Idempotent.
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.state, State::Cancelled) {
            State::Committed(teardown) => {
                trace!("mount slot released; running teardown");
                teardown();
            }
            State::Pending => trace!("mount slot cancelled before commit"),
            State::Idle | State::Cancelled => {}
        }
    }

    /// Whether a teardown is currently registered.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self.state, State::Committed(_))
    }

    /// Whether unmount has already landed for the current cycle.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.state, State::Cancelled)
    }
}

impl std::fmt::Debug for MountSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountSlot")
            .field("state", &self.state.name())
            .finish()
    }
}
