#![forbid(unsafe_code)]

//! Snapshot bridge: a cached mirror of an actor's latest state.
//!
//! # Design
//!
//! The bridge does not own its actor; it is handed an [`ActorRef`] (a direct
//! handle, or a read function resolving one) and maintains a per-binding
//! state machine `{Unobserved, Observed}`:
//!
//! - **Unobserved**: reads poll the actor's snapshot accessor directly. No
//!   subscription cost is paid; staleness between polls is acceptable.
//! - **Observed** (entered on mount): the cache is seeded with the actor's
//!   current snapshot *before* subscribing, closing the window between the
//!   subscribe call and the first push. Every push then overwrites the
//!   cache, so reads between pushes are idempotent and never touch the
//!   actor. The last consumer's departure unsubscribes, clears the cache,
//!   and reverts to direct-read mode.
//!
//! # Invariants
//!
//! 1. While observed and attached, reads return exactly the most recently
//!    pushed (or seeded) snapshot.
//! 2. The cache holds a value only while a subscription is (or was just)
//!    live; unobserved bindings carry no cache entry.
//! 3. Pushes land in emission order; the cache never regresses.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::actor::{ActorHandle, ActorRef, Subscription};
use crate::error::BindError;
use crate::lifecycle::MountSlot;

/// Read-only cached view over a non-owned actor.
pub struct SnapshotBridge<H: ActorHandle, G> {
    actor: ActorRef<H, G>,
    /// Latest pushed snapshot, or `None` meaning "no push has occurred
    /// yet, read the actor directly instead".
    cache: Rc<RefCell<Option<H::Snapshot>>>,
    sub: Rc<RefCell<Option<Subscription>>>,
    slot: RefCell<MountSlot>,
    observed: Cell<bool>,
}

impl<H: ActorHandle, G> SnapshotBridge<H, G> {
    /// Bridge over the given actor reference.
    #[must_use]
    pub fn new(actor: ActorRef<H, G>) -> Self {
        Self {
            actor,
            cache: Rc::new(RefCell::new(None)),
            sub: Rc::new(RefCell::new(None)),
            slot: RefCell::new(MountSlot::new()),
            observed: Cell::new(false),
        }
    }

    /// Bridge over a handle supplied directly.
    #[must_use]
    pub fn of_handle(handle: H) -> Self {
        Self::new(ActorRef::handle(handle))
    }

    /// Bridge over a handle resolved through the graph at access time.
    #[must_use]
    pub fn read_with(f: impl Fn(&G) -> Result<H, BindError> + 'static) -> Self {
        Self::new(ActorRef::read_with(f))
    }

    /// Current snapshot: the cached mirror while observed and attached,
    /// a direct poll otherwise.
    ///
    /// An observed bridge whose subscription was detached (after a restart)
    /// re-attaches to the current actor first, so the fresh actor's pushes
    /// land in the cache from here on.
    ///
    /// # Errors
    ///
    /// Propagates failures from resolving the actor reference.
    pub fn read(&self, graph: &G) -> Result<H::Snapshot, BindError> {
        if self.observed.get() && self.sub.borrow().is_none() {
            self.attach(graph)?;
        }
        if let Some(snapshot) = self.cache.borrow().as_ref() {
            return Ok(snapshot.clone());
        }
        Ok(self.actor.resolve(graph)?.snapshot())
    }

    /// First active consumer arrived: arm, attach, and commit teardown in
    /// one synchronous step. Graphs that defer their mount commit should
    /// call [`SnapshotBridge::begin_mount`] and
    /// [`SnapshotBridge::complete_mount`] separately instead.
    ///
    /// # Errors
    ///
    /// Propagates failures from resolving the actor reference.
    pub fn mount(&self, graph: &G) -> Result<(), BindError> {
        self.begin_mount();
        self.complete_mount(graph)
    }

    /// As [`SnapshotBridge::mount`], with an extra teardown to run when the
    /// mount is released (or cancelled before commit).
    ///
    /// # Errors
    ///
    /// Propagates failures from resolving the actor reference.
    pub fn mount_with(
        &self,
        graph: &G,
        extra_teardown: impl FnOnce() + 'static,
    ) -> Result<(), BindError> {
        self.begin_mount();
        self.complete_with(graph, extra_teardown)
    }

    /// Mount has started: transition to observed and open the pending
    /// cleanup slot. The subscription is not live until the commit step.
    pub fn begin_mount(&self) {
        self.observed.set(true);
        self.slot.borrow_mut().arm();
    }

    /// Commit step of a deferred mount: seed the cache, subscribe, and
    /// register the teardown. If unmount already arrived, the teardown runs
    /// immediately and the binding stays unobserved.
    ///
    /// # Errors
    ///
    /// Propagates failures from resolving the actor reference.
    pub fn complete_mount(&self, graph: &G) -> Result<(), BindError> {
        self.complete_with(graph, || {})
    }

    fn complete_with(
        &self,
        graph: &G,
        extra_teardown: impl FnOnce() + 'static,
    ) -> Result<(), BindError> {
        // Unmount already landed: do not subscribe only to tear straight
        // back down. The extra teardown still runs, via the cancelled
        // commit path.
        let cancelled = self.slot.borrow().is_cancelled();
        if cancelled {
            self.slot.borrow_mut().commit(extra_teardown);
            return Ok(());
        }
        self.attach(graph)?;
        let cache = Rc::clone(&self.cache);
        let sub = Rc::clone(&self.sub);
        self.slot.borrow_mut().commit(move || {
            if let Some(s) = sub.borrow_mut().take() {
                s.unsubscribe();
            }
            *cache.borrow_mut() = None;
            extra_teardown();
        });
        Ok(())
    }

    /// Last consumer departed: unsubscribe, clear the cache, revert to
    /// direct-read mode. Idempotent; extra unmounts are no-ops.
    pub fn unmount(&self) {
        self.observed.set(false);
        self.slot.borrow_mut().release();
        // A read during a pending mount attaches outside the slot; the
        // release alone would leave that subscription live.
        self.detach();
    }

    /// Drop the live subscription and cache without leaving the observed
    /// state. The next read re-attaches to whatever actor the reference
    /// then resolves to. Restart coordination.
    pub fn detach(&self) {
        if let Some(s) = self.sub.borrow_mut().take() {
            s.unsubscribe();
            debug!("snapshot bridge detached");
        }
        *self.cache.borrow_mut() = None;
    }

    /// Seed the cache from the actor's current snapshot, then install the
    /// push subscription. Seeding first closes the subscribe-to-first-push
    /// window.
    fn attach(&self, graph: &G) -> Result<(), BindError> {
        let handle = self.actor.resolve(graph)?;
        *self.cache.borrow_mut() = Some(handle.snapshot());
        let cache = Rc::clone(&self.cache);
        let sub = handle.subscribe(move |snapshot| {
            *cache.borrow_mut() = Some(snapshot.clone());
        });
        *self.sub.borrow_mut() = Some(sub);
        debug!("snapshot bridge attached");
        Ok(())
    }

    /// Whether at least one consumer is observing this binding.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        self.observed.get()
    }

    /// Whether a push subscription is currently live.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.sub.borrow().is_some()
    }

    /// Whether the cache currently holds a pushed (or seeded) snapshot.
    #[must_use]
    pub fn has_cached(&self) -> bool {
        self.cache.borrow().is_some()
    }
}

impl<H: ActorHandle, G> std::fmt::Debug for SnapshotBridge<H, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotBridge")
            .field("observed", &self.observed.get())
            .field("attached", &self.is_attached())
            .field("cached", &self.has_cached())
            .finish()
    }
}
