#![forbid(unsafe_code)]

//! The actor-runtime seam.
//!
//! The bindings in this crate never interpret state machines themselves;
//! they drive an external runtime through these traits. An implementation
//! supplies a description type ([`ActorLogic`]) and a handle type
//! ([`ActorHandle`]) over a running instance. Everything is single-threaded:
//! snapshot pushes arrive as ordinary, non-reentrant callbacks on the same
//! cooperative scheduler that performs reads.

use crate::error::BindError;

/// Lifecycle state of an actor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorStatus {
    /// Constructed but not yet started.
    NotStarted,
    /// Started and processing events.
    Running,
    /// Stopped; no further transitions or pushes.
    Stopped,
}

/// Opaque reference to a running or stopped state-machine instance.
///
/// Cloning a handle clones the reference, not the actor: all clones address
/// the same instance, and clone identity is what the factory's memoization
/// guarantees are stated in terms of.
pub trait ActorHandle: Clone + 'static {
    /// Immutable description of machine state + context at a point in time.
    type Snapshot: Clone + 'static;
    /// Domain events accepted by `send`.
    type Event;

    /// Current lifecycle state.
    fn status(&self) -> ActorStatus;

    /// Begin processing. Idempotent for already-running actors.
    fn start(&self);

    /// Stop processing. After this, no pushes are delivered.
    fn stop(&self);

    /// Enqueue a domain event.
    fn send(&self, event: Self::Event);

    /// The actor's own current snapshot, polled directly.
    fn snapshot(&self) -> Self::Snapshot;

    /// Install a push callback, invoked once per emitted snapshot in
    /// emission order. The returned record tears the callback down.
    fn subscribe(&self, on_snapshot: impl Fn(&Self::Snapshot) + 'static) -> Subscription;

    /// Look up a subordinate actor registered under `id` in this actor's
    /// runtime registry. `None` when no registration exists right now;
    /// lookups are not retried or awaited.
    fn child(&self, id: &str) -> Option<Self>;
}

/// A description an external runtime can instantiate.
pub trait ActorLogic: 'static {
    /// Handle type produced by [`ActorLogic::spawn`].
    type Handle: ActorHandle;

    /// Instantiate a fresh, not-yet-started actor from this description.
    fn spawn(&self) -> Self::Handle;
}

/// A live subscription's teardown record.
///
/// Holds the unsubscribe action; [`Subscription::unsubscribe`] and `Drop`
/// both run it, and it runs at most once no matter how many teardown paths
/// fire.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an unsubscribe action.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that tears nothing down.
    #[must_use]
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Tear down now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// What a writable binding accepts: a domain event forwarded verbatim, or
/// the out-of-band restart command.
///
/// An explicit sum type, so a domain event can never be mistaken for the
/// control command no matter what it happens to equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<E> {
    /// Forward a domain event to the actor.
    Event(E),
    /// Stop the current actor, discard cached state and subscriptions, and
    /// lazily recreate a fresh actor on the next read.
    Restart,
}

/// A non-owned reference to an actor: a handle supplied directly, or a read
/// function that resolves one against the graph at access time.
pub enum ActorRef<H, G> {
    /// A handle supplied up front.
    Handle(H),
    /// Resolve the handle through the graph on every access.
    Read(Box<dyn Fn(&G) -> Result<H, BindError>>),
}

impl<H: ActorHandle, G> ActorRef<H, G> {
    /// Wrap a direct handle.
    #[must_use]
    pub fn handle(h: H) -> Self {
        Self::Handle(h)
    }

    /// Wrap a read function.
    #[must_use]
    pub fn read_with(f: impl Fn(&G) -> Result<H, BindError> + 'static) -> Self {
        Self::Read(Box::new(f))
    }

    /// Resolve the referenced handle.
    ///
    /// # Errors
    ///
    /// Whatever the read function surfaces; direct handles never fail.
    pub fn resolve(&self, graph: &G) -> Result<H, BindError> {
        match self {
            Self::Handle(h) => Ok(h.clone()),
            Self::Read(f) => f(graph),
        }
    }
}

impl<H, G> std::fmt::Debug for ActorRef<H, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Handle(_) => write!(f, "Handle(...)"),
            Self::Read(_) => write!(f, "Read(...)"),
        }
    }
}
