#![forbid(unsafe_code)]

//! Composed read/write binding: snapshot bridge layered over the actor
//! factory.
//!
//! # Design
//!
//! A [`MachineBinding`] is the surface most consumers want: its read yields
//! the actor's current snapshot, its write accepts a [`Command`]: a domain
//! event forwarded verbatim, or [`Command::Restart`]. Internally it is
//! exactly the layered composition: an [`ActorBinding`] owning construction
//! and restart, with a [`SnapshotBridge`] reading through it for caching and
//! subscription lifetime. The factory holds no snapshot cache of its own.
//!
//! Restart ordering matters: the bridge detaches (unsubscribe + cache
//! clear) *before* the old actor is stopped, so no final push from the
//! dying actor can land in the cache the fresh actor will own, and no
//! window exists in which two actors coexist.
//!
//! Mounting counts as a read: attaching the bridge resolves the actor,
//! constructing it if no read has yet. On the last consumer's departure the
//! teardown unsubscribes, clears the cache, and (for owned actors only)
//! stops the actor and clears the memoized handle, so the next observation
//! starts from a clean history.

use std::rc::Rc;

use tracing::debug;

use crate::actor::{ActorHandle, ActorLogic, ActorRef, Command};
use crate::bind_actor::{ActorBinding, BindOptions};
use crate::bind_snapshot::SnapshotBridge;
use crate::error::BindError;
use crate::source::Source;

/// Readable/writable binding over one state-machine actor.
pub struct MachineBinding<H: ActorHandle, G> {
    actor: Rc<ActorBinding<H, G>>,
    bridge: SnapshotBridge<H, G>,
}

impl<H: ActorHandle, G: Clone + 'static> MachineBinding<H, G> {
    /// Bind a constructor with explicit options.
    pub fn bind<L>(logic: Source<L, G>, options: BindOptions) -> Self
    where
        L: ActorLogic<Handle = H>,
    {
        Self::over(Rc::new(ActorBinding::bind(logic, options)))
    }

    /// Bind a constructor with default options (`auto_start: true`).
    pub fn new<L>(logic: Source<L, G>) -> Self
    where
        L: ActorLogic<Handle = H>,
    {
        Self::bind(logic, BindOptions::default())
    }

    /// Bind a subordinate actor looked up in `parent`'s registry. The
    /// resulting binding reads and sends but never restarts or stops the
    /// child.
    pub fn for_child(parent: ActorRef<H, G>, id: impl Into<Source<String, G>>) -> Self {
        Self::over(Rc::new(ActorBinding::for_child(parent, id)))
    }

    /// Layer a bridge over an existing factory binding.
    pub fn over(actor: Rc<ActorBinding<H, G>>) -> Self {
        let reader = Rc::clone(&actor);
        let bridge = SnapshotBridge::read_with(move |graph| reader.read(graph));
        Self { actor, bridge }
    }

    /// Current snapshot: cached while observed, polled directly otherwise.
    /// Constructs the actor on first access.
    ///
    /// # Errors
    ///
    /// Propagates constructor failures unchanged.
    pub fn read(&self, graph: &G) -> Result<H::Snapshot, BindError> {
        self.bridge.read(graph)
    }

    /// Write a domain event or the restart command.
    ///
    /// # Errors
    ///
    /// [`BindError::NotInitialized`] before the first read;
    /// [`BindError::NotOwned`] when restarting a child binding.
    pub fn write(&self, command: Command<H::Event>) -> Result<(), BindError> {
        match command {
            Command::Event(event) => self.actor.send(event),
            Command::Restart => {
                // Reject before touching the bridge: a rejected restart
                // must leave the child's subscription untouched.
                if !self.actor.is_owned() {
                    return Err(BindError::NotOwned);
                }
                if self.actor.peek().is_none() {
                    return Err(BindError::NotInitialized);
                }
                self.bridge.detach();
                self.actor.restart()?;
                debug!(generation = self.actor.generation(), "machine binding restarted");
                Ok(())
            }
        }
    }

    /// First active consumer arrived. Attaches the bridge (constructing
    /// the actor if needed) and registers the last-consumer teardown.
    ///
    /// # Errors
    ///
    /// Propagates constructor failures unchanged.
    pub fn mount(&self, graph: &G) -> Result<(), BindError> {
        let actor = Rc::clone(&self.actor);
        self.bridge.mount_with(graph, move || actor.dispose())
    }

    /// Last consumer departed. Idempotent.
    pub fn unmount(&self) {
        self.bridge.unmount();
    }

    /// The underlying factory binding, for consumers that need the handle
    /// itself (send-only users, child lookup roots).
    #[must_use]
    pub fn actor(&self) -> &Rc<ActorBinding<H, G>> {
        &self.actor
    }

    /// Whether at least one consumer is observing this binding.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        self.bridge.is_observed()
    }
}

impl<H: ActorHandle, G> std::fmt::Debug for MachineBinding<H, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineBinding")
            .field("actor", &self.actor)
            .field("bridge", &self.bridge)
            .finish()
    }
}
