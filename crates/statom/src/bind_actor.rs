#![forbid(unsafe_code)]

//! Actor factory and restart controller.
//!
//! # Design
//!
//! An [`ActorBinding`] lazily constructs exactly one actor per binding
//! instance. Construction is a query side effect triggered by read, never by
//! write: the first `read` runs the constructor once under an
//! [`InitScope`](crate::InitScope), spawns the handle, optionally starts it,
//! and memoizes it *before* returning, so no dependent can ever observe a
//! second construction. Repeated reads return clones of the same handle.
//!
//! Restart is the only disposal command: it stops the current handle if it
//! is running, clears the memoized slot, and leaves the next read to rebuild
//! from the constructor with a clean history. No snapshot, context, or
//! subscription survives a restart.
//!
//! # Invariants
//!
//! 1. The constructor runs at most once between restarts.
//! 2. The memoization write precedes the handle being returned.
//! 3. Writes (`send`, `restart`) to a never-read binding fail with
//!    [`BindError::NotInitialized`]; they do not construct.
//! 4. Non-owned bindings (child lookups) never start, stop, or restart
//!    their actor.

use std::cell::{Cell, RefCell};

use tracing::debug;

use crate::actor::{ActorHandle, ActorLogic, ActorStatus, Command};
use crate::error::BindError;
use crate::guard::{InitScope, ScopedGetter};
use crate::source::Source;

/// Construction options for an owned actor binding.
#[derive(Debug, Clone, Copy)]
pub struct BindOptions {
    /// Transition the freshly spawned actor to `Running` on first read.
    pub auto_start: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

impl BindOptions {
    /// Options with `auto_start` set.
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }
}

type Builder<H, G> = Box<dyn Fn(&ScopedGetter<G>) -> Result<H, BindError>>;

/// Lazily-constructed, memoized binding over one actor instance.
pub struct ActorBinding<H: ActorHandle, G> {
    builder: Builder<H, G>,
    options: BindOptions,
    /// Whether this binding owns the actor's lifecycle. False for
    /// subordinate actors resolved out of a parent's registry.
    owned: bool,
    cached: RefCell<Option<H>>,
    generation: Cell<u64>,
}

impl<H: ActorHandle, G: Clone + 'static> ActorBinding<H, G> {
    /// Bind a constructor: a literal actor description, or a factory
    /// deriving one from graph state.
    pub fn bind<L>(logic: Source<L, G>, options: BindOptions) -> Self
    where
        L: ActorLogic<Handle = H>,
    {
        Self::from_builder(
            move |get| logic.resolve_with(get, |l| l.spawn()),
            options,
            true,
        )
    }

    /// Bind with default options (`auto_start: true`).
    pub fn new<L>(logic: Source<L, G>) -> Self
    where
        L: ActorLogic<Handle = H>,
    {
        Self::bind(logic, BindOptions::default())
    }

    pub(crate) fn from_builder(
        builder: impl Fn(&ScopedGetter<G>) -> Result<H, BindError> + 'static,
        options: BindOptions,
        owned: bool,
    ) -> Self {
        Self {
            builder: Box::new(builder),
            options,
            owned,
            cached: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Read the bound actor, constructing it on first access.
    ///
    /// Idempotent: every read between restarts yields a clone of the same
    /// handle, and the construction routine runs exactly once.
    ///
    /// # Errors
    ///
    /// Propagates constructor failures (guard violations, missed lookups)
    /// unchanged.
    pub fn read(&self, graph: &G) -> Result<H, BindError> {
        if let Some(handle) = self.cached.borrow().as_ref() {
            return Ok(handle.clone());
        }
        let scope = InitScope::new();
        let get = scope.getter(graph.clone());
        let built = (self.builder)(&get);
        scope.expire();
        let handle = built?;
        if self.owned && self.options.auto_start {
            handle.start();
        }
        debug!(
            generation = self.generation.get(),
            owned = self.owned,
            auto_start = self.options.auto_start,
            "actor constructed"
        );
        // Memoize before returning so no dependent observes a second build.
        *self.cached.borrow_mut() = Some(handle.clone());
        Ok(handle)
    }

    /// The memoized handle, if a read has constructed one.
    #[must_use]
    pub fn peek(&self) -> Option<H> {
        self.cached.borrow().clone()
    }

    /// Forward a domain event verbatim to the current actor.
    ///
    /// # Errors
    ///
    /// [`BindError::NotInitialized`] if the binding was never read.
    pub fn send(&self, event: H::Event) -> Result<(), BindError> {
        let handle = self.peek().ok_or(BindError::NotInitialized)?;
        handle.send(event);
        Ok(())
    }

    /// Stop the current actor and force the next read to rebuild.
    ///
    /// # Errors
    ///
    /// [`BindError::NotOwned`] for bindings over a parent's subordinate
    /// actor; [`BindError::NotInitialized`] if the binding was never read.
    pub fn restart(&self) -> Result<(), BindError> {
        if !self.owned {
            return Err(BindError::NotOwned);
        }
        let handle = self
            .cached
            .borrow_mut()
            .take()
            .ok_or(BindError::NotInitialized)?;
        if handle.status() == ActorStatus::Running {
            handle.stop();
        }
        self.generation.set(self.generation.get() + 1);
        debug!(generation = self.generation.get(), "actor restarted");
        Ok(())
    }

    /// Dispatch a write: a domain event or the restart command.
    ///
    /// # Errors
    ///
    /// As [`ActorBinding::send`] and [`ActorBinding::restart`].
    pub fn command(&self, command: Command<H::Event>) -> Result<(), BindError> {
        match command {
            Command::Event(event) => self.send(event),
            Command::Restart => self.restart(),
        }
    }

    /// Stop the actor (if running) and clear the memoized handle without
    /// the ownership check. Last-unmount disposal for owned bindings.
    pub(crate) fn dispose(&self) {
        if !self.owned {
            return;
        }
        if let Some(handle) = self.cached.borrow_mut().take() {
            if handle.status() == ActorStatus::Running {
                handle.stop();
            }
            debug!("actor disposed on last unmount");
        }
    }

    /// Whether this binding owns its actor's lifecycle.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Number of restarts processed so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }
}

impl<H: ActorHandle, G> std::fmt::Debug for ActorBinding<H, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorBinding")
            .field("constructed", &self.cached.borrow().is_some())
            .field("owned", &self.owned)
            .field("generation", &self.generation.get())
            .finish()
    }
}
