#![forbid(unsafe_code)]

//! Scripted transition-actor runtime double.
//!
//! [`TestLogic`] is a pure-transition actor description: an initial
//! snapshot, a `fn(&S, &E) -> S` transition, and optionally children
//! registered under string identifiers. Spawning it yields a
//! [`TestHandle`] whose pushes are delivered synchronously to subscribers
//! in registration order, with dead subscribers pruned on notify; the
//! same weak-callback scheme as a UI observable, so binding tests exercise
//! exactly the push cadence the core is specified against.
//!
//! Instrumentation: a shared spawn counter (for single-construction
//! assertions), per-handle push counts, and `ptr_eq` for reference
//! equality.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use statom::{ActorHandle, ActorLogic, ActorStatus, Subscription};

type TransitionFn<S, E> = Rc<dyn Fn(&S, &E) -> S>;
type CallbackRc<S> = Rc<dyn Fn(&S)>;
type CallbackWeak<S> = Weak<dyn Fn(&S)>;

/// Shared construction counter for a logic value and all its clones.
#[derive(Clone, Debug, Default)]
pub struct SpawnCounter(Rc<Cell<u64>>);

impl SpawnCounter {
    /// Number of spawns performed so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.0.get()
    }
}

/// A scripted actor description.
pub struct TestLogic<S, E> {
    initial: S,
    transition: TransitionFn<S, E>,
    children: Vec<(String, TestLogic<S, E>)>,
    spawns: SpawnCounter,
}

impl<S: Clone + 'static, E: 'static> TestLogic<S, E> {
    /// Logic with the given initial snapshot and pure transition.
    #[must_use]
    pub fn new(initial: S, transition: impl Fn(&S, &E) -> S + 'static) -> Self {
        Self {
            initial,
            transition: Rc::new(transition),
            children: Vec::new(),
            spawns: SpawnCounter::default(),
        }
    }

    /// Register a child logic under `id`. Children are spawned (and later
    /// started) together with their parent, so registration is complete by
    /// the time the parent's constructor returns.
    #[must_use]
    pub fn with_child(mut self, id: impl Into<String>, child: TestLogic<S, E>) -> Self {
        self.children.push((id.into(), child));
        self
    }

    /// Handle on the shared spawn counter; keep a clone before moving the
    /// logic into a binding.
    #[must_use]
    pub fn spawn_counter(&self) -> SpawnCounter {
        self.spawns.clone()
    }
}

impl<S: Clone + 'static, E: 'static> ActorLogic for TestLogic<S, E> {
    type Handle = TestHandle<S, E>;

    fn spawn(&self) -> Self::Handle {
        self.spawns.0.set(self.spawns.0.get() + 1);
        let children = self
            .children
            .iter()
            .map(|(id, logic)| (id.clone(), logic.spawn()))
            .collect();
        TestHandle {
            inner: Rc::new(HandleInner {
                status: Cell::new(ActorStatus::NotStarted),
                state: RefCell::new(self.initial.clone()),
                transition: Rc::clone(&self.transition),
                subscribers: RefCell::new(Vec::new()),
                children,
                pushes: Cell::new(0),
                polls: Cell::new(0),
            }),
        }
    }
}

/// A unit-snapshot actor that ignores every event. Stand-in wherever a
/// binding needs an actor but no behavior.
#[must_use]
pub fn idle_logic<E: 'static>() -> TestLogic<(), E> {
    TestLogic::new((), |(), _| ())
}

struct HandleInner<S, E> {
    status: Cell<ActorStatus>,
    state: RefCell<S>,
    transition: TransitionFn<S, E>,
    subscribers: RefCell<Vec<CallbackWeak<S>>>,
    children: HashMap<String, TestHandle<S, E>>,
    pushes: Cell<u64>,
    polls: Cell<u64>,
}

/// Reference to a spawned scripted actor. Clones address the same instance.
pub struct TestHandle<S, E> {
    inner: Rc<HandleInner<S, E>>,
}

impl<S, E> Clone for TestHandle<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Clone + 'static, E: 'static> TestHandle<S, E> {
    /// Whether two handles address the same actor instance.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.inner, &b.inner)
    }

    /// Overwrite the snapshot and push it, bypassing the transition.
    /// For driving bridge tests from "outside" the machine.
    pub fn push(&self, snapshot: S) {
        *self.inner.state.borrow_mut() = snapshot;
        self.notify();
    }

    /// Number of pushes delivered so far.
    #[must_use]
    pub fn pushes(&self) -> u64 {
        self.inner.pushes.get()
    }

    /// Number of direct `snapshot()` polls served so far. Lets tests assert
    /// that cached reads never touch the actor.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.inner.polls.get()
    }

    /// Live subscriber count (dead entries pruned first).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|w| w.strong_count() > 0);
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self) {
        self.inner.pushes.set(self.inner.pushes.get() + 1);
        // Collect live callbacks first so the borrow is not held while
        // callbacks run (a callback may subscribe or read).
        let callbacks: Vec<CallbackRc<S>> = {
            let mut subs = self.inner.subscribers.borrow_mut();
            subs.retain(|w| w.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };
        let snapshot = self.inner.state.borrow().clone();
        for cb in &callbacks {
            cb(&snapshot);
        }
    }
}

impl<S: Clone + 'static, E: 'static> ActorHandle for TestHandle<S, E> {
    type Snapshot = S;
    type Event = E;

    fn status(&self) -> ActorStatus {
        self.inner.status.get()
    }

    fn start(&self) {
        if self.inner.status.get() == ActorStatus::NotStarted {
            self.inner.status.set(ActorStatus::Running);
            for child in self.inner.children.values() {
                child.start();
            }
        }
    }

    fn stop(&self) {
        self.inner.status.set(ActorStatus::Stopped);
        for child in self.inner.children.values() {
            child.stop();
        }
    }

    fn send(&self, event: E) {
        // Events to a non-running actor are dropped, as a real runtime
        // drops them.
        if self.inner.status.get() != ActorStatus::Running {
            return;
        }
        let next = {
            let state = self.inner.state.borrow();
            (self.inner.transition)(&state, &event)
        };
        *self.inner.state.borrow_mut() = next;
        self.notify();
    }

    fn snapshot(&self) -> S {
        self.inner.polls.set(self.inner.polls.get() + 1);
        self.inner.state.borrow().clone()
    }

    fn subscribe(&self, on_snapshot: impl Fn(&S) + 'static) -> Subscription {
        let strong: CallbackRc<S> = Rc::new(on_snapshot);
        let weak = Rc::downgrade(&strong);
        self.inner.subscribers.borrow_mut().push(weak);
        // The subscription owns the only strong reference; cancelling drops
        // it and the weak entry is pruned on the next notify.
        Subscription::new(move || drop(strong))
    }

    fn child(&self, id: &str) -> Option<Self> {
        self.inner.children.get(id).cloned()
    }
}

impl<S: std::fmt::Debug, E> std::fmt::Debug for TestHandle<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestHandle")
            .field("status", &self.inner.status.get())
            .field("state", &self.inner.state.borrow())
            .field("pushes", &self.inner.pushes.get())
            .finish()
    }
}
