#![forbid(unsafe_code)]

//! Bind push-based state-machine actors into a pull-based atom graph.
//!
//! # Role
//!
//! A reactive dependency graph expects values to be obtainable by
//! synchronous read at any time; an actor produces new states
//! asynchronously, through subscription callbacks that fire outside of any
//! read. `statom` is the adapter between the two. It guarantees:
//!
//! - exactly one actor instance per logical binding, however many times and
//!   from however many dependents it is read ([`ActorBinding`]);
//! - readers see the actor's *latest* state without recomputing the actor
//!   ([`SnapshotBridge`]);
//! - subscriptions are live only while at least one consumer observes the
//!   binding, and are torn down deterministically on the last consumer's
//!   departure ([`MountSlot`]);
//! - restart atomically discards the current actor, its cache, and its
//!   subscription, and lazily recreates a fresh actor on the next read
//!   ([`Command::Restart`]).
//!
//! # How it fits
//!
//! The reactive graph engine and the actor runtime are external
//! collaborators. The graph drives [`MachineBinding::read`]/[`MachineBinding::write`]
//! and the mount/unmount hooks; the runtime is reached through the
//! [`ActorLogic`]/[`ActorHandle`] seam. Reads flow downward (bridge →
//! factory → guarded constructor); notifications flow upward (actor emits →
//! subscription writes the cache → the graph's own propagation invalidates
//! dependents).
//!
//! Everything is single-threaded cooperative: reads, writes, and
//! subscription callbacks execute on one logical thread, and the core never
//! blocks.
//!
//! # Example
//!
//! ```ignore
//! use statom::{Command, MachineBinding, Source};
//!
//! let counter = MachineBinding::new(Source::value(counter_logic()));
//! counter.mount(&graph)?;                     // first observer
//! assert_eq!(counter.read(&graph)?, 0);
//! counter.write(Command::Event(Increment))?;  // actor pushes 1
//! assert_eq!(counter.read(&graph)?, 1);
//! counter.write(Command::Restart)?;           // fresh actor on next read
//! assert_eq!(counter.read(&graph)?, 0);
//! ```

pub mod actor;
pub mod bind_actor;
pub mod bind_machine;
pub mod bind_snapshot;
pub mod error;
pub mod guard;
pub mod lifecycle;
pub mod lookup;
pub mod source;

pub use actor::{ActorHandle, ActorLogic, ActorRef, ActorStatus, Command, Subscription};
pub use bind_actor::{ActorBinding, BindOptions};
pub use bind_machine::MachineBinding;
pub use bind_snapshot::SnapshotBridge;
pub use error::BindError;
pub use guard::{InitScope, ScopedGetter};
pub use lifecycle::MountSlot;
pub use source::Source;
