#![forbid(unsafe_code)]

//! Deterministic test doubles for `statom`.
//!
//! Both of the core's external collaborators, scripted for tests:
//!
//! - [`TestGraph`]/[`GraphCell`]: a minimal pull-based read capability, plus
//!   [`MountDriver`] to model observer counting (mount on first arrival,
//!   unmount on last departure).
//! - [`TestLogic`]/[`TestHandle`]: a transition-function actor runtime with
//!   synchronous pushes, a child registry, and spawn/push instrumentation.
//!
//! Everything here is single-threaded and allocation-light; no timers, no
//! randomness, no I/O. A test that passes once passes always.

pub mod actor;
pub mod graph;

pub use actor::{SpawnCounter, TestHandle, TestLogic, idle_logic};
pub use graph::{GraphCell, MountDriver, TestGraph};
