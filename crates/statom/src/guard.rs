#![forbid(unsafe_code)]

//! Re-entrancy guard for constructor read capabilities.
//!
//! # Design
//!
//! A binding's constructor runs exactly once to produce a committed actor.
//! During that run it may read other graph state through a capability; after
//! it returns, the same capability must be dead, because the actor is frozen
//! and could never react to later changes in anything the constructor read.
//!
//! [`InitScope`] owns an explicit expired flag. [`ScopedGetter`] clones share
//! the flag, so a getter smuggled out of the constructor (stored in a
//! closure, a struct field, anywhere) fails on its next use with
//! [`BindError::InitAccess`] instead of silently reading.
//!
//! This is a strict temporal contract, not an optimization: the flag is
//! checked on every access.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::BindError;

/// Owner of the expiry flag for one constructor invocation.
///
/// Create one scope per construction, hand out getters while the
/// constructor runs, then call [`InitScope::expire`] at the end of its
/// synchronous extent.
#[derive(Debug)]
pub struct InitScope {
    expired: Rc<Cell<bool>>,
}

impl InitScope {
    /// New, unexpired scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expired: Rc::new(Cell::new(false)),
        }
    }

    /// A read capability over `graph`, valid until this scope expires.
    #[must_use]
    pub fn getter<G>(&self, graph: G) -> ScopedGetter<G> {
        ScopedGetter {
            graph,
            expired: Rc::clone(&self.expired),
        }
    }

    /// Close the window. Every getter minted from this scope fails from
    /// now on.
    pub fn expire(&self) {
        self.expired.set(true);
    }
}

impl Default for InitScope {
    fn default() -> Self {
        Self::new()
    }
}

/// Read capability valid only during the synchronous extent of a
/// constructor callback.
///
/// Cloning is allowed (the flag is shared); using a clone after the scope
/// expired fails exactly like using the original.
#[derive(Debug)]
pub struct ScopedGetter<G> {
    graph: G,
    expired: Rc<Cell<bool>>,
}

impl<G: Clone> Clone for ScopedGetter<G> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            expired: Rc::clone(&self.expired),
        }
    }
}

impl<G> ScopedGetter<G> {
    /// Access the underlying graph read handle.
    ///
    /// # Errors
    ///
    /// [`BindError::InitAccess`] once the owning [`InitScope`] has expired.
    pub fn with<R>(&self, f: impl FnOnce(&G) -> R) -> Result<R, BindError> {
        if self.expired.get() {
            return Err(BindError::InitAccess);
        }
        Ok(f(&self.graph))
    }
}
