#![forbid(unsafe_code)]

//! Minimal pull-based graph double.
//!
//! [`TestGraph`] is the read capability bindings see: a cloneable handle
//! with typed cells and a read counter. It deliberately implements no
//! scheduling or dependency tracking; the real graph engine is an external
//! collaborator, and tests only need a surface for derived constructors to
//! read through.
//!
//! [`MountDriver`] stands in for the graph's mount mechanism: it counts
//! observers and fires the mount hook on the first arrival and the unmount
//! hook on the last departure.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Cloneable read capability over test cells.
#[derive(Clone, Debug, Default)]
pub struct TestGraph {
    reads: Rc<Cell<u64>>,
}

impl TestGraph {
    /// Fresh graph with a zeroed read counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cell holding `value`.
    #[must_use]
    pub fn cell<T>(&self, value: T) -> GraphCell<T> {
        GraphCell {
            value: Rc::new(RefCell::new(value)),
        }
    }

    /// Read a cell through this capability.
    pub fn get<T: Clone>(&self, cell: &GraphCell<T>) -> T {
        self.reads.set(self.reads.get() + 1);
        cell.value.borrow().clone()
    }

    /// Number of reads performed through this capability (all clones
    /// share the counter).
    #[must_use]
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }
}

/// A single mutable value readable through [`TestGraph::get`].
#[derive(Debug)]
pub struct GraphCell<T> {
    value: Rc<RefCell<T>>,
}

impl<T> Clone for GraphCell<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
        }
    }
}

impl<T> GraphCell<T> {
    /// Overwrite the cell's value.
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
    }
}

/// Observer counting for a binding's mount lifecycle.
///
/// `on_first` fires on the 0→1 observer transition, `on_last` on 1→0,
/// the graph's "becomes actively observed" and "last-observer departure"
/// signals.
pub struct MountDriver {
    observers: Cell<usize>,
    on_first: Box<dyn Fn()>,
    on_last: Box<dyn Fn()>,
}

impl MountDriver {
    /// New driver with the given transition hooks.
    #[must_use]
    pub fn new(on_first: impl Fn() + 'static, on_last: impl Fn() + 'static) -> Self {
        Self {
            observers: Cell::new(0),
            on_first: Box::new(on_first),
            on_last: Box::new(on_last),
        }
    }

    /// An observer arrived. Fires `on_first` on the 0→1 transition.
    pub fn observe(&self) {
        let n = self.observers.get();
        self.observers.set(n + 1);
        if n == 0 {
            (self.on_first)();
        }
    }

    /// An observer departed. Fires `on_last` on the 1→0 transition; extra
    /// departures with no observers are ignored.
    pub fn depart(&self) {
        match self.observers.get() {
            0 => {}
            1 => {
                self.observers.set(0);
                (self.on_last)();
            }
            n => self.observers.set(n - 1),
        }
    }

    /// Current observer count.
    #[must_use]
    pub fn observers(&self) -> usize {
        self.observers.get()
    }
}

impl std::fmt::Debug for MountDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountDriver")
            .field("observers", &self.observers.get())
            .finish()
    }
}
