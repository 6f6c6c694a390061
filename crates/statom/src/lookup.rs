#![forbid(unsafe_code)]

//! Actor-by-identity lookup.
//!
//! A parent actor's construction synchronously registers its children, so a
//! lookup performed at binding-construction time either finds the
//! registration or fails immediately with
//! [`BindError::NotFound`]; there is no retry and nothing to await.
//!
//! The resolved handle goes through the same read-once memoization as a
//! spawned actor, but the binding is non-owned: it may read the child and
//! send events to it, and must never start, stop, or restart it. Disposal
//! belongs to the parent.

use crate::actor::{ActorHandle, ActorRef};
use crate::bind_actor::{ActorBinding, BindOptions};
use crate::error::BindError;
use crate::source::Source;

impl<H: ActorHandle, G: Clone + 'static> ActorBinding<H, G> {
    /// Bind the subordinate actor registered under `id` in `parent`'s
    /// runtime registry.
    ///
    /// The identifier may be a literal or derived from graph state through
    /// the guarded read capability. Resolution happens on first read; a
    /// missing registration at that moment surfaces as
    /// [`BindError::NotFound`].
    pub fn for_child(parent: ActorRef<H, G>, id: impl Into<Source<String, G>>) -> Self {
        let id = id.into();
        Self::from_builder(
            move |get| {
                let parent = get.with(|graph| parent.resolve(graph))??;
                let id = id.resolve(get)?;
                parent
                    .child(&id)
                    .ok_or(BindError::NotFound { id })
            },
            // Children are already running under their parent; never
            // auto-start them.
            BindOptions::default().with_auto_start(false),
            false,
        )
    }
}
