#![forbid(unsafe_code)]

//! Error taxonomy for binding contracts.
//!
//! Every variant is a programming-contract violation, not a transient
//! failure: none are retried internally, and all surface synchronously at
//! the call site that violated the contract. Failures inside the actor
//! runtime itself (a panicking `send`, for example) are not wrapped here;
//! they propagate unchanged.

/// Errors from binding operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A constructor's read capability was used after its synchronous
    /// window closed.
    InitAccess,
    /// A write reached a binding that was never read, so no actor exists.
    NotInitialized,
    /// No actor is registered under this identifier in the parent's
    /// runtime registry.
    NotFound {
        /// The identifier that missed.
        id: String,
    },
    /// Restart was requested on a binding that does not own its actor.
    NotOwned,
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitAccess => write!(f, "get not allowed after initialization"),
            Self::NotInitialized => {
                write!(f, "no actor exists yet: read the binding before writing to it")
            }
            Self::NotFound { id } => write!(f, "no actor registered under id '{id}'"),
            Self::NotOwned => {
                write!(f, "cannot restart an actor owned by its parent")
            }
        }
    }
}

impl std::error::Error for BindError {}
