#![forbid(unsafe_code)]

//! Value-or-factory constructor parameters.
//!
//! The binding constructors accept either a literal value or a factory that
//! derives one from other graph state. Instead of a runtime type check, the
//! two cases are an explicit tagged union resolved with a single pattern
//! match. Factories receive the guarded read capability and may fail with
//! [`BindError::InitAccess`](crate::BindError::InitAccess) if they leak it
//! out of the constructor window.

use crate::error::BindError;
use crate::guard::ScopedGetter;

/// A literal `T`, or a factory deriving one from graph state.
///
/// `G` is the graph read-capability type the factory closes over.
pub enum Source<T, G> {
    /// A value supplied up front.
    Value(T),
    /// A factory invoked once per construction, under the identity guard.
    Derived(Box<dyn Fn(&ScopedGetter<G>) -> Result<T, BindError>>),
}

impl<T, G> Source<T, G> {
    /// Wrap a literal value.
    #[must_use]
    pub fn value(v: T) -> Self {
        Self::Value(v)
    }

    /// Wrap a factory.
    #[must_use]
    pub fn derived(f: impl Fn(&ScopedGetter<G>) -> Result<T, BindError> + 'static) -> Self {
        Self::Derived(Box::new(f))
    }

    /// Resolve to an owned `T`.
    ///
    /// # Errors
    ///
    /// Whatever the factory returns; literal values never fail.
    pub fn resolve(&self, get: &ScopedGetter<G>) -> Result<T, BindError>
    where
        T: Clone,
    {
        match self {
            Self::Value(v) => Ok(v.clone()),
            Self::Derived(f) => f(get),
        }
    }

    /// Resolve and apply `f` to the result without requiring `T: Clone`.
    ///
    /// # Errors
    ///
    /// Whatever the factory returns; literal values never fail.
    pub fn resolve_with<R>(
        &self,
        get: &ScopedGetter<G>,
        f: impl FnOnce(&T) -> R,
    ) -> Result<R, BindError> {
        match self {
            Self::Value(v) => Ok(f(v)),
            Self::Derived(d) => Ok(f(&d(get)?)),
        }
    }
}

impl<T, G> From<T> for Source<T, G> {
    fn from(v: T) -> Self {
        Self::Value(v)
    }
}

impl<G> From<&str> for Source<String, G> {
    fn from(v: &str) -> Self {
        Self::Value(v.to_owned())
    }
}

impl<T: std::fmt::Debug, G> std::fmt::Debug for Source<T, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Derived(_) => write!(f, "Derived(...)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::InitScope;

    #[test]
    fn literal_resolves_without_touching_graph() {
        let scope = InitScope::new();
        let get = scope.getter(());
        let src: Source<i32, ()> = Source::value(3);
        // A literal resolves even after expiry: it never reads.
        scope.expire();
        assert_eq!(src.resolve(&get), Ok(3));
    }

    #[test]
    fn derived_reads_through_guard() {
        let scope = InitScope::new();
        let get = scope.getter(21);
        let src: Source<i32, i32> = Source::derived(|get| get.with(|g| *g * 2));
        assert_eq!(src.resolve(&get), Ok(42));
    }

    #[test]
    fn derived_fails_after_expiry() {
        let scope = InitScope::new();
        let get = scope.getter(21);
        let src: Source<i32, i32> = Source::derived(|get| get.with(|g| *g));
        scope.expire();
        assert_eq!(src.resolve(&get), Err(BindError::InitAccess));
    }

    #[test]
    fn resolve_with_avoids_clone() {
        struct NoClone(i32);
        let scope = InitScope::new();
        let get = scope.getter(());
        let src: Source<NoClone, ()> = Source::value(NoClone(5));
        assert_eq!(src.resolve_with(&get, |v| v.0), Ok(5));
    }

    #[test]
    fn from_literal() {
        let src: Source<&str, ()> = "machine".into();
        assert!(matches!(src, Source::Value("machine")));
    }

    #[test]
    fn debug_format() {
        let lit: Source<i32, ()> = Source::value(1);
        assert_eq!(format!("{lit:?}"), "Value(1)");
        let der: Source<i32, ()> = Source::derived(|_| Ok(1));
        assert_eq!(format!("{der:?}"), "Derived(...)");
    }
}
