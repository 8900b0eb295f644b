//! Error taxonomy for curried and memoized calls
//!
//! Only construction problems are engine-local. Anything the wrapped function
//! returns travels back inside `CurryError::Target` untouched: `Display` and
//! `source()` forward to it, and `into_target` hands the original value back.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CurryError<E> {
    /// The target cannot be curried: not callable, arity unknown and not
    /// supplied, or arity above the configured limit
    InvalidTarget(String),
    /// The wrapped function failed during its single invocation
    Target(E),
}

impl<E> CurryError<E> {
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        CurryError::InvalidTarget(reason.into())
    }

    pub fn is_invalid_target(&self) -> bool {
        matches!(self, CurryError::InvalidTarget(_))
    }

    /// Borrow the wrapped function's error, if that is what this is
    pub fn target_error(&self) -> Option<&E> {
        match self {
            CurryError::Target(e) => Some(e),
            CurryError::InvalidTarget(_) => None,
        }
    }

    /// Recover the wrapped function's original error value
    pub fn into_target(self) -> Option<E> {
        match self {
            CurryError::Target(e) => Some(e),
            CurryError::InvalidTarget(_) => None,
        }
    }

    pub fn map_target<F>(self, f: impl FnOnce(E) -> F) -> CurryError<F> {
        match self {
            CurryError::InvalidTarget(reason) => CurryError::InvalidTarget(reason),
            CurryError::Target(e) => CurryError::Target(f(e)),
        }
    }
}

impl<E: fmt::Display> fmt::Display for CurryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurryError::InvalidTarget(reason) => write!(f, "Invalid curry target: {}", reason),
            CurryError::Target(e) => e.fmt(f),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for CurryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CurryError::Target(e) => e.source(),
            CurryError::InvalidTarget(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[derive(Debug, PartialEq)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "inner cause")
        }
    }

    impl Error for Inner {}

    #[derive(Debug, PartialEq)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "outer failure")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_target_error_is_transparent() {
        let err: CurryError<Outer> = CurryError::Target(Outer(Inner));
        assert_eq!(err.to_string(), "outer failure");
        assert_eq!(err.source().map(|s| s.to_string()), Some("inner cause".into()));
        assert_eq!(err.into_target(), Some(Outer(Inner)));
    }

    #[test]
    fn test_invalid_target_display() {
        let err: CurryError<String> = CurryError::invalid_target("Int is not callable");
        assert!(err.is_invalid_target());
        assert_eq!(err.to_string(), "Invalid curry target: Int is not callable");
        assert!(err.target_error().is_none());
    }

    #[test]
    fn test_map_target() {
        let err: CurryError<i32> = CurryError::Target(4);
        assert_eq!(err.map_target(|n| n * 2), CurryError::Target(8));

        let err: CurryError<i32> = CurryError::invalid_target("nope");
        assert_eq!(
            err.map_target(|n| n.to_string()),
            CurryError::InvalidTarget("nope".to_string())
        );
    }
}
