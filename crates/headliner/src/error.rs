// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for retrieval and cache operations.

use std::fmt;

/// An error from a remote call or from the cache coordinator.
///
/// Every layer of the crate threads this type through a [`CallResult`]: the
/// upstream collaborator produces it, the racing executor passes it through
/// unchanged, and the coordinator hands out [`ErrorKind::Unavailable`] when it
/// has nothing usable to answer with.
///
/// # Example
///
/// ```
/// use headliner::{Error, ErrorKind};
///
/// let error = Error::upstream("connection reset");
/// assert_eq!(error.kind(), ErrorKind::Upstream);
/// ```
#[ohno::error]
#[display("{kind}")]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    /// Creates an [`ErrorKind::Upstream`] error wrapping the given cause.
    pub fn upstream(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(ErrorKind::Upstream, cause)
    }

    /// Creates an [`ErrorKind::Unavailable`] error.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(ErrorKind::Unavailable)
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A remote call failed: transport, status, decoding or a missing record.
    Upstream,

    /// No usable result exists, either because the last refresh failed or
    /// because the coordinator is gone.
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream => f.write_str("upstream call failed"),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// The outcome of exactly one remote operation: a value or an [`Error`].
pub type CallResult<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn upstream_error_keeps_cause() {
        let error = Error::upstream("connection reset");

        assert_eq!(error.kind(), ErrorKind::Upstream);
        let display = error.to_string();
        assert!(display.starts_with("upstream call failed"), "unexpected message: {display}");
        assert!(display.contains("connection reset"), "cause missing from: {display}");
    }

    #[test]
    fn unavailable_has_no_source() {
        let error = Error::unavailable();

        assert_eq!(error.kind(), ErrorKind::Unavailable);
        let display = error.to_string();
        assert!(display.starts_with("unavailable"), "unexpected message: {display}");
        assert!(error.source().is_none());
    }
}
