/*!
 * Core Types
 * Common types used across resolution and the syscall layer
 */

use nix::errno::Errno;
use std::ffi::OsString;

use super::errors::RootError;

/// Outcome of one directory-relative step
///
/// `Symlink` is control flow, not failure: the entry just looked at is a
/// symlink that should be followed, and the resolver splices its target
/// into the remaining path. It never reaches callers of the public API.
#[derive(Debug, PartialEq, Eq)]
pub enum Step<T> {
    Done(T),
    Failed(RootError),
    Symlink(OsString),
}

/// What an operation does with a final symlink written as `link/`
///
/// The kernel resolves such a name through the link even under
/// `AT_SYMLINK_NOFOLLOW`, so the resolver has to decide first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailing {
    /// Splice the link's target and keep walking
    Follow,
    /// Fail with this errno, leaving the link and its target alone
    Reject(Errno),
}

impl<T> Step<T> {
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Step<U> {
        match self {
            Step::Done(value) => Step::Done(f(value)),
            Step::Failed(err) => Step::Failed(err),
            Step::Symlink(target) => Step::Symlink(target),
        }
    }

    #[inline]
    pub fn is_symlink(&self) -> bool {
        matches!(self, Step::Symlink(_))
    }
}

impl<T, E: Into<RootError>> From<Result<T, E>> for Step<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Step::Done(value),
            Err(err) => Step::Failed(err.into()),
        }
    }
}
