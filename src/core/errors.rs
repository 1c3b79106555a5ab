/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use nix::errno::Errno;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cause of a failed root operation
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum RootError {
    #[error("root is closed")]
    #[diagnostic(
        code(root::closed),
        help("The root was closed before this operation started. Open a new root.")
    )]
    Closed,

    #[error("path escapes from parent")]
    #[diagnostic(
        code(root::escapes_root),
        help("A `..` component or symlink target points outside the root directory.")
    )]
    EscapesRoot,

    #[error("too many levels of symbolic links")]
    #[diagnostic(
        code(root::too_many_links),
        help("Symlink chain exceeds the configured hop limit. Check for loops.")
    )]
    TooManyLinks,

    #[error("file name too long")]
    #[diagnostic(
        code(root::budget_exceeded),
        help("Resolution exceeded both the step and restart ceilings.")
    )]
    ResolutionBudgetExceeded,

    #[error("no such file or directory")]
    #[diagnostic(code(root::not_exist))]
    NotExist,

    #[error("not a directory")]
    #[diagnostic(code(root::not_a_directory))]
    NotADirectory,

    #[error("invalid path: {0}")]
    #[diagnostic(
        code(root::invalid_path),
        help("Paths must be non-empty, relative and free of NUL bytes.")
    )]
    InvalidPath(String),

    #[error("invalid argument")]
    #[diagnostic(code(root::invalid_argument))]
    InvalidArgument,

    #[error("{}", .0.desc())]
    #[diagnostic(code(root::os))]
    Os(Errno),
}

impl RootError {
    /// Equivalent errno for this cause
    pub fn errno(&self) -> Errno {
        match self {
            RootError::Closed => Errno::EBADF,
            RootError::EscapesRoot => Errno::EXDEV,
            RootError::TooManyLinks => Errno::ELOOP,
            RootError::ResolutionBudgetExceeded => Errno::ENAMETOOLONG,
            RootError::NotExist => Errno::ENOENT,
            RootError::NotADirectory => Errno::ENOTDIR,
            RootError::InvalidPath(_) | RootError::InvalidArgument => Errno::EINVAL,
            RootError::Os(errno) => *errno,
        }
    }

    #[inline]
    pub fn is_not_exist(&self) -> bool {
        matches!(self, RootError::NotExist)
    }
}

impl From<Errno> for RootError {
    fn from(errno: Errno) -> Self {
        match errno {
            Errno::ENOENT => RootError::NotExist,
            Errno::ENOTDIR => RootError::NotADirectory,
            Errno::ELOOP => RootError::TooManyLinks,
            Errno::ENAMETOOLONG => RootError::ResolutionBudgetExceeded,
            Errno::EINVAL => RootError::InvalidArgument,
            other => RootError::Os(other),
        }
    }
}

impl From<io::Error> for RootError {
    /// Errors from reading or writing an already opened file
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(raw) => Errno::from_raw(raw).into(),
            None => RootError::Os(Errno::EIO),
        }
    }
}

impl From<RootError> for io::Error {
    fn from(err: RootError) -> Self {
        match err {
            RootError::Closed => io::Error::new(io::ErrorKind::Other, err),
            RootError::EscapesRoot => io::Error::new(io::ErrorKind::PermissionDenied, err),
            RootError::InvalidPath(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            other => io::Error::from_raw_os_error(other.errno() as i32),
        }
    }
}

/// Error from a single-path operation, qualified with the operation name
/// and the path exactly as the caller supplied it
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("{op} {}: {source}", path.display())]
pub struct PathError {
    pub op: &'static str,
    pub path: PathBuf,
    #[source]
    #[diagnostic_source]
    pub source: RootError,
}

impl PathError {
    pub fn new(op: &'static str, path: impl AsRef<Path>, source: RootError) -> Self {
        Self {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Strip the operation/path qualification
    pub fn into_source(self) -> RootError {
        self.source
    }
}

impl From<PathError> for io::Error {
    fn from(err: PathError) -> Self {
        let kind = io::Error::from(err.source.clone()).kind();
        io::Error::new(kind, err)
    }
}

/// Error from a two-path operation (rename, link)
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("{op} {} {}: {source}", old.display(), new.display())]
pub struct LinkError {
    pub op: &'static str,
    pub old: PathBuf,
    pub new: PathBuf,
    #[source]
    #[diagnostic_source]
    pub source: RootError,
}

impl LinkError {
    pub fn new(
        op: &'static str,
        old: impl AsRef<Path>,
        new: impl AsRef<Path>,
        source: RootError,
    ) -> Self {
        Self {
            op,
            old: old.as_ref().to_path_buf(),
            new: new.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn into_source(self) -> RootError {
        self.source
    }
}

impl From<LinkError> for io::Error {
    fn from(err: LinkError) -> Self {
        let kind = io::Error::from(err.source.clone()).kind();
        io::Error::new(kind, err)
    }
}

/// Result type for single-path root operations
pub type PathResult<T> = std::result::Result<T, PathError>;

/// Result type for two-path root operations
pub type LinkResult<T> = std::result::Result<T, LinkError>;

/// Result type for internal resolution
pub type Result<T> = std::result::Result<T, RootError>;
