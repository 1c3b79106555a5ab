/*!
 * Root Subsystem
 *
 * A [`Root`] is an open directory that confines every path handed to it.
 * Paths are resolved component by component from the root's fd; neither
 * `..` nor a symlink (relative or absolute) can lead outside it, even if
 * the tree is modified concurrently.
 */

pub mod config;
pub(crate) mod handle;
mod ops;
pub(crate) mod resolve;
pub(crate) mod split;

pub use config::{AbsoluteSymlinks, RootConfig};

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use std::fmt;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::sync::Arc;

use crate::core::errors::{PathError, PathResult};
use crate::syscalls::fs::retry_eintr;
use handle::RootHandle;

/// An open directory that bounds path resolution
///
/// Clones share the same directory; closing any clone closes it for all.
#[derive(Clone)]
pub struct Root {
    inner: Arc<RootHandle>,
    config: RootConfig,
}

impl Root {
    /// Open `path` on the host as a root
    ///
    /// This is the only place an absolute path is accepted.
    pub fn open_dir(path: impl AsRef<Path>) -> PathResult<Self> {
        Self::open_dir_with_config(path, RootConfig::default())
    }

    pub fn open_dir_with_config(path: impl AsRef<Path>, config: RootConfig) -> PathResult<Self> {
        let path = path.as_ref();
        let flags = OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_CLOEXEC;
        let fd = retry_eintr(|| open(path, flags, Mode::empty()))
            .map_err(|errno| PathError::new("open", path, errno.into()))?;
        Ok(Self::from_fd_with_config(fd, path.to_string_lossy(), config))
    }

    /// Adopt an already open directory fd
    pub fn from_fd(fd: OwnedFd, name: impl Into<String>) -> Self {
        Self::from_fd_with_config(fd, name, RootConfig::default())
    }

    pub fn from_fd_with_config(fd: OwnedFd, name: impl Into<String>, config: RootConfig) -> Self {
        Self {
            inner: Arc::new(RootHandle::new(fd, name)),
            config,
        }
    }

    /// Name the root was opened with
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Close the root
    ///
    /// Never waits for operations in flight; the directory fd is released
    /// when the last of them finishes. Later operations fail with
    /// `Closed`. Closing twice is harmless.
    pub fn close(&self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub(crate) fn handle(&self) -> &RootHandle {
        &self.inner
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("name", &self.name())
            .field("closed", &self.is_closed())
            .field("config", &self.config)
            .finish()
    }
}
