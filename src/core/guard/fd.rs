/*!
 * Directory Cursor Guard
 *
 * RAII guard for the directory a resolution is currently standing in
 */

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd};
use tracing::trace;

/// Current directory of a resolution
///
/// The root fd is only ever borrowed; intermediate directories are owned
/// and closed as soon as the cursor moves past them or is reset.
#[derive(Debug)]
pub enum DirGuard<'r> {
    Root(BorrowedFd<'r>),
    Opened(OwnedFd),
}

impl<'r> DirGuard<'r> {
    /// Start at the root directory
    #[inline]
    pub fn root(fd: BorrowedFd<'r>) -> Self {
        DirGuard::Root(fd)
    }

    /// Whether the cursor is at the root fd itself
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self, DirGuard::Root(_))
    }

    /// Descend into a freshly opened directory
    pub fn replace(&mut self, next: OwnedFd) {
        let prev = std::mem::replace(self, DirGuard::Opened(next));
        Self::close(prev);
    }

    /// Drop back to the root directory
    pub fn reset(&mut self, root: BorrowedFd<'r>) {
        let prev = std::mem::replace(self, DirGuard::Root(root));
        Self::close(prev);
    }

    fn close(prev: DirGuard<'r>) {
        if let DirGuard::Opened(fd) = prev {
            trace!(fd = fd.as_raw_fd(), "closing intermediate directory");
            drop(fd);
        }
    }
}

impl AsFd for DirGuard<'_> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            DirGuard::Root(fd) => fd.as_fd(),
            DirGuard::Opened(fd) => fd.as_fd(),
        }
    }
}
