/*!
 * Root Reference Guard
 *
 * Scoped acquire/release of a root handle's reference count
 */

use std::os::fd::BorrowedFd;

use crate::core::errors::Result;
use crate::root::handle::RootHandle;

/// One counted reference on a root handle
///
/// While this guard lives the root fd cannot be physically closed, even if
/// [`Root::close`](crate::Root::close) runs concurrently.
#[derive(Debug)]
pub struct RootRef<'a> {
    handle: &'a RootHandle,
}

impl<'a> RootRef<'a> {
    /// Take a reference, failing with `Closed` if the root is closed
    pub(crate) fn acquire(handle: &'a RootHandle) -> Result<Self> {
        handle.acquire()?;
        Ok(Self { handle })
    }

    /// The root directory fd
    #[inline]
    pub fn fd(&self) -> BorrowedFd<'_> {
        // SAFETY: this guard holds a reference for as long as the borrow lives.
        unsafe { self.handle.borrow_fd() }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.handle.name()
    }
}

impl Drop for RootRef<'_> {
    fn drop(&mut self) {
        self.handle.release();
    }
}
