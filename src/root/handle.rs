/*!
 * Root Handle Lifecycle
 *
 * Owns the root directory fd and decides when it is physically closed.
 * In-flight operations hold counted references; `close` only marks the
 * handle closed, and the fd goes away on whichever of `close` or the last
 * `release` happens second.
 */

use parking_lot::Mutex;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use tracing::debug;

use crate::core::errors::{Result, RootError};

#[derive(Debug)]
struct RootState {
    /// Operations currently using the fd
    refs: usize,
    /// Set once by `close`, never cleared
    closed: bool,
    /// `None` once physically released
    fd: Option<OwnedFd>,
}

/// Shared directory resource behind a [`Root`](crate::Root)
#[derive(Debug)]
pub(crate) struct RootHandle {
    name: String,
    raw: RawFd,
    state: Mutex<RootState>,
}

impl RootHandle {
    pub(crate) fn new(fd: OwnedFd, name: impl Into<String>) -> Self {
        let name = name.into();
        let raw = fd.as_raw_fd();
        debug!(root = %name, fd = raw, "root opened");
        Self {
            name,
            raw,
            state: Mutex::new(RootState {
                refs: 0,
                closed: false,
                fd: Some(fd),
            }),
        }
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Take a reference for the duration of one operation
    pub(crate) fn acquire(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RootError::Closed);
        }
        state.refs += 1;
        Ok(())
    }

    /// Drop a reference taken by [`acquire`](Self::acquire)
    ///
    /// # Panics
    ///
    /// Panics when no reference is held. An unbalanced release means the
    /// fd may already be gone under another operation.
    pub(crate) fn release(&self) {
        let released = {
            let mut state = self.state.lock();
            if state.refs == 0 {
                panic!("bad root refcount");
            }
            state.refs -= 1;
            if state.closed && state.refs == 0 {
                state.fd.take()
            } else {
                None
            }
        };
        if let Some(fd) = released {
            debug!(root = %self.name, fd = fd.as_raw_fd(), "root released after last operation");
            drop(fd);
        }
    }

    /// Mark the handle closed; never blocks on in-flight operations
    pub(crate) fn close(&self) {
        let released = {
            let mut state = self.state.lock();
            state.closed = true;
            if state.refs == 0 {
                state.fd.take()
            } else {
                debug!(
                    root = %self.name,
                    refs = state.refs,
                    "root closed with operations in flight, release deferred"
                );
                None
            }
        };
        if let Some(fd) = released {
            debug!(root = %self.name, fd = fd.as_raw_fd(), "root released on close");
            drop(fd);
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn active_refs(&self) -> usize {
        self.state.lock().refs
    }

    /// Whether the fd has been physically closed
    pub(crate) fn is_released(&self) -> bool {
        self.state.lock().fd.is_none()
    }

    /// Borrow the root fd.
    ///
    /// # Safety
    ///
    /// The caller must hold a reference from [`acquire`](Self::acquire) for
    /// the whole lifetime of the returned fd; `refs > 0` keeps `state.fd`
    /// populated.
    pub(crate) unsafe fn borrow_fd(&self) -> BorrowedFd<'_> {
        BorrowedFd::borrow_raw(self.raw)
    }
}
