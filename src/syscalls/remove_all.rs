/*!
 * Recursive Remove
 *
 * Removes a name and everything below it, using only fds opened
 * relative to the parent so a concurrently swapped-in symlink is removed
 * rather than followed.
 */

use nix::dir::Dir;
use nix::errno::Errno;
use nix::fcntl::{openat, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{unlinkat, UnlinkatFlags};
use std::ffi::{OsStr, OsString};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::ffi::OsStrExt;
use tracing::trace;

use super::fs::retry_eintr;
use crate::core::errors::{Result, RootError};
use crate::core::limits::REMOVE_ALL_BATCH;

/// Remove `name` in `parent`, recursing into directories
///
/// A missing `name` is not an error. The first failure met while
/// emptying a directory is reported if the directory itself cannot be
/// removed afterwards.
pub(crate) fn remove_all_from(parent: BorrowedFd<'_>, name: &OsStr) -> Result<()> {
    if name == OsStr::new(".") || name == OsStr::new("..") {
        return Err(RootError::InvalidArgument);
    }

    // Files, symlinks and already-gone entries are done here.
    let unlink_err = match retry_eintr(|| unlinkat(parent, name, UnlinkatFlags::NoRemoveDir)) {
        Ok(()) | Err(Errno::ENOENT) => return Ok(()),
        // EPERM/EACCES: no write access to parent, but name may still be a
        // directory whose contents we can clear
        Err(err @ (Errno::EISDIR | Errno::EPERM | Errno::EACCES)) => err,
        Err(err) => return Err(err.into()),
    };

    let mut first_err: Option<RootError> = None;
    loop {
        let flags = OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_NOFOLLOW | OFlag::O_CLOEXEC;
        let child = match retry_eintr(|| openat(parent, name, flags, Mode::empty())) {
            Ok(fd) => fd,
            Err(Errno::ENOENT) => return Ok(()),
            Err(Errno::ENOTDIR | Errno::ELOOP) => return Err(unlink_err.into()),
            Err(err) => {
                first_err.get_or_insert(err.into());
                break;
            }
        };

        let (batch, exhausted) = match read_batch(child.as_fd()) {
            Ok(batch) => batch,
            Err(Errno::ENOENT) => return Ok(()),
            Err(err) => {
                first_err.get_or_insert(err.into());
                break;
            }
        };

        let mut removed = 0usize;
        for entry in &batch {
            match remove_all_from(child.as_fd(), entry) {
                Ok(()) => removed += 1,
                Err(err) => {
                    trace!(entry = ?entry, error = %err, "remove-all entry failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        // Removing entries may reshuffle the directory; re-open and rescan
        // rather than keep reading from the same stream.
        if exhausted || removed == 0 {
            break;
        }
    }

    match retry_eintr(|| unlinkat(parent, name, UnlinkatFlags::RemoveDir)) {
        Ok(()) | Err(Errno::ENOENT) => Ok(()),
        Err(err) => Err(first_err.unwrap_or_else(|| err.into())),
    }
}

/// Read up to `REMOVE_ALL_BATCH` entry names; the flag says whether the
/// directory ran out before the batch filled
fn read_batch(dir: BorrowedFd<'_>) -> nix::Result<(Vec<OsString>, bool)> {
    let mut stream = Dir::openat(dir, ".", OFlag::O_RDONLY | OFlag::O_CLOEXEC, Mode::empty())?;
    let mut names = Vec::new();
    for entry in stream.iter() {
        let entry = entry?;
        let name = entry.file_name().to_bytes();
        if name == b"." || name == b".." {
            continue;
        }
        names.push(OsStr::from_bytes(name).to_os_string());
        if names.len() == REMOVE_ALL_BATCH {
            return Ok((names, false));
        }
    }
    Ok((names, true))
}
