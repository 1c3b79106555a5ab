/*!
 * In-Root Resolution
 *
 * Walks a path one component at a time from the root fd, opening each
 * intermediate directory with O_NOFOLLOW. Symlinks and `..` are handled
 * here in userspace, never by the kernel, so the walk cannot leave the
 * root even while the tree is being modified underneath it.
 *
 * The final component is handed to a leaf callback together with the fd
 * of its parent. The leaf either finishes the operation or reports that
 * the component is a symlink, in which case its target is spliced into
 * the path and the walk continues.
 */

use std::ffi::{OsStr, OsString};
use std::os::fd::{AsFd, BorrowedFd};
use tracing::{trace, warn};

use super::config::RootConfig;
use super::handle::RootHandle;
use super::split::{splice_target, split_path};
use crate::core::errors::{Result, RootError};
use crate::core::guard::{DirGuard, RootRef};
use crate::core::types::{Step, Trailing};
use crate::syscalls::fs::{open_dir_at, read_link_at};

/// Resolve `path` under an already acquired root and run `leaf` on its
/// final component
///
/// `trailing` decides what happens when the final component carries
/// trailing separators and is a symlink.
pub(crate) fn resolve_in_root<T, F>(
    root: &RootRef<'_>,
    path: &OsStr,
    config: &RootConfig,
    trailing: Trailing,
    mut leaf: F,
) -> Result<T>
where
    F: FnMut(BorrowedFd<'_>, &OsStr) -> Step<T>,
{
    let limits = config.limits;
    let split = split_path(path)?;
    let mut parts = split.parts;
    let mut suffix = split.suffix;

    let root_fd = root.fd();
    let mut cursor = DirGuard::root(root_fd);

    let mut i = 0usize;
    let mut steps = 0u32;
    let mut restarts = 0u32;
    let mut symlinks = 0u32;

    loop {
        steps += 1;
        if limits.budget_exhausted(steps, restarts) {
            warn!(root = root.name(), path = ?path, steps, restarts, "resolution budget exhausted");
            return Err(RootError::ResolutionBudgetExceeded);
        }

        if parts[i] == ".." {
            // Cancel the run of ".." against the components before it and
            // walk the rewritten path again from the root.
            restarts += 1;
            let end = i + parts[i..].iter().take_while(|p| *p == "..").count();
            let count = end - i;
            if count > i {
                warn!(root = root.name(), path = ?path, "path escapes root");
                return Err(RootError::EscapesRoot);
            }
            parts.drain(i - count..end);
            if parts.is_empty() {
                parts.push(OsString::from("."));
            }
            trace!(restarts, remaining = parts.len(), "restarting after parent components");
            i = 0;
            cursor.reset(root_fd);
            continue;
        }

        let last = i == parts.len() - 1;
        // Set when the leaf was never called because of a trailing separator
        let mut keep_suffix = false;
        let target = if last {
            match trailing_symlink(cursor.as_fd(), &parts[i], &suffix) {
                Some(target) => match trailing {
                    Trailing::Follow => {
                        keep_suffix = true;
                        target
                    }
                    Trailing::Reject(errno) => {
                        trace!(component = ?parts[i], "refusing to follow symlink with trailing separator");
                        return Err(errno.into());
                    }
                },
                None => {
                    let mut name = parts[i].clone();
                    name.push(&suffix);
                    match leaf(cursor.as_fd(), &name) {
                        Step::Done(value) => return Ok(value),
                        Step::Failed(err) => return Err(err),
                        Step::Symlink(target) => target,
                    }
                }
            }
        } else {
            match open_dir_at(cursor.as_fd(), &parts[i]) {
                Step::Done(fd) => {
                    trace!(component = ?parts[i], "descended");
                    cursor.replace(fd);
                    i += 1;
                    continue;
                }
                Step::Failed(err) => return Err(err),
                Step::Symlink(target) => target,
            }
        };

        symlinks += 1;
        if limits.symlinks_exhausted(symlinks) {
            warn!(root = root.name(), path = ?path, symlinks, "too many symlinks");
            return Err(RootError::TooManyLinks);
        }
        trace!(component = ?parts[i], target = ?target, hop = symlinks, "following symlink");

        let spliced = splice_target(&target, &parts[..i], &parts[i + 1..], config.absolute_symlinks)?;
        if last && !(keep_suffix && spliced.suffix.is_empty()) {
            suffix = spliced.suffix;
        }
        // An absolute target or a target rewriting an already walked prefix
        // invalidates the cursor.
        if spliced.parts.len() < i || spliced.parts[..i] != parts[..i] {
            i = 0;
            cursor.reset(root_fd);
        }
        parts = spliced.parts;
    }
}

/// Target of a final component followed by separators, if it is a symlink
///
/// The kernel follows a symlink named with a trailing separator even under
/// `AT_SYMLINK_NOFOLLOW`, so it has to be followed here first.
fn trailing_symlink(dir: BorrowedFd<'_>, name: &OsStr, suffix: &OsStr) -> Option<OsString> {
    if suffix.is_empty() || name == "." {
        return None;
    }
    read_link_at(dir, name).ok()
}

/// Acquire `handle` for the duration of one resolution
pub(crate) fn do_in_root<T, F>(
    handle: &RootHandle,
    path: &OsStr,
    config: &RootConfig,
    trailing: Trailing,
    leaf: F,
) -> Result<T>
where
    F: FnMut(BorrowedFd<'_>, &OsStr) -> Step<T>,
{
    let root = RootRef::acquire(handle)?;
    resolve_in_root(&root, path, config, trailing, leaf)
}
