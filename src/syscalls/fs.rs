/*!
 * Directory-Relative File System Syscalls
 *
 * One function per `*at` primitive. Every function takes the parent
 * directory fd and a single final name, never a multi-component path.
 * Functions whose operation follows a trailing symlink report the
 * symlink as `Step::Symlink` instead of letting the kernel follow it.
 */

use nix::errno::Errno;
use nix::fcntl::{openat, readlinkat, renameat, AtFlags, OFlag};
use nix::sys::stat::{
    fchmodat, fstatat, mkdirat, utimensat, FchmodatFlags, FileStat, Mode, UtimensatFlags,
};
use nix::sys::time::TimeSpec;
use nix::unistd::{fchownat, linkat, symlinkat, unlinkat, Gid, LinkatFlags, Uid, UnlinkatFlags};
use std::ffi::{OsStr, OsString};
use std::os::fd::{BorrowedFd, OwnedFd};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::errors::{Result, RootError};
use crate::core::types::Step;

/// Retry a syscall interrupted by a signal
pub(crate) fn retry_eintr<T, F>(mut op: F) -> nix::Result<T>
where
    F: FnMut() -> nix::Result<T>,
{
    loop {
        match op() {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

#[inline]
fn mode_bits(mode: u32) -> Mode {
    Mode::from_bits_truncate(mode as nix::libc::mode_t)
}

/// Report `name` as a symlink if it is one, otherwise run `op`
fn after_resolving_symlink<T, F>(dir: BorrowedFd<'_>, name: &OsStr, op: F) -> Step<T>
where
    F: FnOnce() -> nix::Result<T>,
{
    match read_link_at(dir, name) {
        Ok(target) => Step::Symlink(target),
        Err(_) => op().into(),
    }
}

/// Open `name` as a directory without following a symlink
pub(crate) fn open_dir_at(dir: BorrowedFd<'_>, name: &OsStr) -> Step<OwnedFd> {
    let flags = OFlag::O_RDONLY | OFlag::O_DIRECTORY | OFlag::O_NOFOLLOW | OFlag::O_CLOEXEC;
    match retry_eintr(|| openat(dir, name, flags, Mode::empty())) {
        Ok(fd) => Step::Done(fd),
        Err(err @ (Errno::ELOOP | Errno::ENOTDIR | Errno::EMLINK)) => match read_link_at(dir, name) {
            Ok(target) => Step::Symlink(target),
            Err(_) => Step::Failed(err.into()),
        },
        Err(err) => Step::Failed(err.into()),
    }
}

pub(crate) fn chmod_at(dir: BorrowedFd<'_>, name: &OsStr, mode: u32) -> Step<()> {
    after_resolving_symlink(dir, name, || {
        match retry_eintr(|| fchmodat(dir, name, mode_bits(mode), FchmodatFlags::NoFollowSymlink)) {
            // libc without AT_SYMLINK_NOFOLLOW support; name was just probed as not a symlink
            Err(Errno::EOPNOTSUPP) => {
                retry_eintr(|| fchmodat(dir, name, mode_bits(mode), FchmodatFlags::FollowSymlink))
            }
            other => other,
        }
    })
}

pub(crate) fn chown_at(
    dir: BorrowedFd<'_>,
    name: &OsStr,
    uid: Option<u32>,
    gid: Option<u32>,
) -> Step<()> {
    after_resolving_symlink(dir, name, || lchown_raw(dir, name, uid, gid))
}

/// Change owner of `name` itself, even when it is a symlink
pub(crate) fn lchown_at(
    dir: BorrowedFd<'_>,
    name: &OsStr,
    uid: Option<u32>,
    gid: Option<u32>,
) -> Step<()> {
    lchown_raw(dir, name, uid, gid).into()
}

fn lchown_raw(dir: BorrowedFd<'_>, name: &OsStr, uid: Option<u32>, gid: Option<u32>) -> nix::Result<()> {
    retry_eintr(|| {
        fchownat(
            dir,
            name,
            uid.map(Uid::from_raw),
            gid.map(Gid::from_raw),
            AtFlags::AT_SYMLINK_NOFOLLOW,
        )
    })
}

/// Set access/modification times; `None` leaves that time unchanged
pub(crate) fn chtimes_at(
    dir: BorrowedFd<'_>,
    name: &OsStr,
    atime: Option<SystemTime>,
    mtime: Option<SystemTime>,
) -> Step<()> {
    let atime = atime.map(timespec).unwrap_or(TimeSpec::UTIME_OMIT);
    let mtime = mtime.map(timespec).unwrap_or(TimeSpec::UTIME_OMIT);
    after_resolving_symlink(dir, name, || {
        retry_eintr(|| utimensat(dir, name, &atime, &mtime, UtimensatFlags::NoFollowSymlink))
    })
}

fn timespec(time: SystemTime) -> TimeSpec {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => TimeSpec::from(since),
        Err(before) => {
            let before = before.duration();
            let secs = before.as_secs() as i64;
            let nanos = before.subsec_nanos() as i64;
            if nanos == 0 {
                TimeSpec::new(-secs as _, 0)
            } else {
                TimeSpec::new((-secs - 1) as _, (1_000_000_000 - nanos) as _)
            }
        }
    }
}

/// Create a directory; an existing symlink is never followed (EEXIST)
pub(crate) fn mkdir_at(dir: BorrowedFd<'_>, name: &OsStr, mode: u32) -> Step<()> {
    retry_eintr(|| mkdirat(dir, name, mode_bits(mode))).into()
}

pub(crate) fn read_link_at(dir: BorrowedFd<'_>, name: &OsStr) -> nix::Result<OsString> {
    retry_eintr(|| readlinkat(dir, name))
}

/// Remove a file or an empty directory
///
/// `unlinkat` forces the caller to know which one it is dealing with, so
/// both are tried. The directory error is reported unless it only says
/// "not a directory", in which case the file error is more useful.
pub(crate) fn remove_at(dir: BorrowedFd<'_>, name: &OsStr) -> Step<()> {
    let file_err = match retry_eintr(|| unlinkat(dir, name, UnlinkatFlags::NoRemoveDir)) {
        Ok(()) => return Step::Done(()),
        Err(err) => err,
    };
    match retry_eintr(|| unlinkat(dir, name, UnlinkatFlags::RemoveDir)) {
        Ok(()) => Step::Done(()),
        Err(Errno::ENOTDIR) => Step::Failed(file_err.into()),
        Err(dir_err) => Step::Failed(dir_err.into()),
    }
}

pub(crate) fn rename_at(
    old_dir: BorrowedFd<'_>,
    old_name: &OsStr,
    new_dir: BorrowedFd<'_>,
    new_name: &OsStr,
) -> Result<()> {
    retry_eintr(|| renameat(old_dir, old_name, new_dir, new_name)).map_err(RootError::from)
}

/// Hard link; a symlink source is linked itself, not its target
pub(crate) fn link_at(
    old_dir: BorrowedFd<'_>,
    old_name: &OsStr,
    new_dir: BorrowedFd<'_>,
    new_name: &OsStr,
) -> Result<()> {
    retry_eintr(|| linkat(old_dir, old_name, new_dir, new_name, LinkatFlags::empty()))
        .map_err(RootError::from)
}

pub(crate) fn symlink_at(target: &OsStr, dir: BorrowedFd<'_>, name: &OsStr) -> Step<()> {
    retry_eintr(|| symlinkat(target, dir, name)).into()
}

/// Stat `name` itself
pub(crate) fn lstat_at(dir: BorrowedFd<'_>, name: &OsStr) -> nix::Result<FileStat> {
    retry_eintr(|| fstatat(dir, name, AtFlags::AT_SYMLINK_NOFOLLOW))
}

/// Stat `name`, reporting a symlink instead of following it
pub(crate) fn stat_at(dir: BorrowedFd<'_>, name: &OsStr) -> Step<FileStat> {
    match lstat_at(dir, name) {
        Ok(stat) if is_symlink(&stat) => match read_link_at(dir, name) {
            Ok(target) => Step::Symlink(target),
            Err(err) => Step::Failed(err.into()),
        },
        other => other.into(),
    }
}

#[inline]
fn is_symlink(stat: &FileStat) -> bool {
    (stat.st_mode as nix::libc::mode_t & nix::libc::S_IFMT) == nix::libc::S_IFLNK
}

/// Open `name` with `flags`; `O_NOFOLLOW` and `O_CLOEXEC` are always added.
///
/// With `follow`, a symlink is reported as `Step::Symlink`; otherwise
/// opening a symlink fails with the kernel's `ELOOP`.
pub(crate) fn open_at(
    dir: BorrowedFd<'_>,
    name: &OsStr,
    flags: OFlag,
    mode: u32,
    follow: bool,
) -> Step<OwnedFd> {
    let flags = flags | OFlag::O_NOFOLLOW | OFlag::O_CLOEXEC;
    match retry_eintr(|| openat(dir, name, flags, mode_bits(mode))) {
        Ok(fd) => Step::Done(fd),
        Err(err @ (Errno::ELOOP | Errno::EMLINK)) if follow => match read_link_at(dir, name) {
            Ok(target) => Step::Symlink(target),
            Err(_) => Step::Failed(err.into()),
        },
        Err(err) => Step::Failed(err.into()),
    }
}
