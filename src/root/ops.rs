/*!
 * Root Operations
 *
 * Every operation resolves its path inside the root and applies exactly
 * one directory-relative syscall to the final component. Failures carry
 * the operation name and the path as the caller passed it.
 */

use nix::errno::Errno;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{Read, Write};
use std::os::fd::BorrowedFd;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::resolve::{do_in_root, resolve_in_root};
use super::split::{ends_with_dot, trim_trailing_separators};
use super::Root;
use crate::core::errors::{LinkError, LinkResult, PathError, PathResult, Result, RootError};
use crate::core::guard::RootRef;
use crate::core::types::{Step, Trailing};
use crate::monitoring::in_op_span;
use crate::syscalls::fs::{
    chmod_at, chown_at, chtimes_at, lchown_at, link_at, lstat_at, mkdir_at, open_at, open_dir_at,
    read_link_at, remove_at, rename_at, stat_at, symlink_at,
};
use crate::syscalls::remove_all_from;
use crate::vfs::{Metadata, OpenFlags, OpenMode};

type PairOp = fn(BorrowedFd<'_>, &OsStr, BorrowedFd<'_>, &OsStr) -> Result<()>;

impl Root {
    /// Resolve `path` and apply `leaf`, qualifying any error with `op`
    fn run<T, F>(&self, op: &'static str, path: &Path, leaf: F) -> PathResult<T>
    where
        F: FnMut(BorrowedFd<'_>, &OsStr) -> Step<T>,
    {
        self.run_with(op, path, Trailing::Follow, leaf)
    }

    fn run_with<T, F>(&self, op: &'static str, path: &Path, trailing: Trailing, leaf: F) -> PathResult<T>
    where
        F: FnMut(BorrowedFd<'_>, &OsStr) -> Step<T>,
    {
        in_op_span(op, self.name(), &path, || {
            do_in_root(self.handle(), path.as_os_str(), self.config(), trailing, leaf)
                .map_err(|err| PathError::new(op, path, err))
        })
    }

    /// Resolve `old`, then `new` from inside the leaf of `old`, so both
    /// parents are open when `apply` runs
    ///
    /// Neither side follows a final `link/`; that fails with `ENOTDIR`.
    fn run_pair(&self, op: &'static str, old: &Path, new: &Path, apply: PairOp) -> LinkResult<()> {
        in_op_span(op, self.name(), &(old, new), || {
            let root = RootRef::acquire(self.handle()).map_err(|err| LinkError::new(op, old, new, err))?;
            let trailing = Trailing::Reject(Errno::ENOTDIR);
            resolve_in_root(&root, old.as_os_str(), self.config(), trailing, |old_dir, old_name| {
                let applied: Result<()> =
                    resolve_in_root(&root, new.as_os_str(), self.config(), trailing, |new_dir, new_name| {
                        Step::from(apply(old_dir, old_name, new_dir, new_name))
                    });
                Step::from(applied)
            })
            .map_err(|err| LinkError::new(op, old, new, err))
        })
    }

    /// Change the mode of `path`, following a final symlink
    pub fn chmod(&self, path: impl AsRef<Path>, mode: u32) -> PathResult<()> {
        self.run("chmodat", path.as_ref(), |dir, name| chmod_at(dir, name, mode))
    }

    /// Change owner and group; `None` leaves that id unchanged
    pub fn chown(&self, path: impl AsRef<Path>, uid: Option<u32>, gid: Option<u32>) -> PathResult<()> {
        self.run("chownat", path.as_ref(), |dir, name| chown_at(dir, name, uid, gid))
    }

    /// Like [`chown`](Self::chown) but changes a final symlink itself
    pub fn lchown(&self, path: impl AsRef<Path>, uid: Option<u32>, gid: Option<u32>) -> PathResult<()> {
        self.run("lchownat", path.as_ref(), |dir, name| lchown_at(dir, name, uid, gid))
    }

    /// Set access and modification times; `None` leaves that time unchanged
    pub fn chtimes(
        &self,
        path: impl AsRef<Path>,
        atime: Option<SystemTime>,
        mtime: Option<SystemTime>,
    ) -> PathResult<()> {
        self.run("chtimesat", path.as_ref(), |dir, name| chtimes_at(dir, name, atime, mtime))
    }

    /// Create a directory. An existing symlink at `path` is an error,
    /// with or without a trailing separator.
    pub fn mkdir(&self, path: impl AsRef<Path>, mode: u32) -> PathResult<()> {
        let path = path.as_ref();
        if mode & !0o7777 != 0 {
            return Err(PathError::new("mkdirat", path, RootError::InvalidArgument));
        }
        self.run_with("mkdirat", path, Trailing::Reject(Errno::EEXIST), |dir, name| {
            mkdir_at(dir, name, mode)
        })
    }

    /// Target of the symlink at `path`, verbatim
    pub fn read_link(&self, path: impl AsRef<Path>) -> PathResult<PathBuf> {
        self.run("readlinkat", path.as_ref(), |dir, name| {
            Step::from(read_link_at(dir, name)).map(PathBuf::from)
        })
    }

    /// Remove a file, symlink or empty directory
    ///
    /// A symlink named with a trailing separator is neither removed nor
    /// followed.
    pub fn remove(&self, path: impl AsRef<Path>) -> PathResult<()> {
        self.run_with("removeat", path.as_ref(), Trailing::Reject(Errno::ENOTDIR), remove_at)
    }

    /// Remove `path` and everything below it
    ///
    /// A path that does not exist is not an error. Trailing separators are
    /// ignored, so a symlink is removed rather than the directory it
    /// points at. A path naming the root itself is rejected.
    pub fn remove_all(&self, path: impl AsRef<Path>) -> PathResult<()> {
        let path = path.as_ref();
        in_op_span("removeallat", self.name(), &path, || {
            let trimmed = trim_trailing_separators(path.as_os_str());
            if ends_with_dot(trimmed) {
                return Err(PathError::new("removeallat", path, RootError::InvalidArgument));
            }
            match do_in_root(self.handle(), trimmed, self.config(), Trailing::Follow, |dir, name| {
                Step::from(remove_all_from(dir, name))
            }) {
                Ok(()) => Ok(()),
                Err(err) if err.is_not_exist() => Ok(()),
                Err(err) => Err(PathError::new("removeallat", path, err)),
            }
        })
    }

    /// Rename `old` to `new`, both inside this root
    pub fn rename(&self, old: impl AsRef<Path>, new: impl AsRef<Path>) -> LinkResult<()> {
        self.run_pair("renameat", old.as_ref(), new.as_ref(), rename_at)
    }

    /// Hard link `new` to `old`; a symlink at `old` is linked itself
    pub fn link(&self, old: impl AsRef<Path>, new: impl AsRef<Path>) -> LinkResult<()> {
        self.run_pair("linkat", old.as_ref(), new.as_ref(), link_at)
    }

    /// Create a symlink at `link` whose target is `target`, stored as is
    ///
    /// The target is not checked; resolving it later through this root
    /// still cannot escape.
    pub fn symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) -> LinkResult<()> {
        let (target, link) = (target.as_ref(), link.as_ref());
        in_op_span("symlinkat", self.name(), &(target, link), || {
            let trailing = Trailing::Reject(Errno::EEXIST);
            do_in_root(self.handle(), link.as_os_str(), self.config(), trailing, |dir, name| {
                symlink_at(target.as_os_str(), dir, name)
            })
            .map_err(|err| LinkError::new("symlinkat", target, link, err))
        })
    }

    /// Metadata of `path`, following a final symlink
    pub fn stat(&self, path: impl AsRef<Path>) -> PathResult<Metadata> {
        self.run("statat", path.as_ref(), |dir, name| stat_at(dir, name).map(Metadata::from))
    }

    /// Metadata of `path` itself
    pub fn lstat(&self, path: impl AsRef<Path>) -> PathResult<Metadata> {
        self.run("lstatat", path.as_ref(), |dir, name| {
            Step::from(lstat_at(dir, name)).map(Metadata::from)
        })
    }

    /// Open for reading
    pub fn open(&self, path: impl AsRef<Path>) -> PathResult<File> {
        self.open_file(path, OpenFlags::read_only(), OpenMode::default())
    }

    /// Create or truncate for writing, with mode 0o666 before umask
    pub fn create(&self, path: impl AsRef<Path>) -> PathResult<File> {
        self.open_file(path, OpenFlags::create(), OpenMode::default())
    }

    /// Open with explicit flags
    ///
    /// A final symlink is followed unless `create_new` is set, in which
    /// case any existing entry, symlink or not, makes the open fail.
    pub fn open_file(&self, path: impl AsRef<Path>, flags: OpenFlags, mode: OpenMode) -> PathResult<File> {
        let path = path.as_ref();
        flags
            .validate()
            .map_err(|err| PathError::new("openat", path, err))?;
        let oflag = flags.to_oflag();
        let follow = flags.follows_symlink();
        self.run("openat", path, |dir, name| {
            open_at(dir, name, oflag, mode.bits(), follow).map(File::from)
        })
    }

    /// Open a directory inside this root as a new, independent root
    ///
    /// The child keeps this root's config and stays open when this root
    /// is closed.
    pub fn open_root(&self, path: impl AsRef<Path>) -> PathResult<Root> {
        let path = path.as_ref();
        let fd = self.run("openat", path, open_dir_at)?;
        Ok(Root::from_fd_with_config(
            fd,
            join_name(self.name(), path),
            *self.config(),
        ))
    }

    /// Whole contents of the file at `path`
    pub fn read_file(&self, path: impl AsRef<Path>) -> PathResult<Vec<u8>> {
        let path = path.as_ref();
        let mut file = self.open(path)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|err| PathError::new("read", path, err.into()))?;
        Ok(contents)
    }

    /// Write `contents` to `path`, creating it with `mode` or truncating it
    pub fn write_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>, mode: u32) -> PathResult<()> {
        let path = path.as_ref();
        let mut file = self.open_file(path, OpenFlags::create(), OpenMode::new(mode))?;
        file.write_all(contents.as_ref())
            .map_err(|err| PathError::new("write", path, err.into()))
    }
}

/// Name of a root opened at `path` below a root called `parent`
fn join_name(parent: &str, path: &Path) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, path.display())
    } else {
        format!("{}/{}", parent, path.display())
    }
}
