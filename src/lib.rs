/*!
 * dirroot
 * Directory handles that confine every path resolved through them
 *
 * A [`Root`] wraps an open directory. Paths given to its operations are
 * walked one component at a time from that directory with `O_NOFOLLOW`,
 * following symlinks and `..` in userspace, so no path, however crafted
 * and whatever happens to the tree concurrently, reaches outside it.
 *
 * ```rust,no_run
 * use dirroot::Root;
 *
 * let root = Root::open_dir("/srv/uploads")?;
 * root.mkdir("incoming", 0o755)?;
 * root.write_file("incoming/report.txt", b"ok", 0o644)?;
 * assert!(root.stat("../etc/passwd").is_err());
 * root.close();
 * # Ok::<(), Box<dyn std::error::Error>>(())
 * ```
 */

pub mod core;
pub mod monitoring;
pub mod root;
pub(crate) mod syscalls;
pub mod vfs;

// Re-exports
pub use crate::core::errors::{LinkError, LinkResult, PathError, PathResult, RootError};
pub use crate::core::limits::ResolveLimits;
pub use monitoring::init_tracing;
pub use root::{AbsoluteSymlinks, Root, RootConfig};
pub use vfs::{FileType, Metadata, OpenFlags, OpenMode, Permissions};
