/*!
 * Open Flags and Mode
 * How a file inside a root is opened, and the mode it gets if created
 */

use super::permissions::Permissions;
use crate::core::errors::{Result, RootError};
use crate::core::serde::{is_default, is_false};
use nix::fcntl::OFlag;
use serde::{Deserialize, Serialize};

/// File open flags; only the set flags are serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct OpenFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub read: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub write: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub append: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub truncate: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub create_new: bool,
}

impl OpenFlags {
    #[inline]
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn write_only() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Default::default()
        }
    }

    /// write + create + truncate, as used by `Root::create`
    #[inline]
    #[must_use]
    pub fn create() -> Self {
        Self {
            write: true,
            create: true,
            truncate: true,
            ..Default::default()
        }
    }

    /// write + create_new; fails if anything, even a dangling symlink,
    /// already has the name
    #[inline]
    #[must_use]
    pub fn create_new() -> Self {
        Self {
            write: true,
            create_new: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            write: true,
            append: true,
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.write || self.append
    }

    #[inline]
    #[must_use]
    pub const fn will_create(&self) -> bool {
        self.create || self.create_new
    }

    /// Whether a symlink in the final component may be followed
    #[inline]
    #[must_use]
    pub const fn follows_symlink(&self) -> bool {
        !self.create_new
    }

    /// Kernel open flags; `O_NOFOLLOW`/`O_CLOEXEC` are added at open time
    pub fn to_oflag(&self) -> OFlag {
        let mut flags = match (self.read, self.is_writable()) {
            (true, true) => OFlag::O_RDWR,
            (false, true) => OFlag::O_WRONLY,
            _ => OFlag::O_RDONLY,
        };
        if self.append {
            flags |= OFlag::O_APPEND;
        }
        if self.truncate {
            flags |= OFlag::O_TRUNC;
        }
        if self.create {
            flags |= OFlag::O_CREAT;
        }
        if self.create_new {
            flags |= OFlag::O_CREAT | OFlag::O_EXCL;
        }
        flags
    }

    /// Reject combinations the kernel would silently reinterpret
    #[must_use = "validation result must be checked"]
    pub fn validate(&self) -> Result<()> {
        if self.create_new && !self.is_writable() {
            return Err(RootError::InvalidArgument);
        }
        if self.truncate && !self.write {
            return Err(RootError::InvalidArgument);
        }
        if self.append && self.truncate {
            return Err(RootError::InvalidArgument);
        }
        Ok(())
    }
}

/// Mode given to a file created by an open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenMode {
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
}

impl OpenMode {
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            permissions: Permissions::new(mode),
        }
    }

    #[inline]
    #[must_use]
    pub const fn bits(&self) -> u32 {
        self.permissions.mode
    }
}

impl Default for OpenMode {
    /// 0o666, narrowed by the process umask
    fn default() -> Self {
        Self::new(0o666)
    }
}
