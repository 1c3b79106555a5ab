/*!
 * Permissions
 * Unix permission bits of an entry, as stored and as requested on create
 */

use serde::{Deserialize, Deserializer, Serialize};

/// Permission bits (`0o7777` mask) with validation on deserialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(deserialize_with = "deserialize_permission_mode")]
    pub mode: u32,
}

impl Permissions {
    /// Create permissions, dropping file type bits
    #[inline]
    #[must_use]
    pub const fn new(mode: u32) -> Self {
        Self {
            mode: mode & 0o7777,
        }
    }

    /// 0o444
    #[inline]
    #[must_use]
    pub const fn readonly() -> Self {
        Self { mode: 0o444 }
    }

    /// 0o644
    #[inline]
    #[must_use]
    pub const fn readwrite() -> Self {
        Self { mode: 0o644 }
    }

    /// 0o755
    #[inline]
    #[must_use]
    pub const fn executable() -> Self {
        Self { mode: 0o755 }
    }

    /// No owner write bit
    #[inline(always)]
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.mode & 0o200 == 0
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_setuid(&self) -> bool {
        self.mode & 0o4000 != 0
    }

    #[inline]
    #[must_use]
    pub const fn is_sticky(&self) -> bool {
        self.mode & 0o1000 != 0
    }

    /// Owner rwx bits
    #[inline]
    #[must_use]
    pub const fn user_permissions(&self) -> u32 {
        (self.mode >> 6) & 0o7
    }

    #[inline]
    #[must_use]
    pub const fn group_permissions(&self) -> u32 {
        (self.mode >> 3) & 0o7
    }

    #[inline]
    #[must_use]
    pub const fn other_permissions(&self) -> u32 {
        self.mode & 0o7
    }
}

/// Reject modes with bits above 0o7777
fn deserialize_permission_mode<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = u32::deserialize(deserializer)?;
    if mode > 0o7777 {
        return Err(serde::de::Error::custom(format!(
            "invalid permission mode: 0o{:o} exceeds maximum 0o7777",
            mode
        )));
    }
    Ok(mode)
}

impl Default for Permissions {
    fn default() -> Self {
        Self::readwrite()
    }
}
