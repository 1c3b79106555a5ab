/*!
 * Metadata
 * Stat results for entries inside a root
 */

use super::file_type::FileType;
use super::permissions::Permissions;
use crate::core::serde::{is_default, is_zero_u64, system_time_micros};
use nix::sys::stat::FileStat;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// File metadata with compact serialization
///
/// Timestamps are serialized as microseconds relative to the UNIX epoch.
/// `changed` is the inode change time; Unix stat has no creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Metadata {
    pub file_type: FileType,
    #[serde(skip_serializing_if = "is_zero_u64", default)]
    pub size: u64,
    #[serde(skip_serializing_if = "is_default", default)]
    pub permissions: Permissions,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u64,
    pub ino: u64,
    pub dev: u64,
    #[serde(with = "system_time_micros")]
    pub modified: SystemTime,
    #[serde(with = "system_time_micros")]
    pub accessed: SystemTime,
    #[serde(with = "system_time_micros")]
    pub changed: SystemTime,
}

impl Metadata {
    #[inline(always)]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.file_type, FileType::Symlink)
    }

    /// Check if this is a special file (device, fifo, socket)
    #[inline]
    #[must_use]
    pub const fn is_special(&self) -> bool {
        matches!(
            self.file_type,
            FileType::BlockDevice | FileType::CharDevice | FileType::Fifo | FileType::Socket
        )
    }
}

impl From<FileStat> for Metadata {
    fn from(st: FileStat) -> Self {
        let mode = st.st_mode as u32;
        Self {
            file_type: FileType::from_mode(mode),
            size: st.st_size as u64,
            permissions: Permissions::new(mode),
            uid: st.st_uid,
            gid: st.st_gid,
            nlink: st.st_nlink as u64,
            ino: st.st_ino as u64,
            dev: st.st_dev as u64,
            modified: stat_time(st.st_mtime as i64, st.st_mtime_nsec as i64),
            accessed: stat_time(st.st_atime as i64, st.st_atime_nsec as i64),
            changed: stat_time(st.st_ctime as i64, st.st_ctime_nsec as i64),
        }
    }
}

/// `nsec` is always a forward offset, also for negative `secs`
fn stat_time(secs: i64, nsec: i64) -> SystemTime {
    let nanos = Duration::from_nanos(nsec.clamp(0, 999_999_999) as u64);
    if secs >= 0 {
        UNIX_EPOCH + Duration::from_secs(secs as u64) + nanos
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + nanos
    }
}
