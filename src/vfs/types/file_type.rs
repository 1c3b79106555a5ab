/*!
 * File Type
 * Kind of filesystem object, decoded from a stat mode
 */

use nix::libc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// File type enumeration with complete serde support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    File,
    Directory,
    Symlink,
    #[serde(rename = "block_device")]
    BlockDevice,
    #[serde(rename = "char_device")]
    CharDevice,
    Fifo,
    Socket,
    #[default]
    Unknown,
}

impl FileType {
    /// Decode the `S_IFMT` bits of a stat mode
    pub fn from_mode(mode: u32) -> Self {
        match mode as libc::mode_t & libc::S_IFMT {
            libc::S_IFREG => FileType::File,
            libc::S_IFDIR => FileType::Directory,
            libc::S_IFLNK => FileType::Symlink,
            libc::S_IFBLK => FileType::BlockDevice,
            libc::S_IFCHR => FileType::CharDevice,
            libc::S_IFIFO => FileType::Fifo,
            libc::S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FileType::File => write!(f, "file"),
            FileType::Directory => write!(f, "directory"),
            FileType::Symlink => write!(f, "symlink"),
            FileType::BlockDevice => write!(f, "block device"),
            FileType::CharDevice => write!(f, "char device"),
            FileType::Fifo => write!(f, "fifo"),
            FileType::Socket => write!(f, "socket"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}
