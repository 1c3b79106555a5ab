/*!
 * VFS Types
 * Shared types for entries inside a root, serde-serializable
 */

mod file_type;
mod metadata;
mod open_flags;
mod permissions;

pub use file_type::FileType;
pub use metadata::Metadata;
pub use open_flags::{OpenFlags, OpenMode};
pub use permissions::Permissions;
