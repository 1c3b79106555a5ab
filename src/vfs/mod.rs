/*!
 * Virtual File System Module
 * Metadata and open-option types exchanged with a root
 */

pub mod types;

// Re-exports
pub use types::{FileType, Metadata, OpenFlags, OpenMode, Permissions};
