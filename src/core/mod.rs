/*!
 * Core Module
 * Error types, limits and guards shared by every subsystem
 */

pub mod errors;
pub(crate) mod guard;
pub mod limits;
pub mod serde;
pub(crate) mod types;

// Re-export for convenience
pub use errors::*;
pub use limits::ResolveLimits;
