/*!
 * Syscalls Module
 * Directory-relative primitives the resolver builds on
 */

pub(crate) mod fs;
pub(crate) mod remove_all;

pub(crate) use remove_all::remove_all_from;
