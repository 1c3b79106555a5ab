/*!
 * Path Splitting
 *
 * Purely syntactic: turns a path into components plus the trailing
 * separators of the final component. Never touches the filesystem.
 */

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

use super::config::AbsoluteSymlinks;
use crate::core::errors::{Result, RootError};

const SEPARATOR: u8 = b'/';

/// Components of a path inside a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SplitPath {
    /// Never empty; `.` only appears as the final component
    pub parts: Vec<OsString>,
    /// Separators that followed the final component
    pub suffix: OsString,
}

/// Split a caller-supplied path. Absolute paths are rejected.
pub(crate) fn split_path(path: &OsStr) -> Result<SplitPath> {
    let bytes = validate(path.as_bytes(), "empty path")?;
    if bytes[0] == SEPARATOR {
        return Err(RootError::EscapesRoot);
    }
    Ok(split_components(bytes, &[], &[]))
}

/// Split a symlink target and join it between the components already
/// walked (`prefix`) and those still to walk (`rest`).
pub(crate) fn splice_target(
    target: &OsStr,
    prefix: &[OsString],
    rest: &[OsString],
    absolute: AbsoluteSymlinks,
) -> Result<SplitPath> {
    let bytes = validate(target.as_bytes(), "empty symlink target")?;
    if bytes[0] != SEPARATOR {
        return Ok(split_components(bytes, prefix, rest));
    }

    match absolute {
        AbsoluteSymlinks::Reject => Err(RootError::EscapesRoot),
        AbsoluteSymlinks::InRoot => {
            let body = trim_leading_separators(bytes);
            if body.is_empty() {
                Ok(split_components(b"./", &[], rest))
            } else {
                Ok(split_components(body, &[], rest))
            }
        }
    }
}

/// Whether a path names the directory it is resolved in (`.` or `x/.`)
pub(crate) fn ends_with_dot(path: &OsStr) -> bool {
    let bytes = path.as_bytes();
    bytes == b"." || bytes.ends_with(b"/.")
}

/// Strip every trailing separator
pub(crate) fn trim_trailing_separators(path: &OsStr) -> &OsStr {
    let bytes = path.as_bytes();
    let end = bytes.len() - bytes.iter().rev().take_while(|b| **b == SEPARATOR).count();
    OsStr::from_bytes(&bytes[..end])
}

fn validate<'a>(bytes: &'a [u8], empty_msg: &str) -> Result<&'a [u8]> {
    if bytes.is_empty() {
        return Err(RootError::InvalidPath(empty_msg.to_string()));
    }
    if bytes.contains(&0) {
        return Err(RootError::InvalidPath("path contains NUL byte".to_string()));
    }
    Ok(bytes)
}

fn trim_leading_separators(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().take_while(|b| **b == SEPARATOR).count();
    &bytes[start..]
}

/// `body` must be non-empty and must not start with a separator.
fn split_components(body: &[u8], prefix: &[OsString], rest: &[OsString]) -> SplitPath {
    let end = body.len() - body.iter().rev().take_while(|b| **b == SEPARATOR).count();
    let (text, suffix) = body.split_at(end);

    let segments: Vec<&[u8]> = text
        .split(|b| *b == SEPARATOR)
        .filter(|seg| !seg.is_empty())
        .collect();
    let last = segments.len().saturating_sub(1);

    let mut parts = Vec::with_capacity(prefix.len() + segments.len() + rest.len());
    parts.extend_from_slice(prefix);
    for (idx, seg) in segments.iter().enumerate() {
        // "." is kept only as the final component
        if *seg == b"." && idx != last {
            continue;
        }
        parts.push(OsStr::from_bytes(seg).to_os_string());
    }

    if !rest.is_empty() && parts.last().map(|p| p == ".").unwrap_or(false) {
        parts.pop();
    }
    parts.extend_from_slice(rest);

    SplitPath {
        parts,
        suffix: OsStr::from_bytes(suffix).to_os_string(),
    }
}
