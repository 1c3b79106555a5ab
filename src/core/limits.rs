/*!
 * Resolution Limits and Constants
 *
 * Centralized location for the bounds that keep a single path resolution
 * finite no matter what the caller hands us.
 *
 * ## Design Philosophy
 * - Values are grouped by what they bound (steps, restarts, symlinks)
 * - Security-critical constants are marked with [SECURITY]
 * - Linux-compatible values are marked with [LINUX-COMPAT]
 */

// =============================================================================
// RESOLUTION BUDGET
// =============================================================================

/// Path steps tolerated before the step ceiling counts as exceeded.
/// Every loop iteration of the resolver is one step.
/// [SECURITY] Only aborts together with `MAX_RESOLVE_RESTARTS`
pub const MAX_RESOLVE_STEPS: u32 = 255;

/// Restarts from the root caused by `..` components.
/// [SECURITY] Only aborts together with `MAX_RESOLVE_STEPS`
pub const MAX_RESOLVE_RESTARTS: u32 = 8;

// =============================================================================
// SYMLINKS
// =============================================================================

/// Symlinks followed within one resolution.
/// [LINUX-COMPAT] Matches the kernel's MAXSYMLINKS for a nested lookup
pub const MAX_SYMLINK_HOPS: u32 = 8;

// =============================================================================
// RECURSIVE REMOVE
// =============================================================================

/// Directory entries collected per scan pass during remove-all before the
/// directory is closed and re-opened.
/// [PERF] Bounds memory held for one huge directory
pub const REMOVE_ALL_BATCH: usize = 1024;

/// Per-call resolution bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveLimits {
    /// Step ceiling (see [`MAX_RESOLVE_STEPS`])
    pub max_steps: u32,
    /// Restart ceiling (see [`MAX_RESOLVE_RESTARTS`])
    pub max_restarts: u32,
    /// Symlink hop ceiling (see [`MAX_SYMLINK_HOPS`])
    pub max_symlinks: u32,
}

impl Default for ResolveLimits {
    fn default() -> Self {
        Self {
            max_steps: MAX_RESOLVE_STEPS,
            max_restarts: MAX_RESOLVE_RESTARTS,
            max_symlinks: MAX_SYMLINK_HOPS,
        }
    }
}

impl ResolveLimits {
    /// Tight bounds for untrusted trees with no expected symlink chains
    pub const fn strict() -> Self {
        Self {
            max_steps: 64,
            max_restarts: 2,
            max_symlinks: 2,
        }
    }

    /// Generous bounds for deep, link-heavy trees
    pub const fn relaxed() -> Self {
        Self {
            max_steps: 4096,
            max_restarts: 64,
            max_symlinks: 40,
        }
    }

    /// Whether both the step and restart ceilings have been passed.
    ///
    /// Either one alone is tolerated: deep trees legitimately take many
    /// steps, and `..`-heavy but short paths legitimately restart often.
    #[inline]
    pub fn budget_exhausted(&self, steps: u32, restarts: u32) -> bool {
        steps > self.max_steps && restarts > self.max_restarts
    }

    #[inline]
    pub fn symlinks_exhausted(&self, symlinks: u32) -> bool {
        symlinks > self.max_symlinks
    }
}
