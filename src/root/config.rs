/*!
 * Root Configuration
 *
 * Resolution bounds and symlink policy for a root
 */

use std::str::FromStr;
use tracing::warn;

use crate::core::limits::ResolveLimits;

pub const ENV_MAX_STEPS: &str = "DIRROOT_MAX_STEPS";
pub const ENV_MAX_RESTARTS: &str = "DIRROOT_MAX_RESTARTS";
pub const ENV_MAX_SYMLINKS: &str = "DIRROOT_MAX_SYMLINKS";
pub const ENV_ABSOLUTE_SYMLINKS: &str = "DIRROOT_ABSOLUTE_SYMLINKS";

/// How a symlink whose target starts with `/` is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsoluteSymlinks {
    /// Fail with `EscapesRoot`
    #[default]
    Reject,
    /// Resolve the target as if the root were `/`
    InRoot,
}

impl FromStr for AbsoluteSymlinks {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(AbsoluteSymlinks::Reject),
            "in_root" | "inroot" | "in-root" => Ok(AbsoluteSymlinks::InRoot),
            other => Err(format!("unknown absolute symlink policy: {}", other)),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RootConfig {
    pub limits: ResolveLimits,
    pub absolute_symlinks: AbsoluteSymlinks,
}

impl RootConfig {
    pub const fn new(limits: ResolveLimits, absolute_symlinks: AbsoluteSymlinks) -> Self {
        Self {
            limits,
            absolute_symlinks,
        }
    }

    pub fn with_limits(mut self, limits: ResolveLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_absolute_symlinks(mut self, policy: AbsoluteSymlinks) -> Self {
        self.absolute_symlinks = policy;
        self
    }

    /// Build from the process environment
    ///
    /// Environment variables:
    /// - DIRROOT_MAX_STEPS: step ceiling (default: 255)
    /// - DIRROOT_MAX_RESTARTS: restart ceiling (default: 8)
    /// - DIRROOT_MAX_SYMLINKS: symlink hop ceiling (default: 8)
    /// - DIRROOT_ABSOLUTE_SYMLINKS: `reject` or `in_root` (default: reject)
    pub fn from_env() -> Self {
        let defaults = ResolveLimits::default();
        let limits = ResolveLimits {
            max_steps: env_or(ENV_MAX_STEPS, defaults.max_steps),
            max_restarts: env_or(ENV_MAX_RESTARTS, defaults.max_restarts),
            max_symlinks: env_or(ENV_MAX_SYMLINKS, defaults.max_symlinks),
        };
        Self {
            limits,
            absolute_symlinks: env_or(ENV_ABSOLUTE_SYMLINKS, AbsoluteSymlinks::default()),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!(key, value = %raw, error = %e, default = ?default, "Ignoring invalid config value");
                default
            }
        },
        Err(_) => default,
    }
}
