/*!
 * Resolution Budget and Config Tests
 */

use crate::common::Fixture;
use dirroot::root::config::ENV_MAX_SYMLINKS;
use dirroot::{ResolveLimits, Root, RootConfig, RootError};
use serial_test::serial;

fn climbing(pairs: usize) -> String {
    "a/../".repeat(pairs) + "top"
}

#[test]
fn test_parent_heavy_path_exhausts_budget() {
    let fx = Fixture::new();
    let err = fx.root.stat(climbing(300)).unwrap_err();
    assert_eq!(err.source, RootError::ResolutionBudgetExceeded);
    assert_eq!(err.source.to_string(), "file name too long");
}

#[test]
fn test_long_plain_path_within_budget() {
    let fx = Fixture::new();
    // More steps than the ceiling but no restarts: never aborted.
    let deep: String = (0..300).map(|i| format!("d{}/", i)).collect();
    std::fs::create_dir_all(fx.host(&deep)).unwrap();
    assert!(fx.root.stat(&deep).unwrap().is_dir());
}

#[test]
fn test_few_restarts_within_budget() {
    let fx = Fixture::new();
    assert!(fx.root.stat(climbing(8)).unwrap().is_file());
}

#[test]
fn test_relaxed_limits_allow_more_restarts() {
    let fx = Fixture::new();
    let config = RootConfig::default().with_limits(ResolveLimits::relaxed());
    let root = Root::open_dir_with_config(fx.host(""), config).unwrap();
    assert!(root.stat(climbing(300)).unwrap().is_file());
}

#[test]
#[serial]
fn test_from_env_applies_to_root() {
    let fx = Fixture::new();
    std::env::set_var(ENV_MAX_SYMLINKS, "1");
    let config = RootConfig::from_env();
    std::env::remove_var(ENV_MAX_SYMLINKS);

    let root = Root::open_dir_with_config(fx.host(""), config).unwrap();
    assert!(root.read_file("link_file").is_ok());
    assert_eq!(
        root.read_file("self/link_file").unwrap_err().source,
        RootError::TooManyLinks
    );
}
