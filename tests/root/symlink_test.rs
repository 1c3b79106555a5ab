/*!
 * Symlink Following Tests
 * Hop counting, chains and loops
 */

use crate::common::Fixture;
use dirroot::{ResolveLimits, Root, RootConfig, RootError};
use std::os::unix::fs::symlink;
use std::path::PathBuf;

/// l0 -> a/b/file, ln -> l(n-1)
fn chain(fx: &Fixture, len: usize) {
    symlink("a/b/file", fx.host("l0")).unwrap();
    for n in 1..len {
        symlink(format!("l{}", n - 1), fx.host(&format!("l{}", n))).unwrap();
    }
}

#[test]
fn test_self_link_repeated() {
    let fx = Fixture::new();
    assert_eq!(fx.root.read_file("self/self/self/top").unwrap(), b"top");
    assert!(fx.root.stat("self").unwrap().is_dir());
}

#[test]
fn test_chain_at_limit() {
    let fx = Fixture::new();
    chain(&fx, 9);
    // l7 takes eight hops, l8 nine
    assert_eq!(fx.root.read_file("l7").unwrap(), b"hello");

    let err = fx.root.read_file("l8").unwrap_err();
    assert_eq!(err.source, RootError::TooManyLinks);
    assert_eq!(err.path, PathBuf::from("l8"));
}

#[test]
fn test_hops_counted_across_components() {
    let fx = Fixture::new();
    // six hops
    let path = "self/self/self/self/self/link_a/b/file";
    assert_eq!(fx.root.read_file(path).unwrap(), b"hello");

    // five through self, four down the chain
    chain(&fx, 4);
    let err = fx.root.read_file("self/self/self/self/self/l3").unwrap_err();
    assert_eq!(err.source, RootError::TooManyLinks);
}

#[test]
fn test_loop_detected() {
    let fx = Fixture::new();
    symlink("ping", fx.host("pong")).unwrap();
    symlink("pong", fx.host("ping")).unwrap();

    let err = fx.root.stat("ping").unwrap_err();
    assert_eq!(err.op, "statat");
    assert_eq!(err.source, RootError::TooManyLinks);
    assert_eq!(fx.root.stat("ping/x").unwrap_err().source, RootError::TooManyLinks);
}

#[test]
fn test_limit_is_configurable() {
    let fx = Fixture::new();
    chain(&fx, 12);

    let relaxed = RootConfig::default().with_limits(ResolveLimits::relaxed());
    let root = Root::open_dir_with_config(fx.host(""), relaxed).unwrap();
    assert_eq!(root.read_file("l11").unwrap(), b"hello");

    let strict = RootConfig::default().with_limits(ResolveLimits::strict());
    let root = Root::open_dir_with_config(fx.host(""), strict).unwrap();
    assert_eq!(root.read_file("l1").unwrap(), b"hello");
    assert_eq!(root.read_file("l2").unwrap_err().source, RootError::TooManyLinks);
}

#[test]
fn test_parent_after_symlink_applies_to_target() {
    let fx = Fixture::new();
    // deep/.. is a, the parent of the link's target, not the root
    symlink("a/b", fx.host("deep")).unwrap();
    assert_eq!(fx.root.read_file("deep/../b/file").unwrap(), b"hello");
    assert!(fx.root.read_file("deep/../top").unwrap_err().source.is_not_exist());
}
