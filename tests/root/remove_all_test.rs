/*!
 * Recursive Remove Tests
 */

use crate::common::Fixture;
use dirroot::RootError;
use std::fs;
use std::os::unix::fs::symlink;

#[test]
fn test_removes_tree() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.host("a/b/c/d")).unwrap();
    fs::write(fx.host("a/b/c/d/leaf"), b"").unwrap();

    fx.root.remove_all("a").unwrap();
    assert!(!fx.host("a").exists());
    // link_a now dangles but is untouched
    assert!(fs::symlink_metadata(fx.host("link_a")).is_ok());
}

#[test]
fn test_missing_is_success() {
    let fx = Fixture::new();
    fx.root.remove_all("nothing").unwrap();
    fx.root.remove_all("nothing/below").unwrap();
    fx.root.remove_all("a/b/nothing").unwrap();
}

#[test]
fn test_root_itself_rejected() {
    let fx = Fixture::new();
    for path in [".", "./", "a/.", "a/..", "a/b/../.."] {
        let err = fx.root.remove_all(path).unwrap_err();
        assert_eq!(err.source, RootError::InvalidArgument, "{}", path);
        assert_eq!(err.op, "removeallat");
    }
    assert!(fx.host("a/b/file").exists());
}

#[test]
fn test_symlink_removed_not_followed() {
    let fx = Fixture::new();
    fx.root.remove_all("esc").unwrap();
    assert!(fs::symlink_metadata(fx.host("esc")).is_err());
    assert!(fx.outside().join("secret").exists());

    // A trailing separator still removes the link, not its target.
    fx.root.remove_all("link_a/").unwrap();
    assert!(fs::symlink_metadata(fx.host("link_a")).is_err());
    assert!(fx.host("a/b/file").exists());
}

#[test]
fn test_nested_escaping_symlink_left_pointing_outside() {
    let fx = Fixture::new();
    symlink("../../outside", fx.host("a/out")).unwrap();
    fx.root.remove_all("a").unwrap();
    assert!(fx.outside().join("secret").exists());
}

#[test]
fn test_escaping_parent_reported() {
    let fx = Fixture::new();
    let err = fx.root.remove_all("esc/secret").unwrap_err();
    assert_eq!(err.source, RootError::EscapesRoot);
    assert!(fx.outside().join("secret").exists());
}
