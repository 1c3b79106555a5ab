/*!
 * Escape Tests
 * No path, symlink or trailing separator reaches outside the root
 */

use crate::common::Fixture;
use dirroot::{AbsoluteSymlinks, Root, RootConfig, RootError};
use std::fs;
use std::os::unix::fs::{symlink, PermissionsExt};

fn assert_escapes<T: std::fmt::Debug>(result: Result<T, dirroot::PathError>) {
    let err = result.unwrap_err();
    assert_eq!(err.source, RootError::EscapesRoot, "{}", err);
}

#[test]
fn test_parent_components() {
    let fx = Fixture::new();
    assert_escapes(fx.root.stat(".."));
    assert_escapes(fx.root.stat("../outside/secret"));
    assert_escapes(fx.root.stat("a/../../outside"));
    assert_escapes(fx.root.stat("a/b/../../../outside"));

    // Staying inside is fine however many levels are climbed.
    assert!(fx.root.stat("a/b/../../top").unwrap().is_file());
}

#[test]
fn test_absolute_path_rejected() {
    let fx = Fixture::new();
    let host = fx.host("top");
    assert_escapes(fx.root.stat(&host));
    assert_escapes(fx.root.stat("/"));
}

#[test]
fn test_relative_symlink_out() {
    let fx = Fixture::new();
    assert_escapes(fx.root.stat("esc"));
    assert_escapes(fx.root.stat("esc/secret"));
    assert_escapes(fx.root.read_file("esc/secret"));
    assert_escapes(fx.root.write_file("esc/planted", b"x", 0o644));
    assert!(!fx.outside().join("planted").exists());
}

#[test]
fn test_deep_relative_symlink_out() {
    let fx = Fixture::new();
    symlink("../../../etc", fx.host("a/b/link")).unwrap();
    assert_escapes(fx.root.stat("a/b/link/passwd"));
}

#[test]
fn test_absolute_symlink_rejected_by_default() {
    let fx = Fixture::new();
    assert_escapes(fx.root.stat("abs/passwd"));
    assert_escapes(fx.root.read_file("abs/passwd"));
}

#[test]
fn test_absolute_symlink_in_root() {
    let fx = Fixture::new();
    fs::create_dir(fx.host("etc")).unwrap();
    fs::write(fx.host("etc/passwd"), b"inside").unwrap();

    let config = RootConfig::default().with_absolute_symlinks(AbsoluteSymlinks::InRoot);
    let root = Root::open_dir_with_config(fx.host(""), config).unwrap();

    assert_eq!(root.read_file("abs/passwd").unwrap(), b"inside");
    assert_eq!(root.read_file("a/b/../../abs/passwd").unwrap(), b"inside");
}

#[test]
fn test_chmod_never_touches_outside() {
    let fx = Fixture::new();
    let secret = fx.outside().join("secret");
    let before = fs::metadata(&secret).unwrap().permissions().mode();

    assert_escapes(fx.root.chmod("esc/secret", 0o777));
    assert_escapes(fx.root.chmod("esc/", 0o777));
    symlink("../outside/secret", fx.host("to_secret")).unwrap();
    assert_escapes(fx.root.chmod("to_secret", 0o777));

    assert_eq!(fs::metadata(&secret).unwrap().permissions().mode(), before);
}

#[test]
fn test_mkdir_through_escaping_parent() {
    let fx = Fixture::new();
    assert_escapes(fx.root.mkdir("esc/newdir", 0o755));
    assert!(!fx.outside().join("newdir").exists());
}

#[test]
fn test_symlink_swapped_to_escape() {
    let fx = Fixture::new();
    // Whatever the link points at when it is resolved is what counts.
    fs::remove_file(fx.host("link_a")).unwrap();
    symlink("../outside", fx.host("link_a")).unwrap();
    assert_escapes(fx.root.stat("link_a/secret"));
}
