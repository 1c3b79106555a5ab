/*!
 * Rename and Link Tests
 * Two-path operations resolved under one acquisition
 */

use crate::common::Fixture;
use dirroot::RootError;
use nix::errno::Errno;
use pretty_assertions::assert_eq;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

#[test]
fn test_rename_across_directories() {
    let fx = Fixture::new();
    fx.root.rename("top", "a/b/moved").unwrap();
    assert!(!fx.host("top").exists());
    assert_eq!(fs::read(fx.host("a/b/moved")).unwrap(), b"top");
}

#[test]
fn test_rename_through_symlinked_parents() {
    let fx = Fixture::new();
    fx.root.rename("link_a/b/file", "link_a/renamed").unwrap();
    assert_eq!(fs::read(fx.host("a/renamed")).unwrap(), b"hello");
}

#[test]
fn test_rename_moves_symlink_itself() {
    let fx = Fixture::new();
    fx.root.rename("link_file", "a/moved_link").unwrap();
    assert_eq!(
        fs::read_link(fx.host("a/moved_link")).unwrap(),
        PathBuf::from("a/b/file")
    );
    assert!(fx.host("a/b/file").exists());
}

#[test]
fn test_rename_out_of_root_fails() {
    let fx = Fixture::new();
    let err = fx.root.rename("top", "esc/stolen").unwrap_err();
    assert_eq!(err.op, "renameat");
    assert_eq!(err.old, PathBuf::from("top"));
    assert_eq!(err.new, PathBuf::from("esc/stolen"));
    assert_eq!(err.source, RootError::EscapesRoot);
    assert!(fx.host("top").exists());
    assert!(!fx.outside().join("stolen").exists());

    let err = fx.root.rename("esc/secret", "mine").unwrap_err();
    assert_eq!(err.source, RootError::EscapesRoot);
}

#[test]
fn test_rename_missing_source() {
    let fx = Fixture::new();
    let err = fx.root.rename("missing", "a/x").unwrap_err();
    assert_eq!(err.source, RootError::NotExist);
    assert_eq!(err.to_string(), "renameat missing a/x: no such file or directory");
}

#[test]
fn test_link_shares_inode() {
    let fx = Fixture::new();
    fx.root.link("a/b/file", "hard").unwrap();
    let original = fs::metadata(fx.host("a/b/file")).unwrap();
    let linked = fs::metadata(fx.host("hard")).unwrap();
    assert_eq!(original.ino(), linked.ino());
    assert_eq!(linked.nlink(), 2);

    let err = fx.root.link("a/b/file", "hard").unwrap_err();
    assert_eq!(err.op, "linkat");
    assert_eq!(err.source, RootError::Os(Errno::EEXIST));
}

#[test]
fn test_link_into_escape_fails() {
    let fx = Fixture::new();
    let err = fx.root.link("top", "esc/hard").unwrap_err();
    assert_eq!(err.source, RootError::EscapesRoot);
    assert!(!fx.outside().join("hard").exists());
}

#[test]
fn test_rename_symlink_with_trailing_separator() {
    let fx = Fixture::new();
    fs::create_dir(fx.host("d")).unwrap();
    std::os::unix::fs::symlink("d", fx.host("ld")).unwrap();

    let err = fx.root.rename("ld/", "moved").unwrap_err();
    assert_eq!(err.source, RootError::NotADirectory);
    assert!(fx.host("d").is_dir());
    assert!(fs::symlink_metadata(fx.host("ld")).unwrap().file_type().is_symlink());
    assert!(!fx.host("moved").exists());

    let err = fx.root.rename("a/b", "link_a/").unwrap_err();
    assert_eq!(err.source, RootError::NotADirectory);
    assert!(fx.host("a/b/file").exists());
}

#[test]
fn test_link_symlink_with_trailing_separator() {
    let fx = Fixture::new();

    let err = fx.root.link("link_file/", "hard").unwrap_err();
    assert_eq!(err.op, "linkat");
    assert_eq!(err.source, RootError::NotADirectory);
    assert!(!fx.host("hard").exists());

    let err = fx.root.link("top", "link_a/").unwrap_err();
    assert_eq!(err.source, RootError::NotADirectory);
    assert_eq!(fs::metadata(fx.host("top")).unwrap().nlink(), 1);
    assert_eq!(fs::read_dir(fx.host("a")).unwrap().count(), 1);
}
