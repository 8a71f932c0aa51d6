use std::fs;
use std::path::Path;

use pseudoview::{canonicalize_or_current, infer_project_name};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_returns_cwd_for_dot() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = canonicalize_or_current(".").expect("canonicalize");
    assert_eq!(result, cwd);
}

#[test]
fn canonicalize_or_current_resolves_existing_absolute_path() {
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");

    let result = canonicalize_or_current(&subdir.to_string_lossy()).expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));
}

#[test]
fn canonicalize_or_current_joins_missing_paths_onto_cwd() {
    let cwd = std::env::current_dir().expect("cwd");
    let result = canonicalize_or_current("does-not-exist-yet").expect("fallback");
    assert_eq!(result, cwd.join("does-not-exist-yet"));
}

#[test]
fn infer_project_name_uses_last_path_component() {
    assert_eq!(infer_project_name(Path::new("/tmp/firmware-re")), "firmware-re");
}

#[test]
fn infer_project_name_falls_back_when_missing() {
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}
