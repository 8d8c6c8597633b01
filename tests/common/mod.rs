#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use walkdir::WalkDir;

pub const CATALOG: &str = "tests/fixtures/catalog";
pub const SAMPLE_MANIFEST: &str = "tests/fixtures/catalog/nishikie_hi-0001/manifest.json";
pub const MULTI_SEQUENCE_MANIFEST: &str = "tests/fixtures/catalog/nishikie_hi-0002/manifest.json";
pub const SAMPLE_COLLECTION: &str = "tests/fixtures/catalog/collection/nishikie.json";

/// Copies the fixture catalog into a fresh temporary directory.
pub fn catalog_copy() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    copy_tree(Path::new(CATALOG), dir.path());
    dir
}

pub fn copy_tree(from: &Path, to: &Path) {
    for entry in WalkDir::new(from) {
        let entry = entry.expect("walk fixture tree");
        let relative = entry.path().strip_prefix(from).expect("relative path");
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).expect("create dir");
        } else {
            fs::copy(entry.path(), &target).expect("copy fixture");
        }
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read output");
    serde_json::from_str(&text).expect("parse output")
}

pub fn write_json(path: &Path, value: &serde_json::Value) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, serde_json::to_string_pretty(value).expect("serialize")).expect("write json");
    path.to_path_buf()
}
