//! Helpers for building throwaway result directories.

#![allow(dead_code)]

use serde_json::Value;
use std::{fs, path::Path};
use tempfile::TempDir;

pub fn result_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// write `{"results": records}` to `root/relative`, creating parents
pub fn write_results(root: &Path, relative: &str, records: Vec<Value>) {
    write_raw(
        root,
        relative,
        &serde_json::to_string(&serde_json::json!({ "results": records })).unwrap(),
    );
}

pub fn write_raw(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

pub fn sorted() -> membench_loader::LoaderConfig {
    membench_loader::LoaderConfig {
        sort: true,
        ..Default::default()
    }
}
