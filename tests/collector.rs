//! Collector behaviour on a small synthetic install.

use std::fs;
use std::path::Path;
use tempfile::tempdir;
use toolchain_pack::collect::collect_package_files;
use toolchain_pack::config::{InstallRoots, Layout};
use toolchain_pack::setenv::SETENV_DESTINATION;

fn write(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

#[test]
fn three_file_install_is_filtered_patched_and_completed() {
    let dir = tempdir().unwrap();
    let staging = tempdir().unwrap();
    let vs = dir.path().join("vs");
    let sdk = dir.path().join("sdk");

    write(&vs.join("VC/include/XTREE"), b"#pragma warning(disable: 4127)\n");
    write(&vs.join("VC/lib/arm/libcmt.lib"), b"arm only");
    write(&sdk.join("Include/um/windows.h"), b"#pragma once\n");

    let layout = Layout {
        vs_subdirs: vec!["VC/include".into(), "VC/lib".into()],
        redist_overrides: vec![],
        ..Layout::default()
    };
    let roots = InstallRoots { vs_path: vs.clone(), sdk_path: sdk };
    let files = collect_package_files(&roots, &layout, staging.path(), true).unwrap();

    let dests: Vec<_> = files.iter().map(|f| f.destination.as_str()).collect();
    assert_eq!(dests, vec!["VC/include/XTREE", "win8sdk/Include/um/windows.h", SETENV_DESTINATION]);
    assert!(files.iter().all(|f| !f.destination.to_lowercase().contains("arm/")));

    let patched: Vec<_> = files
        .iter()
        .filter(|f| fs::read_to_string(&f.source).map_or(false, |s| s.contains("4127 4702")))
        .collect();
    assert_eq!(patched.len(), 1);
    assert_eq!(patched[0].destination, "VC/include/XTREE");
    assert_ne!(patched[0].source, vs.join("VC/include/XTREE"));

    let last = files.last().unwrap();
    assert_eq!(last.destination, "win8sdk/bin/SetEnv.cmd");
    assert!(fs::read_to_string(&last.source).unwrap().starts_with("@echo off"));
}

#[test]
fn missing_sdk_root_fails_without_partial_result() {
    let dir = tempdir().unwrap();
    let staging = tempdir().unwrap();
    let vs = dir.path().join("vs");
    write(&vs.join("VC/include/vector"), b"v");

    let layout = Layout { vs_subdirs: vec!["VC/include".into()], redist_overrides: vec![], ..Layout::default() };
    let roots = InstallRoots { vs_path: vs, sdk_path: dir.path().join("no-sdk") };
    let err = collect_package_files(&roots, &layout, staging.path(), true).unwrap_err();
    assert!(err.to_string().contains("no-sdk"));
}
