use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn write(path: &Path, data: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, data).unwrap();
}

/// A tiny install plus a layout file describing it.
fn fake_install(root: &Path) -> (std::path::PathBuf, std::path::PathBuf, std::path::PathBuf) {
    let vs = root.join("vs");
    let sdk = root.join("sdk");
    write(&vs.join("VC/bin/cl.exe"), b"compiler");
    write(&vs.join("VC/include/xtree"), b"#pragma warning(disable: 4127)\n");
    write(&vs.join("VC/redist/x86/Microsoft.VC120.CRT/msvcr120.dll"), b"crt");
    write(&sdk.join("Include/um/windows.h"), b"#pragma once\n");

    let layout = root.join("layout.json");
    fs::write(
        &layout,
        r#"{
            "vs_subdirs": ["VC/bin", "VC/include"],
            "redist_overrides": [{"source": "VC/redist/x86/Microsoft.VC120.CRT", "prefix": "sys32"}]
        }"#,
    )
    .unwrap();
    (vs, sdk, layout)
}

#[test]
fn test_cli_package_names_zip_after_digest() -> Result<(), Box<dyn std::error::Error>> {
    let install = tempdir()?;
    let (vs, sdk, layout) = fake_install(install.path());
    let out = tempdir()?;

    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("package")
        .arg("--vs-path").arg(&vs)
        .arg("--sdk-path").arg(&sdk)
        .arg("--layout").arg(&layout)
        .arg("--output-dir").arg(out.path())
        .arg("--quiet");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Renamed out.zip to "));

    let zips: Vec<_> = fs::read_dir(out.path())?
        .flat_map(|e| e)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(zips.len(), 1, "expected exactly one package, found {zips:?}");
    let name = &zips[0];
    let stem = name.strip_suffix(".zip").expect("zip extension");
    assert_eq!(stem.len(), 40);
    assert!(stem.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    // listing shows the mapped entries
    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("list").arg(out.path().join(name));
    cmd.assert().success().stdout(
        predicate::str::contains("VC/bin/cl.exe")
            .and(predicate::str::contains("sys32/msvcr120.dll"))
            .and(predicate::str::contains("win8sdk/Include/um/windows.h"))
            .and(predicate::str::contains("win8sdk/bin/SetEnv.cmd")),
    );
    Ok(())
}

#[test]
fn test_cli_package_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
    let install = tempdir()?;
    let (vs, sdk, layout) = fake_install(install.path());

    let mut names = Vec::new();
    for _ in 0..2 {
        let out = tempdir()?;
        Command::cargo_bin("toolchain-pack")?
            .arg("package")
            .arg("--vs-path").arg(&vs)
            .arg("--sdk-path").arg(&sdk)
            .arg("--layout").arg(&layout)
            .arg("--output-dir").arg(out.path())
            .assert()
            .success();
        let entry = fs::read_dir(out.path())?.next().expect("one package")?;
        names.push(entry.file_name());
    }
    assert_eq!(names[0], names[1]);
    Ok(())
}

#[test]
fn test_cli_dry_run_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let install = tempdir()?;
    let (vs, sdk, layout) = fake_install(install.path());
    let out = tempdir()?;

    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("package")
        .arg("--vs-path").arg(&vs)
        .arg("--sdk-path").arg(&sdk)
        .arg("--layout").arg(&layout)
        .arg("--output-dir").arg(out.path())
        .arg("--dry-run");
    cmd.assert().success().stdout(
        predicate::str::contains("-> VC/include/xtree")
            .and(predicate::str::contains("-> win8sdk/bin/SetEnv.cmd")),
    );
    assert_eq!(fs::read_dir(out.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_cli_missing_install_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let install = tempdir()?;
    let (vs, _sdk, layout) = fake_install(install.path());
    let out = tempdir()?;

    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("package")
        .arg("--vs-path").arg(&vs)
        .arg("--sdk-path").arg(install.path().join("missing-sdk"))
        .arg("--layout").arg(&layout)
        .arg("--output-dir").arg(out.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("missing-sdk")));
    assert_eq!(fs::read_dir(out.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_cli_hash_reports_cache_hit() -> Result<(), Box<dyn std::error::Error>> {
    let base = tempdir()?;
    write(&base.path().join("vs2013_files/VC/bin/cl.exe"), b"compiler");

    let first = Command::cargo_bin("toolchain-pack")?
        .arg("hash").arg("vs2013_files")
        .arg("--base").arg(base.path())
        .output()?;
    assert!(first.status.success());
    let digest = String::from_utf8(first.stdout)?.trim().to_string();
    assert_eq!(digest.len(), 40);

    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("hash").arg("vs2013_files").arg("--base").arg(base.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!("{digest} (cached)")));
    Ok(())
}

#[test]
fn test_cli_hash_rejects_unnormalized_root() -> Result<(), Box<dyn std::error::Error>> {
    let base = tempdir()?;
    fs::create_dir(base.path().join("tree"))?;

    let mut cmd = Command::cargo_bin("toolchain-pack")?;
    cmd.arg("hash").arg("./tree").arg("--base").arg(base.path());
    cmd.assert().failure().stderr(predicate::str::contains("normalized"));
    Ok(())
}
