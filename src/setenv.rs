//! Generates `SetEnv.cmd`, the batch file a full SDK install would normally
//! provide. Build tooling runs it (optionally with `/x64`) to point `PATH`,
//! `INCLUDE` and `LIB` at the unpacked toolchain. Every path is relative to
//! the script's own location (`%~dp0`), so the package can live anywhere.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PackagerError, Result};

/// Where the script lives, relative to the directory it is generated into and
/// to the package root.
pub const SETENV_RELATIVE_PATH: [&str; 3] = ["win8sdk", "bin", "SetEnv.cmd"];

/// Destination of the script inside the package.
pub const SETENV_DESTINATION: &str = "win8sdk/bin/SetEnv.cmd";

const ROOT: &str = "%~dp0..\\..\\";

/// Renders the script. `pro` selects the tool directories shipped with the
/// Professional edition (native x64 compiler, amd64-hosted x86 cross);
/// otherwise the Express x86-hosted x64 cross compiler is used.
pub fn render_set_env_cmd(pro: bool) -> String {
    let mut lines: Vec<String> = vec![
        "@echo off".into(),
        ":: Generated by toolchain-pack.".into(),
        format!("set PATH={ROOT}Common7\\IDE;%PATH%"),
        format!(
            "set INCLUDE={r}win8sdk\\Include\\um;{r}win8sdk\\Include\\shared;{r}win8sdk\\Include\\winrt;\
             {r}VC\\include;{r}VC\\atlmfc\\include",
            r = ROOT
        ),
        "if \"%1\"==\"/x64\" goto x64".into(),
    ];

    // x86 target
    if pro {
        lines.push(format!(
            "set PATH={r}win8sdk\\bin\\x86;{r}VC\\bin\\amd64_x86;{r}VC\\bin\\amd64;%PATH%",
            r = ROOT
        ));
    } else {
        lines.push(format!("set PATH={r}win8sdk\\bin\\x86;{r}VC\\bin;%PATH%", r = ROOT));
    }
    lines.push(format!(
        "set LIB={r}VC\\lib;{r}win8sdk\\Lib\\winv6.3\\um\\x86;{r}VC\\atlmfc\\lib",
        r = ROOT
    ));
    lines.push("goto :EOF".into());

    // x64 target
    lines.push(":x64".into());
    if pro {
        lines.push(format!("set PATH={r}win8sdk\\bin\\x64;{r}VC\\bin\\amd64;%PATH%", r = ROOT));
    } else {
        lines.push(format!("set PATH={r}win8sdk\\bin\\x64;{r}VC\\bin\\x86_amd64;%PATH%", r = ROOT));
    }
    lines.push(format!(
        "set LIB={r}VC\\lib\\amd64;{r}win8sdk\\Lib\\winv6.3\\um\\x64;{r}VC\\atlmfc\\lib\\amd64",
        r = ROOT
    ));

    let mut script = lines.join("\r\n");
    script.push_str("\r\n");
    script
}

/// Writes the script beneath `target_dir` and returns its path.
pub fn generate_set_env_cmd(target_dir: &Path, pro: bool) -> Result<PathBuf> {
    let path = SETENV_RELATIVE_PATH.iter().fold(target_dir.to_path_buf(), |p, part| p.join(part));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PackagerError::io(e, parent))?;
    }
    fs::write(&path, render_set_env_cmd(pro)).map_err(|e| PackagerError::io(e, &path))?;
    Ok(path)
}
