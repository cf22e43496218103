//! Install locations and the fixed package layout.
//!
//! The layout describes which parts of the toolchain install go into the
//! package and where. It ships with built-in defaults for Visual Studio 2013
//! and the Windows 8.1 SDK; a JSON file may override any of its fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PackagerError, Result};

pub const DEFAULT_VS_PATH: &str = r"C:\Program Files (x86)\Microsoft Visual Studio 12.0";
pub const DEFAULT_SDK_PATH: &str = r"C:\Program Files (x86)\Windows Kits\8.1";

pub const VS_PATH_ENV: &str = "TOOLCHAIN_PACK_VS_PATH";
pub const SDK_PATH_ENV: &str = "TOOLCHAIN_PACK_SDK_PATH";

/// Subdirectory whose files are flattened into a single package directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RedistOverride {
    /// Path relative to the toolchain root.
    pub source: String,
    /// Package directory receiving the files (`sys32` or `sys64`).
    pub prefix: String,
}

impl RedistOverride {
    fn new(source: &str, prefix: &str) -> Self {
        Self { source: source.into(), prefix: prefix.into() }
    }
}

/// In-flight text replacement applied to files with a given name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PatchRule {
    /// Matched case-insensitively against the last component of the destination.
    pub file_name: String,
    pub find: String,
    pub replace: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Layout {
    /// Toolchain subdirectories mirrored into the package as-is.
    pub vs_subdirs: Vec<String>,
    pub redist_overrides: Vec<RedistOverride>,
    /// Package directory that receives the whole SDK.
    pub sdk_prefix: String,
    pub patch: PatchRule,
    /// Sources whose lower-cased, slash-separated path contains this are dropped.
    pub excluded_segment: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            vs_subdirs: ["VC/atlmfc", "VC/bin", "VC/crt", "VC/include", "VC/lib", "VC/redist"]
                .into_iter()
                .map(String::from)
                .collect(),
            redist_overrides: vec![
                RedistOverride::new("VC/redist/x86/Microsoft.VC120.CRT", "sys32"),
                RedistOverride::new("VC/redist/x86/Microsoft.VC120.MFC", "sys32"),
                RedistOverride::new("VC/redist/Debug_NonRedist/x86/Microsoft.VC120.DebugCRT", "sys32"),
                RedistOverride::new("VC/redist/Debug_NonRedist/x86/Microsoft.VC120.DebugMFC", "sys32"),
                RedistOverride::new("VC/redist/x64/Microsoft.VC120.CRT", "sys64"),
                RedistOverride::new("VC/redist/x64/Microsoft.VC120.MFC", "sys64"),
                RedistOverride::new("VC/redist/Debug_NonRedist/x64/Microsoft.VC120.DebugCRT", "sys64"),
                RedistOverride::new("VC/redist/Debug_NonRedist/x64/Microsoft.VC120.DebugMFC", "sys64"),
            ],
            sdk_prefix: "win8sdk".into(),
            // xtree trips C4702 (unreachable code) under /WX
            patch: PatchRule {
                file_name: "xtree".into(),
                find: "warning(disable: 4127)".into(),
                replace: "warning(disable: 4127 4702)".into(),
            },
            excluded_segment: "arm/".into(),
        }
    }
}

impl Layout {
    /// Loads a layout from a JSON file. Fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| PackagerError::io(e, path))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Where the toolchain and SDK are installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoots {
    pub vs_path: PathBuf,
    pub sdk_path: PathBuf,
}

impl InstallRoots {
    /// Resolves each root from the command-line option, then its environment
    /// variable, then the built-in default.
    pub fn resolve(vs_path: Option<PathBuf>, sdk_path: Option<PathBuf>) -> Self {
        Self {
            vs_path: path_from_opt_or_env(vs_path, VS_PATH_ENV, DEFAULT_VS_PATH),
            sdk_path: path_from_opt_or_env(sdk_path, SDK_PATH_ENV, DEFAULT_SDK_PATH),
        }
    }
}

fn path_from_opt_or_env(opt: Option<PathBuf>, var: &str, default: &str) -> PathBuf {
    if let Some(path) = opt {
        return path;
    }
    if let Some(path) = std::env::var_os(var) {
        return PathBuf::from(path);
    }
    PathBuf::from(default)
}
