//! # toolchain-pack Core Library
//!
//! Packages a fixed installation of the Visual Studio compiler toolchain and
//! the Windows SDK into one zip file named after the SHA-1 of its contents.
//!
//! ## Key Modules
//!
//! - [`collect`]: Enumerates install files and maps them to package paths.
//! - [`archive`]: Writes the deflate-compressed package.
//! - [`extract`]: Unpacks a package for fingerprinting.
//! - [`hash`]: Computes tree fingerprints, backed by a timestamp cache.
//! - [`packager`]: Runs the whole pipeline and renames the result.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use toolchain_pack::{fsx::platform_checker, hash::calculate_hash};
//!
//! let checker = platform_checker();
//! let digest = calculate_hash(Path::new("."), Path::new("vs2013_files"), checker.as_ref())?;
//! println!("{}", digest.sha1);
//! # Ok::<(), toolchain_pack::PackagerError>(())
//! ```

pub mod archive;
pub mod cli;
pub mod cli_runner;
pub mod collect;
pub mod common;
pub mod config;
pub mod error;
pub use error::PackagerError;
pub mod extract;
pub mod hash;
pub mod packager;
pub mod progress;
pub mod setenv;

// Platform file attribute queries
pub mod fsx;
