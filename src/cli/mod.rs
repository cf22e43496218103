use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Package the installed toolchain and SDK into `<sha1>.zip`.
    #[command(alias = "p")]
    Package {
        /// Directory that receives the package. Defaults to the current directory.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Visual Studio install root. Falls back to TOOLCHAIN_PACK_VS_PATH, then the standard location.
        #[arg(long)]
        vs_path: Option<PathBuf>,

        /// Windows SDK install root. Falls back to TOOLCHAIN_PACK_SDK_PATH, then the standard location.
        #[arg(long)]
        sdk_path: Option<PathBuf>,

        /// JSON file overriding parts of the built-in package layout.
        #[arg(long)]
        layout: Option<PathBuf>,

        /// Generate SetEnv.cmd for an Express install (x86-hosted cross compilers only).
        #[arg(long)]
        express: bool,

        /// Print every `source -> destination` mapping instead of building the package.
        #[arg(long)]
        dry_run: bool,

        /// Do not print the per-file progress line.
        #[arg(long)]
        quiet: bool,
    },

    /// Print the fingerprint of an extracted package tree.
    #[command(alias = "h")]
    Hash {
        /// Tree to hash, relative to --base. Must be in normalized form.
        #[arg(required = true)]
        root: PathBuf,

        /// Directory the root is resolved against. Defaults to the current directory.
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// List the contents of a package without extracting it.
    #[command(alias = "l")]
    List {
        /// The package file to list.
        #[arg(required = true)]
        archive: PathBuf,
    },
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_defaults() {
        let args = Args::try_parse_from(["toolchain-pack", "package"]).unwrap();
        match args.command {
            Commands::Package { output_dir, vs_path, express, dry_run, .. } => {
                assert_eq!(output_dir, PathBuf::from("."));
                assert!(vs_path.is_none());
                assert!(!express);
                assert!(!dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_hash_requires_root() {
        assert!(Args::try_parse_from(["toolchain-pack", "hash"]).is_err());
        let args = Args::try_parse_from(["toolchain-pack", "hash", "vs2013_files", "--base", "/tmp"]).unwrap();
        assert!(matches!(args.command, Commands::Hash { .. }));
    }
}
