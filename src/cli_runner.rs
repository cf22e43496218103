//! CLI runner shared by the binary: dispatches parsed commands to the library
//! and renders progress on the terminal.

use crate::cli::{self, Commands};
use crate::config::{InstallRoots, Layout};
use crate::fsx::platform_checker;
use crate::hash::calculate_hash;
use crate::packager::{PackageOptions, PackageOutcome, Packager};
use crate::progress::{tail_chars, ProgressState};
use crate::archive::TEMP_ARCHIVE_NAME;
use crate::extract;
use std::cell::Cell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<(), Box<dyn std::error::Error>> {
    let command = cli::run()?;
    // Attribute lookups are bound once for the whole run.
    let checker = platform_checker();

    match &command {
        Commands::Package { output_dir, vs_path, sdk_path, layout, express, dry_run, quiet } => {
            let layout = match layout {
                Some(path) => Layout::from_file(path)?,
                None => Layout::default(),
            };
            let options = PackageOptions {
                roots: InstallRoots::resolve(vs_path.clone(), sdk_path.clone()),
                layout,
                output_dir: output_dir.clone(),
                pro: !*express,
                dry_run: *dry_run,
            };

            if !*dry_run {
                println!("Building file list...");
            }
            let temp_name = output_dir.join(TEMP_ARCHIVE_NAME);
            let progress_cb = create_cli_progress_callback(temp_name.clone());
            let mut packager = Packager::new(options, checker.as_ref());
            if !*quiet {
                packager = packager.with_progress(&progress_cb);
            }

            let outcome = {
                let mut listing = io::stdout().lock();
                packager.run(&mut listing)?
            };
            match outcome {
                PackageOutcome::Listed { entries } => {
                    tracing::info!(entries, "dry run, nothing written");
                }
                PackageOutcome::Packaged { path, .. } => {
                    println!("Renamed {} to {}.", display_name(&temp_name), display_name(&path));
                }
            }
        }
        Commands::Hash { root, base } => {
            let base = match base {
                Some(base) => base.clone(),
                None => std::env::current_dir()?,
            };
            let digest = calculate_hash(&base, root, checker.as_ref())?;
            if digest.from_cache {
                println!("{} (cached)", digest.sha1);
            } else {
                println!("{}", digest.sha1);
            }
        }
        Commands::List { archive } => {
            let names = extract::list_entries(archive)?;
            println!("Package Index ({} files):", names.len());
            for name in names {
                println!("- {}", name);
            }
        }
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// --- utils for CLI progress -------------------------------------------------

/// Renders `count/total ...<tail of path>` on one self-overwriting stderr line.
fn create_cli_progress_callback(output: PathBuf) -> impl Fn(ProgressState) {
    let prev_len = Cell::new(0usize);

    move |state: ProgressState| {
        // Determine terminal width (default 80)
        let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);

        let mut line = if state.is_complete() && state.current.is_empty() {
            format!("Wrote to {}.", output.display())
        } else {
            format!(
                "{}/{} ...{}",
                state.processed_files,
                state.total_files,
                tail_chars(&state.current, 40)
            )
        };
        if line.chars().count() >= term_width {
            line = tail_chars(&line, term_width.saturating_sub(1)).to_string();
        }

        // Pad over whatever the previous line left behind
        let len = line.chars().count();
        if prev_len.get() > len {
            line.push_str(&" ".repeat(prev_len.get() - len));
        }
        prev_len.set(len);

        eprint!("\r{}", line);
        if state.is_complete() && state.current.is_empty() {
            eprintln!();
        }
        io::stderr().flush().ok();
    }
}
