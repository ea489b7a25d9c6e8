//! Command-line interface and run driver.
//!
//! This module handles:
//! - Argument parsing and default path resolution
//! - Enumerating and filtering the source folder
//! - Classifying and moving each file, collecting failures as it goes
//! - Printing the outcome (human-readable or JSON)

use crate::config::{CompiledFilters, ConfigError, OrganizerConfig};
use crate::file_category::ExtensionTable;
use crate::file_organizer::Mover;
use crate::output::OutputFormatter;
use crate::report::{MoveFailure, RunReport};
use clap::{ArgAction, Parser};
use indicatif::ProgressBar;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Organize a folder by moving files into category subfolders by extension.
#[derive(Parser, Debug, Clone)]
#[command(name = "organizer")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Source folder (default: ~/Downloads)
    #[arg(long)]
    pub src: Option<PathBuf>,

    /// Destination root (default: <src>/Organized)
    #[arg(long)]
    pub dst: Option<PathBuf>,

    /// Only simulate: print what would be moved without touching any file
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Configuration file (default: ./.organizerrc.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Errors that stop a run before any file is processed.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid source folder: {}", .0.display())]
    InvalidSource(PathBuf),

    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not determine the home directory; pass --src explicitly")]
    NoHomeDir,

    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Resolved source and destination folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub src: PathBuf,
    pub dst: PathBuf,
}

impl Args {
    /// Applies defaults and `~` expansion to `--src` and `--dst`.
    pub fn resolve_paths(&self) -> Result<RunPaths, CliError> {
        let home = dirs::home_dir();
        let src = match &self.src {
            Some(path) => expand_tilde(path, home.as_deref()),
            None => home.as_deref().ok_or(CliError::NoHomeDir)?.join("Downloads"),
        };
        let dst = match &self.dst {
            Some(path) => expand_tilde(path, home.as_deref()),
            None => src.join("Organized"),
        };
        Ok(RunPaths { src, dst })
    }
}

/// Replaces a leading `~` component with `home`, if known.
///
/// # Examples
///
/// ```
/// use organizer::cli::expand_tilde;
/// use std::path::{Path, PathBuf};
///
/// let home = Path::new("/home/me");
/// assert_eq!(expand_tilde(Path::new("~/Downloads"), Some(home)), PathBuf::from("/home/me/Downloads"));
/// assert_eq!(expand_tilde(Path::new("/tmp/x"), Some(home)), PathBuf::from("/tmp/x"));
/// ```
pub fn expand_tilde(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Lists the regular files directly inside `src` that pass `filters`.
///
/// Subdirectories are never descended into. Symlinks count when their target
/// is a regular file. The result is sorted by lowercase file name, ties
/// broken by the exact name, so runs are reproducible.
///
/// # Arguments
///
/// * `src` - The folder to scan
/// * `filters` - Compiled include/exclude rules applied to each file name
///
/// # Errors
///
/// Returns [`CliError::ReadDir`] if `src` cannot be listed.
pub fn discover_files(src: &Path, filters: &CompiledFilters) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(src).map_err(|e| CliError::ReadDir {
        path: src.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        // Follows symlinks: a link to a regular file is organized like one.
        .filter(|path| path.is_file())
        .filter(|path| {
            let keep = filters.should_include(path);
            if !keep {
                debug!(path = %path.display(), "excluded by filters");
            }
            keep
        })
        .collect();

    files.sort_by_cached_key(|path| {
        let name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
        (name.to_lowercase(), name)
    });
    Ok(files)
}

/// Classifies and moves every file in `src` into `dst/<Category>/`.
///
/// A failure on one file is logged and recorded in the report; the remaining
/// files are still processed.
///
/// # Arguments
///
/// * `src` - The folder whose files are organized
/// * `dst` - The root under which category folders are created
/// * `table` - Extension to category mapping
/// * `filters` - Which files to consider at all
/// * `dry_run` - If true, only plan; nothing on disk changes
/// * `on_progress` - Called once per file with a ready-to-print line
///
/// # Errors
///
/// Returns an error only if the run cannot start: `src` is missing, not a
/// directory, or cannot be listed.
pub fn organize_directory(
    src: &Path,
    dst: &Path,
    table: &ExtensionTable,
    filters: &CompiledFilters,
    dry_run: bool,
    mut on_progress: impl FnMut(&str),
) -> Result<RunReport, CliError> {
    if !src.is_dir() {
        return Err(CliError::InvalidSource(src.to_path_buf()));
    }

    let files = discover_files(src, filters)?;
    let mut report = RunReport::new(dry_run);
    let mut mover = Mover::new(dry_run);

    for file in &files {
        let file_name = file.file_name().unwrap_or_default().to_string_lossy();
        let category = table.classify(&file_name);

        match mover.plan_and_execute(file, dst, category) {
            Ok(decision) => {
                on_progress(&OutputFormatter::decision_line(&decision));
                report.record(decision);
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "could not organize file");
                let failure = MoveFailure {
                    path: file.clone(),
                    reason: e.to_string(),
                    not_found: e.is_not_found(),
                };
                on_progress(&OutputFormatter::failure_line(&failure));
                report.record_failure(failure);
            }
        }
    }

    Ok(report)
}

/// Maps the outcome of [`run_cli`] to the process exit status.
///
/// Returns 0 only when the run started and every file was organized.
///
/// # Example
///
/// ```
/// use organizer::cli::exit_code;
/// use organizer::report::RunReport;
///
/// assert_eq!(exit_code(&Ok(RunReport::new(false))), 0);
/// ```
pub fn exit_code(result: &Result<RunReport, CliError>) -> u8 {
    match result {
        Ok(report) if !report.has_failures() => 0,
        _ => 1,
    }
}

/// Runs the application for parsed arguments and prints the outcome.
///
/// Returns the report so the caller can derive the exit status from it.
pub fn run_cli(args: &Args) -> Result<RunReport, CliError> {
    let paths = args.resolve_paths()?;
    let config = OrganizerConfig::load(args.config.as_deref())?.compile()?;

    if !args.json {
        if args.dry_run {
            OutputFormatter::dry_run_notice(&format!(
                "Analyzing {} (destination: {})",
                paths.src.display(),
                paths.dst.display()
            ));
        } else {
            OutputFormatter::info(&format!(
                "Organizing {} into {}",
                paths.src.display(),
                paths.dst.display()
            ));
        }
    }

    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        // Length is unknown until the folder has been read.
        OutputFormatter::create_progress_bar(0)
    };

    let report = organize_directory(
        &paths.src,
        &paths.dst,
        &config.table,
        &config.filters,
        args.dry_run,
        |line| {
            progress.inc_length(1);
            if !args.json {
                progress.suspend(|| println!("{}", line));
            }
            progress.inc(1);
        },
    );
    progress.finish_and_clear();
    let report = report?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.total_processed() == 0 {
        OutputFormatter::info("No files found to organize.");
    } else {
        OutputFormatter::report(&report);
    }

    Ok(report)
}
