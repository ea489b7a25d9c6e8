//! organizer - sort a folder into category subfolders by file extension
//!
//! This library classifies files by extension, moves them into per-category
//! folders without ever overwriting an existing file, and can preview the
//! whole run without touching the filesystem.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod output;
pub mod report;

pub use config::{CompiledConfig, CompiledFilters, ConfigError, OrganizerConfig};
pub use file_category::{Category, ExtensionTable, classify};
pub use file_organizer::{
    MoveDecision, Mover, OrganizeError, OrganizeResult, ensure_unique_path, plan_and_execute,
};
pub use report::{MoveFailure, RunReport};

pub use cli::{Args, discover_files, exit_code, organize_directory, run_cli};
