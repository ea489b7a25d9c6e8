//! Configuration file support.
//!
//! An optional TOML file can extend the built-in extension table with custom
//! categories and exclude files from organization:
//!
//! ```toml
//! [filters]
//! include_hidden = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini", "Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["crdownload"]
//! regex = ["^~\\$"]
//!
//! [filters.include]
//! patterns = []
//!
//! [categories]
//! Ebooks = [".epub", "mobi"]
//! ```
//!
//! Filter rules are matched against the bare file name, since only the direct
//! children of the source folder are ever considered.

use crate::file_category::{ExtensionTable, normalize_extension};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".organizerrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Invalid glob pattern.
    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    /// Invalid regex pattern.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// A category name that cannot be used as a folder name.
    #[error("Invalid category name '{0}': must be a single folder name")]
    InvalidCategory(String),

    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Which files are considered at all.
    #[serde(default)]
    pub filters: FilterRules,

    /// Extra category → extensions mappings layered over the built-in table.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Filter rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether dotfiles are organized (into `Others` unless mapped). Defaults to true.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist; a match here overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names (e.g. "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions, with or without the leading dot, case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regular expressions matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Configuration ready for use by the driver.
#[derive(Debug)]
pub struct CompiledConfig {
    pub table: ExtensionTable,
    pub filters: CompiledFilters,
}

impl OrganizerConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.organizerrc.toml` in the current directory
    /// 3. `organizer/config.toml` in the platform config directory
    /// 4. built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Some(user_config) = dirs::config_dir()
            .map(|dir| dir.join("organizer").join("config.toml"))
            .filter(|path| path.is_file())
        {
            return Self::load_from_file(&user_config);
        }

        Ok(Self::default())
    }

    /// Loads configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a TOML config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist, `IoError` if it
    /// cannot be read, and `ConfigInvalid` if it is not valid TOML for
    /// this schema.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Example
    ///
    /// ```
    /// use organizer::config::OrganizerConfig;
    ///
    /// let config = OrganizerConfig::from_toml(
    ///     "[filters]\ninclude_hidden = false\n\n[categories]\nFonts = [\"ttf\"]\n",
    /// )
    /// .unwrap();
    /// assert!(!config.filters.include_hidden);
    /// assert_eq!(config.extension_table().unwrap().classify("a.ttf"), "Fonts");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the extension table: built-in mappings plus `[categories]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCategory` for names that are empty, `.`/`..`, or
    /// contain a path separator.
    pub fn extension_table(&self) -> Result<ExtensionTable, ConfigError> {
        let mut table = ExtensionTable::default();
        for (category, extensions) in &self.categories {
            validate_category_name(category)?;
            for ext in extensions {
                table.add_mapping(ext, category);
            }
        }
        Ok(table)
    }

    /// Validates and compiles everything.
    pub fn compile(self) -> Result<CompiledConfig, ConfigError> {
        let table = self.extension_table()?;
        let filters = CompiledFilters::new(self.filters)?;
        Ok(CompiledConfig { table, filters })
    }
}

fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    let trimmed = name.trim();
    let bad = trimmed.is_empty()
        || trimmed != name
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if bad {
        return Err(ConfigError::InvalidCategory(name.to_string()));
    }
    Ok(())
}

/// Pre-compiled filter rules.
#[derive(Debug)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Compiles filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;
        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Returns true if the file should be organized.
    ///
    /// Rules are applied to the file name in this order:
    /// 1. Include patterns - if matched, always include
    /// 2. Hidden files - excluded when `include_hidden` is off
    /// 3. Exact filename - if matched, exclude
    /// 4. Extension - if matched, exclude
    /// 5. Glob pattern - if matched, exclude
    /// 6. Regex - if matched, exclude
    /// 7. Default: include
    ///
    /// # Example
    ///
    /// ```
    /// use organizer::config::{CompiledFilters, FilterRules};
    /// use std::path::Path;
    ///
    /// let mut rules = FilterRules::default();
    /// rules.exclude.extensions = vec!["tmp".to_string()];
    /// let filters = CompiledFilters::new(rules).unwrap();
    /// assert!(!filters.should_include(Path::new("scratch.TMP")));
    /// assert!(filters.should_include(Path::new("notes.md")));
    /// ```
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        // 1. Whitelist
        if self.include_patterns.iter().any(|p| p.matches(&file_name)) {
            return true;
        }

        // 2. Hidden files
        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        // 3. Exact filename
        if self.exclude_filenames.contains(&*file_name) {
            return false;
        }

        // 4. Extension, compared the way the classifier normalizes it
        if let Some(ext) = file_path.extension()
            && self
                .exclude_extensions
                .contains(&normalize_extension(&ext.to_string_lossy()))
        {
            return false;
        }

        // 5. Globs
        if self.exclude_patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        // 6. Regexes, then 7. default
        !self.exclude_regexes.iter().any(|r| r.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}
