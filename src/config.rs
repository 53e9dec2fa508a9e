//! Session configuration.
//!
//! Settings are read from a TOML file and cover three areas:
//! - which files a folder scan picks up (hidden files, exclude and include rules)
//! - the browsing order a new session starts with
//! - how relocations treat name collisions and failed undos
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! enable_hidden_files = true
//!
//! [scan.exclude]
//! filenames = ["Thumbs.jpg"]
//! patterns = ["**/thumbnails/**"]
//! regex = ['^IMG_\d+_small\.']
//!
//! [scan.include]
//! patterns = []
//!
//! [browse]
//! order = "shuffled"
//!
//! [relocation]
//! on_conflict = "rename"
//! retain_failed_undo = true
//! ```

use crate::order::OrderMode;
use crate::relocate::ConflictPolicy;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub scan: ScanRules,
    #[serde(default)]
    pub browse: BrowseSettings,
    #[serde(default)]
    pub relocation: RelocationSettings,
}

/// Rules deciding which image files a scan keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRules {
    /// Whether to include hidden files (starting with "."). Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding files from a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the base folder.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Browsing defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowseSettings {
    /// Order mode a new session starts in.
    #[serde(default)]
    pub order: OrderMode,
}

/// Relocation behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationSettings {
    /// What to do when the destination file name is already taken.
    #[serde(default)]
    pub on_conflict: ConflictPolicy,

    /// Put a failed undo back on the history so it can be retried.
    #[serde(default = "default_retain_failed_undo")]
    pub retain_failed_undo: bool,
}

fn default_retain_failed_undo() -> bool {
    true
}

impl Default for RelocationSettings {
    fn default() -> Self {
        Self {
            on_conflict: ConflictPolicy::default(),
            retain_failed_undo: default_retain_failed_undo(),
        }
    }
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.picsortrc.toml` in the current directory
    /// 3. Look for `~/.config/picsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but cannot be read,
    /// or if any discovered file is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".picsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("picsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Compile configuration into the settings a session runs with.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            filters: CompiledFilters::new(self.scan)?,
            initial_order: self.browse.order,
            on_conflict: self.relocation.on_conflict,
            retain_failed_undo: self.relocation.retain_failed_undo,
        })
    }
}

/// Ready-to-use settings for a browsing session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub filters: CompiledFilters,
    pub initial_order: OrderMode,
    pub on_conflict: ConflictPolicy,
    pub retain_failed_undo: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            filters: CompiledFilters::default(),
            initial_order: OrderMode::default(),
            on_conflict: ConflictPolicy::default(),
            retain_failed_undo: default_retain_failed_undo(),
        }
    }
}

/// Pre-compiled scan filters.
///
/// Glob and regex patterns are parsed once so that matching during a scan
/// never re-parses them.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude_filenames: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl CompiledFilters {
    fn new(rules: ScanRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

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
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if a file should be kept by a scan.
    ///
    /// `relative_path` is the file's path relative to the base folder.
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. Glob pattern match - if matched, exclude
    /// 5. Regex pattern match - if matched, exclude
    /// 6. Default: include
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}
