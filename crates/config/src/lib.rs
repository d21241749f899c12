//! Configuration loading, validation, and management for dailybrief.
//!
//! Loads configuration from `~/.dailybrief/config.toml` with environment
//! variable overrides. Validates all budget settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.dailybrief/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the exact token counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model whose tokenizer prices the content
    #[serde(default = "default_model")]
    pub model: String,

    /// Exact token counter settings
    #[serde(default)]
    pub counter: CounterConfig,

    /// Section assembly settings
    #[serde(default)]
    pub assembly: AssemblyConfig,

    /// Enriched-item degradation settings
    #[serde(default)]
    pub degradation: DegradationConfig,

    /// Enrichment cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("counter", &self.counter)
            .field("assembly", &self.assembly)
            .field("degradation", &self.degradation)
            .field("cache", &self.cache)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Use the external counter at all (false = approximation only)
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_counter_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_counter_timeout() -> u64 {
    10
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: None,
            timeout_secs: default_counter_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Token capacity of the assembled document
    #[serde(default = "default_assembly_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub priorities: SourcePriorities,
}

fn default_assembly_capacity() -> usize {
    8000
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            capacity: default_assembly_capacity(),
            priorities: SourcePriorities::default(),
        }
    }
}

/// Priority assigned to each source's section (higher survives eviction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePriorities {
    #[serde(default = "default_issues_priority")]
    pub issues: i32,

    #[serde(default = "default_pull_requests_priority")]
    pub pull_requests: i32,

    #[serde(default = "default_projects_priority")]
    pub projects: i32,
}

fn default_issues_priority() -> i32 {
    10
}
fn default_pull_requests_priority() -> i32 {
    8
}
fn default_projects_priority() -> i32 {
    5
}

impl Default for SourcePriorities {
    fn default() -> Self {
        Self {
            issues: default_issues_priority(),
            pull_requests: default_pull_requests_priority(),
            projects: default_projects_priority(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationConfig {
    /// Hard token capacity for the whole enriched list
    #[serde(default = "default_degradation_capacity")]
    pub capacity: usize,

    /// Per-item budget for comments after phase 1
    #[serde(default = "default_notes_budget")]
    pub notes_budget: usize,

    /// Per-item budget for the body after phase 2
    #[serde(default = "default_body_budget")]
    pub body_budget: usize,

    /// Highest-ranked items that are never dropped
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: usize,

    /// Structural tokens charged per item
    #[serde(default = "default_item_overhead")]
    pub item_overhead: usize,
}

fn default_degradation_capacity() -> usize {
    20000
}
fn default_notes_budget() -> usize {
    300
}
fn default_body_budget() -> usize {
    800
}
fn default_protected_prefix() -> usize {
    5
}
fn default_item_overhead() -> usize {
    20
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            capacity: default_degradation_capacity(),
            notes_budget: default_notes_budget(),
            body_budget: default_body_budget(),
            protected_prefix: default_protected_prefix(),
            item_overhead: default_item_overhead(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long an enriched item stays fresh within one run
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.dailybrief/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `DAILYBRIEF_API_KEY` (highest priority)
    /// - `ANTHROPIC_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`.
    ///
    /// A key from the file wins; otherwise `DAILYBRIEF_API_KEY` is preferred
    /// over `ANTHROPIC_API_KEY`. `DAILYBRIEF_MODEL` always replaces the model.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("DAILYBRIEF_API_KEY").or_else(|| lookup("ANTHROPIC_API_KEY"));
        }

        if let Some(model) = lookup("DAILYBRIEF_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".dailybrief")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assembly.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "assembly.capacity must be > 0".into(),
            ));
        }

        let d = &self.degradation;
        if d.capacity == 0 {
            return Err(ConfigError::ValidationError(
                "degradation.capacity must be > 0".into(),
            ));
        }
        if d.protected_prefix == 0 {
            return Err(ConfigError::ValidationError(
                "degradation.protected_prefix must be > 0".into(),
            ));
        }
        if d.body_budget <= d.notes_budget {
            return Err(ConfigError::ValidationError(format!(
                "degradation.body_budget ({}) must be larger than notes_budget ({})",
                d.body_budget, d.notes_budget
            )));
        }

        Ok(())
    }

    /// Whether the exact counter can be used (enabled and keyed).
    pub fn counter_available(&self) -> bool {
        self.counter.enabled && self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            counter: CounterConfig::default(),
            assembly: AssemblyConfig::default(),
            degradation: DegradationConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
