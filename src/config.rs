/// Configuration system for related-lines
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
use crate::error::{ConfigError, RelatedLinesError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Relationship analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Document session configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Relationship analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Lines on either side of the target scanned for variable names
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,

    /// Leading lines scanned for import statements when building context
    #[serde(default = "default_context_import_lines")]
    pub context_import_lines: usize,

    /// Leading lines scanned by the import finder
    #[serde(default = "default_import_scan_lines")]
    pub import_scan_lines: usize,

    /// Maximum size of a file read from disk (in bytes)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

/// Document session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum number of documents open at once
    #[serde(default = "default_max_open_documents")]
    pub max_open_documents: usize,

    /// Analysis results kept per document
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

// Default value functions
fn default_context_radius() -> usize {
    5
}

fn default_context_import_lines() -> usize {
    50
}

fn default_import_scan_lines() -> usize {
    crate::analysis::imports::DEFAULT_IMPORT_SCAN_LINES
}

fn default_max_file_size() -> usize {
    1_048_576 // 1 MB
}

fn default_max_open_documents() -> usize {
    64
}

fn default_history_limit() -> usize {
    20
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            context_radius: default_context_radius(),
            context_import_lines: default_context_import_lines(),
            import_scan_lines: default_import_scan_lines(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_open_documents: default_max_open_documents(),
            history_limit: default_history_limit(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RelatedLinesError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, RelatedLinesError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), RelatedLinesError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Save to default location
    pub fn save_default(&self) -> Result<(), RelatedLinesError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();
        self.save(&config_path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RelatedLinesError> {
        let limits = [
            ("analysis.context_import_lines", self.analysis.context_import_lines),
            ("analysis.import_scan_lines", self.analysis.import_scan_lines),
            ("analysis.max_file_size", self.analysis.max_file_size),
            ("session.max_open_documents", self.session.max_open_documents),
            ("session.history_limit", self.session.history_limit),
        ];

        for (key, value) in limits {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(radius) = std::env::var("RELATED_LINES_CONTEXT_RADIUS")
            && let Ok(radius) = radius.parse()
        {
            self.analysis.context_radius = radius;
        }

        if let Ok(lines) = std::env::var("RELATED_LINES_IMPORT_SCAN_LINES")
            && let Ok(lines) = lines.parse()
        {
            self.analysis.import_scan_lines = lines;
        }

        if let Ok(size) = std::env::var("RELATED_LINES_MAX_FILE_SIZE")
            && let Ok(size) = size.parse()
        {
            self.analysis.max_file_size = size;
        }

        if let Ok(max) = std::env::var("RELATED_LINES_MAX_DOCUMENTS")
            && let Ok(max) = max.parse()
        {
            self.session.max_open_documents = max;
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, RelatedLinesError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
