/// Platform-specific location of the configuration file
///
/// Follows the XDG Base Directory specification on Linux and the platform
/// conventions on Windows and macOS.
use std::path::PathBuf;

/// Directory name shared by everything this tool stores
const APP_DIR: &str = "related-lines";

/// Platform-agnostic path utilities
pub struct PlatformPaths;

impl PlatformPaths {
    /// Get the appropriate config directory for the current platform
    ///
    /// - Windows: %APPDATA%
    /// - macOS: ~/Library/Application Support
    /// - Linux/Unix: $XDG_CONFIG_HOME or ~/.config
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            env_dir("APPDATA")
        } else if cfg!(target_os = "macos") {
            home_subdir("Library/Application Support")
        } else {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| home_subdir(".config"))
        }
    }

    /// Returns: {config_dir}/related-lines
    pub fn project_config_dir() -> PathBuf {
        Self::config_dir().join(APP_DIR)
    }

    /// Returns: {config_dir}/related-lines/config.toml
    pub fn default_config_path() -> PathBuf {
        Self::project_config_dir().join("config.toml")
    }
}

fn env_dir(var: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn home_subdir(relative: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(relative))
        .unwrap_or_else(|_| PathBuf::from("."))
}
