use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Controls how output files are produced and how replacement templates
/// are stamped.
///
/// # Loading
///
/// ```rust,no_run
/// use metadata_tool::config::{Config, StripStrategy};
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.output.strategy = StripStrategy::Lossless;
/// config.replace.timestamp = Some("2024:01:01 12:00:00".into());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how metadata-free copies are written.
    pub output: OutputConfig,
    /// Replacement template options.
    pub replace: ReplaceConfig,
}

/// How `remove` produces the metadata-free copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StripStrategy {
    /// Decode the pixels and encode a fresh file.
    Reencode,
    /// Drop metadata segments/chunks and keep the compressed data as is.
    Lossless,
}

/// Output file behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prepended to the original file name.
    pub prefix: String,
    pub strategy: StripStrategy,
    /// If `false`, refuse to replace an existing output file.
    pub overwrite: bool,
}

/// Replacement template options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaceConfig {
    /// Device used when `--replace` is given without `--device`.
    pub default_device: Option<String>,
    /// Fixed `YYYY:MM:DD HH:MM:SS` stamp instead of the current time.
    pub timestamp: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "new_".to_string(),
            strategy: StripStrategy::Reencode,
            overwrite: true,
        }
    }
}

impl Config {
    /// Resolve the config file path: `config.json` next to the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.output.prefix, "new_");
        assert_eq!(config.output.strategy, StripStrategy::Reencode);
        assert!(config.output.overwrite);
        assert!(config.replace.default_device.is_none());
        assert!(config.replace.timestamp.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.output.prefix = "clean_".into();
        config.output.strategy = StripStrategy::Lossless;
        config.replace.default_device = Some("samsung_s20fe".into());
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.output.prefix, "clean_");
        assert_eq!(loaded.output.strategy, StripStrategy::Lossless);
        assert_eq!(loaded.replace.default_device.as_deref(), Some("samsung_s20fe"));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.output.prefix, "new_");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output": { "strategy": "lossless" } }"#).unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.output.strategy, StripStrategy::Lossless);
        assert_eq!(config.output.prefix, "new_");
        assert!(config.output.overwrite);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
