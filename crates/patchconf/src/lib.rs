//! Minimal configuration loading for patchbay.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/patchbay/config.toml` (system)
//! 2. `~/.config/patchbay/config.toml` (user)
//! 3. `./patchbay.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`PATCHBAY_*`, plus `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! catalog = "~/rigs/catalog.json"
//!
//! [telemetry]
//! log_level = "info"
//!
//! [report]
//! format = "json"
//! ```

pub mod infra;
pub mod loader;
pub mod report;

pub use infra::{PathsConfig, TelemetryConfig};
pub use loader::{discover_config_files_with_override, ConfigSources};
pub use report::{ReportConfig, ReportFormat};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete patchbay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

impl PatchConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` stand in for the local
    /// `./patchbay.toml`. System and user configs still load first.
    pub fn load_from(config_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration from optional path and return information about sources.
    pub fn load_with_sources_from(
        config_path: Option<&std::path::Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = PatchConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let file_config = loader::load_from_file(&path)?;
            config = loader::merge_configs(config, file_config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# patchbay configuration\n\n");

        output.push_str("[paths]\n");
        match &self.paths.catalog {
            Some(path) => output.push_str(&format!("catalog = \"{}\"\n", path.display())),
            None => output.push_str("# catalog = \"catalog.json\"\n"),
        }

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output.push_str("\n[report]\n");
        output.push_str(&format!("format = \"{}\"\n", self.report.format));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PatchConfig::default();
        assert_eq!(config.telemetry.log_level, "warn");
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(config.paths.catalog.is_none());
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = PatchConfig::default();
        config.paths.catalog = Some(PathBuf::from("/rigs/catalog.json"));
        config.report.format = ReportFormat::Json;

        let text = config.to_toml();
        assert!(text.contains("[paths]"));
        assert!(text.contains("[report]"));

        let parsed: PatchConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patchbay.toml");
        std::fs::write(&path, "[telemetry]\nlog_level = \"patchbay=trace\"\n").unwrap();

        let (config, sources) = PatchConfig::load_with_sources_from(Some(&path)).unwrap();
        assert!(sources.files.contains(&path));
        // RUST_LOG in the test environment would legitimately win.
        if !sources.env_overrides.iter().any(|v| v == "RUST_LOG" || v == "PATCHBAY_LOG_LEVEL") {
            assert_eq!(config.telemetry.log_level, "patchbay=trace");
        }
    }
}
