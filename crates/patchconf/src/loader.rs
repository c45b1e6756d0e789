//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, PatchConfig, PathsConfig, ReportConfig, ReportFormat, TelemetryConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/patchbay/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("patchbay/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("patchbay.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<PatchConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<PatchConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config = PatchConfig::default();

    if let Some(paths) = table.get("paths").and_then(|v| v.as_table()) {
        if let Some(v) = paths.get("catalog").and_then(|v| v.as_str()) {
            config.paths.catalog = Some(expand_path(v));
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    if let Some(report) = table.get("report").and_then(|v| v.as_table()) {
        if let Some(v) = report.get("format").and_then(|v| v.as_str()) {
            config.report.format = v.parse().map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            })?;
        }
    }

    Ok(config)
}

/// Merge two configs, with `overlay` taking precedence wherever it differs
/// from the defaults.
pub fn merge_configs(base: PatchConfig, overlay: PatchConfig) -> PatchConfig {
    PatchConfig {
        paths: PathsConfig {
            catalog: overlay.paths.catalog.or(base.paths.catalog),
        },
        telemetry: TelemetryConfig {
            log_level: if overlay.telemetry.log_level != TelemetryConfig::default().log_level {
                overlay.telemetry.log_level
            } else {
                base.telemetry.log_level
            },
        },
        report: ReportConfig {
            format: if overlay.report.format != ReportFormat::default() {
                overlay.report.format
            } else {
                base.report.format
            },
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut PatchConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Same as [`apply_env_overrides`] with an injectable variable lookup.
pub fn apply_overrides_from<F>(config: &mut PatchConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("PATCHBAY_CATALOG") {
        config.paths.catalog = Some(expand_path(&v));
        sources.env_overrides.push("PATCHBAY_CATALOG".to_string());
    }

    if let Some(v) = lookup("PATCHBAY_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("PATCHBAY_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Some(v) = lookup("PATCHBAY_REPORT_FORMAT") {
        if let Ok(format) = v.parse() {
            config.report.format = format;
            sources.env_overrides.push("PATCHBAY_REPORT_FORMAT".to_string());
        }
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/rigs/catalog.json");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("rigs/catalog.json"));
    }

    #[test]
    fn test_expand_path_absolute() {
        assert_eq!(expand_path("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_discover_config_files() {
        // Just verify it doesn't panic
        let _files = discover_config_files();
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = parse_toml("[report]\nformat = \"json\"\n", Path::new("test.toml")).unwrap();
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.telemetry.log_level, "warn");
        assert!(config.paths.catalog.is_none());
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[paths]
catalog = "/data/catalog.json"

[telemetry]
log_level = "debug"

[report]
format = "text"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.paths.catalog, Some(PathBuf::from("/data/catalog.json")));
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.report.format, ReportFormat::Text);
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        let err = parse_toml("[report]\nformat = \"yaml\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let mut base = PatchConfig::default();
        base.paths.catalog = Some(PathBuf::from("/base.json"));
        base.telemetry.log_level = "info".into();

        let mut overlay = PatchConfig::default();
        overlay.report.format = ReportFormat::Json;

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.paths.catalog, Some(PathBuf::from("/base.json")));
        assert_eq!(merged.telemetry.log_level, "info");
        assert_eq!(merged.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PATCHBAY_CATALOG", "/env/catalog.json"),
            ("PATCHBAY_REPORT_FORMAT", "json"),
            ("RUST_LOG", "patchbay=debug"),
        ]
        .into_iter()
        .collect();

        let mut config = PatchConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides_from(&mut config, &mut sources, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.paths.catalog, Some(PathBuf::from("/env/catalog.json")));
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.telemetry.log_level, "patchbay=debug");
        assert_eq!(sources.env_overrides.len(), 3);
    }
}
