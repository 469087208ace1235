//! CLI configuration.
//!
//! Sources, later wins:
//! - Config file (`~/.config/workato/validator.toml`)
//! - Environment variables (`WORKATO_*`)
//! - Command-line flags (applied by the binary)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::SchemaCatalog;
use crate::error::{Error, Result};
use crate::report::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Extra catalog files merged over the built-in catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Fail the exit code on warnings too.
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Load from the default file location, then apply `WORKATO_*` overrides.
    /// A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("workato"))
            .unwrap_or_else(|| PathBuf::from(".workato"))
            .join("validator.toml")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides from a variable source (the process environment in
    /// `load`).
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(paths) = var("WORKATO_CATALOG") {
            self.catalog.paths = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(format) = var("WORKATO_OUTPUT_FORMAT") {
            self.output.format = format.parse()?;
        }
        if let Some(strict) = var("WORKATO_STRICT") {
            self.output.strict = parse_flag(&strict)?;
        }
        Ok(())
    }

    /// Built-in catalog extended with the configured files.
    pub fn catalog(&self) -> Result<SchemaCatalog> {
        SchemaCatalog::builtin_with_files(&self.catalog.paths)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Config(format!(
            "WORKATO_STRICT must be a boolean, found '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_toml_sections() {
        let config = Config::from_toml_str(
            r#"
[catalog]
paths = ["connectors/acme.json"]

[output]
format = "json"
strict = true
"#,
        )
        .unwrap();
        assert_eq!(config.catalog.paths, vec![PathBuf::from("connectors/acme.json")]);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.strict);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml_str("[output]\nformat = \"text\"\n").unwrap();
        config
            .apply_overrides(vars(&[
                ("WORKATO_OUTPUT_FORMAT", "json"),
                ("WORKATO_STRICT", "1"),
            ]))
            .unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.strict);
    }

    #[test]
    fn bad_override_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(vars(&[("WORKATO_STRICT", "maybe")]))
            .unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn malformed_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("validator.toml");
        std::fs::write(&path, "[output]\nformat = 3\n").unwrap();
        let err = Config::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("validator.toml"));
    }
}
