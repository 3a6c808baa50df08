//! Configuration for analysis and generation
//!
//! A [`Config`] value is passed explicitly into every pass; nothing reads
//! process-wide state after loading. Values are layered: built-in
//! defaults, the user config file, `relsync.toml` in the working
//! directory, an explicit `--config` file, then `RELSYNC_*` environment
//! variables.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;

use crate::dirs::{CONFIG_FILE_NAME, user_config_file};

/// How strictly recoverable problems are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Unresolved targets and ambiguous inverses are warnings
    #[default]
    Lenient,
    /// The same problems are errors; generation still runs
    Strict,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown validation mode '{other}'")),
        }
    }
}

/// Package prefix of the emitted JPA annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceNamespace {
    #[default]
    Jakarta,
    Javax,
}

impl PersistenceNamespace {
    pub fn package(self) -> &'static str {
        match self {
            Self::Jakarta => "jakarta.persistence",
            Self::Javax => "javax.persistence",
        }
    }
}

impl FromStr for PersistenceNamespace {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "jakarta" => Ok(Self::Jakarta),
            "javax" => Ok(Self::Javax),
            other => Err(format!("unknown persistence namespace '{other}'")),
        }
    }
}

/// Effective configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub validation_mode: ValidationMode,
    pub infer_inverse_by_name: bool,
    pub detect_cycles: bool,
    pub circular_reference_guard: bool,
    pub generate_helpers: bool,
    pub generate_validation: bool,
    pub persistence_namespace: PersistenceNamespace,
    pub indent_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::Lenient,
            infer_inverse_by_name: true,
            detect_cycles: true,
            circular_reference_guard: true,
            generate_helpers: true,
            generate_validation: true,
            persistence_namespace: PersistenceNamespace::Jakarta,
            indent_width: 4,
        }
    }
}

/// On-disk layout: every key optional so files can override selectively
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    validation_mode: Option<ValidationMode>,
    infer_inverse_by_name: Option<bool>,
    detect_cycles: Option<bool>,
    circular_reference_guard: Option<bool>,
    generate_helpers: Option<bool>,
    generate_validation: Option<bool>,
    persistence_namespace: Option<PersistenceNamespace>,
    indent_width: Option<usize>,
}

impl ConfigFile {
    fn apply(self, config: &mut Config) {
        if let Some(value) = self.validation_mode {
            config.validation_mode = value;
        }
        if let Some(value) = self.infer_inverse_by_name {
            config.infer_inverse_by_name = value;
        }
        if let Some(value) = self.detect_cycles {
            config.detect_cycles = value;
        }
        if let Some(value) = self.circular_reference_guard {
            config.circular_reference_guard = value;
        }
        if let Some(value) = self.generate_helpers {
            config.generate_helpers = value;
        }
        if let Some(value) = self.generate_validation {
            config.generate_validation = value;
        }
        if let Some(value) = self.persistence_namespace {
            config.persistence_namespace = value;
        }
        if let Some(value) = self.indent_width {
            config.indent_width = value;
        }
    }
}

impl Config {
    /// Load the layered configuration for the current process
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(user_file) = user_config_file() {
            candidates.push(user_file);
        }
        candidates.push(PathBuf::from(CONFIG_FILE_NAME));

        for path in candidates {
            if path.is_file() {
                config.merge_file(&path)?;
            }
        }

        if let Some(path) = explicit {
            config.merge_file(path)?;
        }

        config.apply_env_overrides(std::env::vars());
        Ok(config)
    }

    /// Overlay the keys present in a TOML file
    pub fn merge_file(&mut self, path: &Path) -> Result<()> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        self.merge_toml(&source)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Applied configuration from {}", path.display());
        Ok(())
    }

    pub fn merge_toml(&mut self, source: &str) -> Result<()> {
        let file: ConfigFile = toml::from_str(source).context("Failed to parse configuration")?;
        file.apply(self);
        Ok(())
    }

    /// Overlay `RELSYNC_*` variables; malformed values are ignored
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let applied = match key.as_str() {
                "RELSYNC_VALIDATION_MODE" => parse_into(&value, &mut self.validation_mode),
                "RELSYNC_INFER_INVERSE_BY_NAME" => {
                    parse_into(&value, &mut self.infer_inverse_by_name)
                }
                "RELSYNC_DETECT_CYCLES" => parse_into(&value, &mut self.detect_cycles),
                "RELSYNC_PERSISTENCE_NAMESPACE" => {
                    parse_into(&value, &mut self.persistence_namespace)
                }
                "RELSYNC_INDENT_WIDTH" => parse_into(&value, &mut self.indent_width),
                _ => continue,
            };
            if applied {
                debug!("Applied environment override {key}={value}");
            } else {
                warn!("Ignoring malformed value '{value}' for {key}");
            }
        }
    }
}

fn parse_into<T: FromStr>(value: &str, target: &mut T) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *target = parsed;
            true
        }
        Err(_) => false,
    }
}
