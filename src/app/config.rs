//! Configuration Management

use crate::artifact::writer::{ArtifactWriter, DEFAULT_EXTENSION};
use crate::codegen::tab_switch::TabSwitchPolicy;
use crate::synthesis::selector_policy::SelectorResolutionPolicy;
use crate::workflow::compiler::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where generated scripts land
    #[serde(default)]
    pub output: OutputConfig,
    /// Statement emission settings
    #[serde(default)]
    pub emission: EmissionConfig,
    /// Run-time behavior of tab switches
    #[serde(default)]
    pub tab_switch: TabSwitchPolicy,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory (defaults to ~/.flow_compiler/generated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// File extension without the leading dot
    pub extension: String,
}

/// Emission configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionConfig {
    /// How selector candidates are resolved in the emitted script
    pub selector_policy: SelectorResolutionPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    /// Returns Ok(()) if valid, or Err with a description of the first invalid field.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.output.extension.trim().trim_start_matches('.').is_empty() {
            return Err(crate::Error::Config("output.extension must not be empty".to_string()));
        }
        CompilerConfig::from(self).validate()
    }

    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from default location
    pub fn load_default() -> Result<Self, crate::Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<(), crate::Error> {
        let content = self.to_toml()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".flow_compiler").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Generate TOML representation
    pub fn to_toml(&self) -> Result<String, crate::Error> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Look up a dotted key such as `emission.selector_policy.strategy`
    pub fn get_value(&self, key: &str) -> Result<Option<toml::Value>, crate::Error> {
        let root = toml::Value::try_from(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        let mut current = &root;
        for part in key.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    /// Return a copy with the dotted `key` set to `raw`.
    ///
    /// `raw` is read as the type the key already holds. Unset keys take an
    /// integer or boolean when `raw` parses as one and the result still
    /// deserializes, and a string otherwise. The result must validate.
    pub fn with_value(&self, key: &str, raw: &str) -> Result<Self, crate::Error> {
        let mut root = toml::Value::try_from(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| crate::Error::Config("empty configuration key".to_string()))?;

        let mut table = root
            .as_table_mut()
            .ok_or_else(|| crate::Error::Config("configuration root is not a table".to_string()))?;
        for part in parents {
            table = table
                .entry(part.to_string())
                .or_insert(toml::Value::Table(toml::map::Map::new()))
                .as_table_mut()
                .ok_or_else(|| crate::Error::Config(format!("'{}' is not a section", part)))?;
        }
        let updated = match table.get(*last) {
            Some(existing) => {
                let value = parse_as(existing, raw)
                    .ok_or_else(|| crate::Error::Config(format!("invalid value for '{}': {}", key, raw)))?;
                table.insert(last.to_string(), value);
                Self::from_value(root, key)?
            }
            None => {
                // Unset keys have no type to follow; fall back to a string when the guess fails
                let guessed = parse_scalar(raw);
                let is_string = guessed.is_str();
                table.insert(last.to_string(), guessed);
                match Self::from_value(root.clone(), key) {
                    Ok(updated) => updated,
                    Err(_) if !is_string => {
                        let mut root = root;
                        set_leaf(&mut root, &parts, toml::Value::String(raw.to_string()));
                        Self::from_value(root, key)?
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        updated.validate()?;
        Ok(updated)
    }

    fn from_value(root: toml::Value, key: &str) -> Result<Self, crate::Error> {
        root.try_into()
            .map_err(|e: toml::de::Error| crate::Error::Config(format!("invalid value for '{}': {}", key, e)))
    }

    /// Output directory, falling back to `default_dir` when unset
    pub fn output_dir(&self, default_dir: PathBuf) -> PathBuf {
        self.output.dir.clone().unwrap_or(default_dir)
    }

    /// Writer for the configured extension rooted at `dir`
    pub fn writer(&self, dir: PathBuf) -> ArtifactWriter {
        ArtifactWriter::new(dir).with_extension(self.output.extension.clone())
    }
}

impl From<&Config> for CompilerConfig {
    fn from(config: &Config) -> Self {
        Self {
            selector_policy: config.emission.selector_policy,
            tab_switch: config.tab_switch,
            ..Default::default()
        }
    }
}

/// Parse `raw` as the same TOML type as `existing`
fn parse_as(existing: &toml::Value, raw: &str) -> Option<toml::Value> {
    match existing {
        toml::Value::String(_) => Some(toml::Value::String(raw.to_string())),
        toml::Value::Integer(_) => raw.parse::<i64>().ok().map(toml::Value::Integer),
        toml::Value::Boolean(_) => raw.parse::<bool>().ok().map(toml::Value::Boolean),
        toml::Value::Float(_) => raw.parse::<f64>().ok().map(toml::Value::Float),
        _ => None,
    }
}

fn set_leaf(root: &mut toml::Value, parts: &[&str], value: toml::Value) {
    if let Some((last, parents)) = parts.split_last() {
        let mut node = root;
        for part in parents {
            match node.get_mut(*part) {
                Some(child) => node = child,
                None => return,
            }
        }
        if let Some(table) = node.as_table_mut() {
            table.insert(last.to_string(), value);
        }
    }
}

fn parse_scalar(raw: &str) -> toml::Value {
    if let Ok(n) = raw.parse::<i64>() {
        toml::Value::Integer(n)
    } else if let Ok(b) = raw.parse::<bool>() {
        toml::Value::Boolean(b)
    } else {
        toml::Value::String(raw.to_string())
    }
}
