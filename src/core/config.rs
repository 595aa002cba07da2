//! Generator configuration.
//!
//! A run is configured by a [`GeneratorConfig`], which can be read from a TOML,
//! YAML or JSON file and then overridden from the command line. Target-specific
//! knobs live in a flat `options` table; each target declares the options it
//! understands as [`OptionSpec`]s and [`GeneratorConfig::resolve_options`]
//! validates the supplied values against those declarations.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// A single option value as it appears in config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl OptionValue {
    fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Number(_) => OptionKind::Number,
            OptionValue::String(_) => OptionKind::String,
            OptionValue::List(_) => OptionKind::List,
        }
    }

    /// Coerce this value into `kind`, accepting the string forms the CLI produces
    fn coerce(self, name: &str, kind: OptionKind) -> Result<OptionValue> {
        match (kind, self) {
            (OptionKind::Bool, OptionValue::Bool(b)) => Ok(OptionValue::Bool(b)),
            (OptionKind::Bool, OptionValue::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(OptionValue::Bool(true)),
                "false" | "no" | "0" => Ok(OptionValue::Bool(false)),
                _ => Err(Error::config(format!(
                    "option '{name}' expects a boolean, got '{s}'"
                ))),
            },
            (OptionKind::Number, OptionValue::Number(n)) => Ok(OptionValue::Number(n)),
            (OptionKind::Number, OptionValue::String(s)) => {
                s.trim().parse::<f64>().map(OptionValue::Number).map_err(|_| {
                    Error::config(format!("option '{name}' expects a number, got '{s}'"))
                })
            }
            (OptionKind::String, OptionValue::String(s)) => Ok(OptionValue::String(s)),
            (OptionKind::String, OptionValue::Bool(b)) => Ok(OptionValue::String(b.to_string())),
            (OptionKind::String, OptionValue::Number(n)) => Ok(OptionValue::String(n.to_string())),
            (OptionKind::List, OptionValue::List(l)) => Ok(OptionValue::List(l)),
            (OptionKind::List, OptionValue::String(s)) => Ok(OptionValue::List(
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            (kind, other) => Err(Error::config(format!(
                "option '{name}' expects a {kind}, got a {}",
                other.kind()
            ))),
        }
    }

    /// JSON form used in render contexts
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            OptionValue::Bool(b) => serde_json::Value::Bool(*b),
            OptionValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            OptionValue::String(s) => serde_json::Value::String(s.clone()),
            OptionValue::List(l) => serde_json::Value::from(l.clone()),
        }
    }
}

/// Declared type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Number,
    String,
    List,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Bool => write!(f, "boolean"),
            OptionKind::Number => write!(f, "number"),
            OptionKind::String => write!(f, "string"),
            OptionKind::List => write!(f, "list"),
        }
    }
}

/// Declaration of an option a target understands
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    /// `None` means unset by default (only meaningful for strings)
    pub default: Option<OptionValue>,
}

impl OptionSpec {
    pub fn flag(name: &'static str, description: &'static str, default: bool) -> Self {
        Self {
            name,
            description,
            kind: OptionKind::Bool,
            default: Some(OptionValue::Bool(default)),
        }
    }

    pub fn string(name: &'static str, description: &'static str, default: Option<&str>) -> Self {
        Self {
            name,
            description,
            kind: OptionKind::String,
            default: default.map(|d| OptionValue::String(d.to_string())),
        }
    }

    pub fn list(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            kind: OptionKind::List,
            default: Some(OptionValue::List(Vec::new())),
        }
    }
}

/// Options shared by every target
pub fn common_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::flag(
            "generateEnums",
            "Generate distinct types for enumerated schemas and parameters",
            true,
        ),
        OptionSpec::flag(
            "inlineMimeTypes",
            "Embed the single consumed/produced media type directly in the operation",
            false,
        ),
        OptionSpec::flag(
            "generateFormUrlEncodedInstances",
            "Generate form-urlencoded encoders for models sent as form bodies",
            true,
        ),
        OptionSpec::flag(
            "paramShapeSuffix",
            "On a parameter type name clash, try appending the data type before numbering",
            false,
        ),
        OptionSpec::flag(
            "hideGenerationTimestamp",
            "Leave the generation timestamp out of generated files",
            true,
        ),
        OptionSpec::string(
            "dateFormat",
            "Format string used for date values",
            Some("%Y-%m-%d"),
        ),
        OptionSpec::string("dateTimeFormat", "Format string used for date-time values", None),
        OptionSpec::list(
            "includeOperations",
            "Only generate these operation ids (empty means all)",
        ),
        OptionSpec::list("excludeOperations", "Never generate these operation ids"),
    ]
}

/// Validated option values for one run
#[derive(Debug, Clone, Default)]
pub struct ResolvedOptions {
    values: IndexMap<String, OptionValue>,
}

impl ResolvedOptions {
    /// Boolean option, `false` when unset
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(OptionValue::List(l)) => l.as_slice(),
            _ => &[],
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }
}

/// Configuration of a single generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorConfig {
    /// Target name, e.g. `haskell`
    pub target: Option<String>,
    /// Input document
    pub spec: Option<PathBuf>,
    /// Output root
    pub output: Option<PathBuf>,
    /// Template override root, searched before the built-in templates
    pub templates: Option<PathBuf>,
    /// Target options
    pub options: IndexMap<String, OptionValue>,
}

impl GeneratorConfig {
    /// Load a configuration file; the format follows the file extension
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let config = match ext.as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(Error::config(format!(
                    "unsupported config file extension '{other}' for {}",
                    path.display()
                )));
            }
        };
        tracing::debug!(path = %path.display(), "Loaded generator configuration");
        Ok(config)
    }

    /// Set an option, replacing any earlier value
    pub fn set_option<K: Into<String>>(&mut self, key: K, value: OptionValue) {
        self.options.insert(key.into(), value);
    }

    /// Apply a `key=value` override as given on the command line
    pub fn apply_define(&mut self, define: &str) -> Result<()> {
        let (key, value) = define.split_once('=').ok_or_else(|| {
            Error::config(format!("expected key=value, got '{define}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::config(format!("empty option name in '{define}'")));
        }
        self.set_option(key, OptionValue::String(value.trim().to_string()));
        Ok(())
    }

    /// Output root, which every run requires
    pub fn output_dir(&self) -> Result<&Path> {
        self.output
            .as_deref()
            .ok_or_else(|| Error::config("an output directory is required"))
    }

    /// Validate supplied options against `declared`, filling in defaults.
    ///
    /// Undeclared options pass through unchanged so that templates can read them.
    pub fn resolve_options(&self, declared: &[OptionSpec]) -> Result<ResolvedOptions> {
        let mut values = IndexMap::new();
        for spec in declared {
            if let Some(default) = &spec.default {
                values.insert(spec.name.to_string(), default.clone());
            }
        }

        for (name, value) in &self.options {
            let resolved = match declared.iter().find(|spec| spec.name == name) {
                Some(spec) => value.clone().coerce(name, spec.kind)?,
                None => {
                    tracing::debug!(option = %name, "Passing through undeclared option");
                    value.clone()
                }
            };
            values.insert(name.clone(), resolved);
        }

        Ok(ResolvedOptions { values })
    }
}
