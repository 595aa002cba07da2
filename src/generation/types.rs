//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::config::{OptionValue, ResolvedOptions};
use crate::core::error::Error;

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Haskell,
    Perl,
    Rust,
}

impl Target {
    /// Get the display name for this target
    pub fn display_name(&self) -> &'static str {
        match self {
            Target::Haskell => "Haskell",
            Target::Perl => "Perl",
            Target::Rust => "Rust",
        }
    }

    /// Get the source file extension for this target
    pub fn file_extension(&self) -> &'static str {
        match self {
            Target::Haskell => "hs",
            Target::Perl => "pm",
            Target::Rust => "rs",
        }
    }

    /// Lowercase name, also used as the template directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Haskell => "haskell",
            Target::Perl => "perl",
            Target::Rust => "rust",
        }
    }

    /// Get all supported targets
    pub fn all() -> Vec<Target> {
        vec![Target::Haskell, Target::Perl, Target::Rust]
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "haskell" | "hs" | "haskell-http-client" => Ok(Target::Haskell),
            "perl" | "pl" => Ok(Target::Perl),
            "rust" | "rs" => Ok(Target::Rust),
            _ => Err(Error::config(format!("unknown target '{s}'"))),
        }
    }
}

/// Non-fatal findings collected during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// A type could not be determined and a fallback was used
    SchemaResolution,
    /// An identifier was renamed to keep it unique
    Renamed,
    /// Input that was understood but not supported
    Unsupported,
}

/// A warning surfaced to the caller without halting the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Model name, operation id or other locator
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// What a planned output file is rendered once for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileScope {
    /// A supporting file rendered once per run
    #[default]
    None,
    Model,
    Operation,
    /// Once per tag group of operations
    Api,
}

/// One output file declared by a template set
#[derive(Debug, Clone, PartialEq)]
pub struct FilePlan {
    /// Logical template name
    pub template: String,
    /// Destination folder, itself a template
    pub folder: String,
    /// Destination filename, itself a template
    pub filename: String,
    pub scope: FileScope,
    /// Option names that must all be truthy; a leading `!` negates
    pub when: Vec<String>,
    /// Values layered over the entity context
    pub context: JsonValue,
}

impl FilePlan {
    /// Whether every `when` condition holds for `options`
    pub fn is_enabled(&self, options: &ResolvedOptions) -> bool {
        self.when.iter().all(|condition| match condition.strip_prefix('!') {
            Some(name) => !is_truthy(options.get(name)),
            None => is_truthy(options.get(condition)),
        })
    }
}

fn is_truthy(value: Option<&OptionValue>) -> bool {
    match value {
        Some(OptionValue::Bool(b)) => *b,
        Some(OptionValue::Number(n)) => *n != 0.0,
        Some(OptionValue::String(s)) => !s.is_empty() && s != "false",
        Some(OptionValue::List(l)) => !l.is_empty(),
        None => false,
    }
}

/// A rendered file, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub permissions: Option<u32>,
}

impl Artifact {
    /// Rendered output; scripts starting with a shebang are made executable
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        let permissions = content.starts_with(b"#!").then_some(0o755);
        Self {
            path,
            content,
            permissions,
        }
    }
}
