//! Error handling for the apiforge generation engine.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Schema resolution problems that
//! do not stop a run are not errors; they are collected as
//! [`Diagnostic`](crate::generation::Diagnostic)s on the run context instead.
//!
//! # Examples
//!
//! ```
//! use apiforge::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("output directory is required"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for apiforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apiforge operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing option, unknown target. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The registry ran out of numeric suffixes for a candidate name
    #[error("No free identifier left for candidate '{candidate}'")]
    NameCollisionExhausted { candidate: String },

    /// No template root provides the requested logical template
    #[error("Template not found: {template}")]
    TemplateNotFound { template: String },

    /// Template execution failed
    #[error("Render error in template '{template}'{}{}: {message}",
        .entity.as_ref().map(|e| format!(" for '{e}'")).unwrap_or_default(),
        .key.as_ref().map(|k| format!(" (key '{k}')")).unwrap_or_default())]
    Render {
        template: String,
        entity: Option<String>,
        key: Option<String>,
        message: String,
    },

    /// Writing a generated file failed
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input document is structurally unusable
    #[error("Input specification error: {0}")]
    Spec(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new input specification error
    pub fn spec<S: Into<String>>(msg: S) -> Self {
        Self::Spec(msg.into())
    }

    /// Create a render error for a template with no further context
    pub fn render<T: Into<String>, M: Into<String>>(template: T, message: M) -> Self {
        Self::Render {
            template: template.into(),
            entity: None,
            key: None,
            message: message.into(),
        }
    }

    /// Attach the entity being rendered, if the error carries one
    pub fn for_entity(self, name: &str) -> Self {
        match self {
            Self::Render {
                template,
                entity: None,
                key,
                message,
            } => Self::Render {
                template,
                entity: Some(name.to_string()),
                key,
                message,
            },
            other => other,
        }
    }

    /// Whether this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let err = Error::config("missing target");
        assert_eq!(err.to_string(), "Configuration error: missing target");

        let err = Error::TemplateNotFound {
            template: "model.hs".to_string(),
        };
        assert_eq!(err.to_string(), "Template not found: model.hs");

        let err = Error::NameCollisionExhausted {
            candidate: "Pet".to_string(),
        };
        assert!(err.to_string().contains("'Pet'"));
    }

    #[test]
    fn test_render_error_names_template_entity_and_key() {
        let err = Error::Render {
            template: "model".to_string(),
            entity: Some("Pet".to_string()),
            key: Some("x_data_type".to_string()),
            message: "cannot fill".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Render error in template 'model' for 'Pet' (key 'x_data_type'): cannot fill"
        );

        let bare = Error::render("api", "boom");
        assert_eq!(bare.to_string(), "Render error in template 'api': boom");
    }

    #[test]
    fn test_for_entity_only_touches_render_errors() {
        let err = Error::render("model", "boom").for_entity("Pet");
        assert!(matches!(err, Error::Render { entity: Some(ref e), .. } if e == "Pet"));

        let err = Error::config("x").for_entity("Pet");
        assert!(err.is_config());
    }

    #[test]
    fn test_write_error_carries_path() {
        let err = Error::Write {
            path: PathBuf::from("/out/lib/Model.hs"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/out/lib/Model.hs"));
    }

    #[test]
    fn test_error_conversions() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
