//! File-based loading of input documents

use std::path::Path;

use tokio::fs;

use super::types::ApiSpec;
use crate::core::error::{Error, Result};

/// Read a JSON or YAML document from disk
pub async fn load_spec(path: &Path) -> Result<ApiSpec> {
    let content = fs::read_to_string(path).await?;
    let spec = parse_spec(&content, path.extension().and_then(|e| e.to_str()))?;
    tracing::info!(
        path = %path.display(),
        title = %spec.info.title,
        paths = spec.paths.len(),
        schemas = spec.components.schemas.len(),
        "Loaded API description"
    );
    Ok(spec)
}

/// Parse document text; without a recognised extension JSON is tried, then YAML.
///
/// The untyped document is kept on [`ApiSpec::source`] alongside the typed view.
pub fn parse_spec(content: &str, extension: Option<&str>) -> Result<ApiSpec> {
    let (mut spec, source): (ApiSpec, serde_yaml::Value) =
        match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => (serde_json::from_str(content)?, json_source(content)?),
            Some("yaml") | Some("yml") => (serde_yaml::from_str(content)?, serde_yaml::from_str(content)?),
            _ => match serde_json::from_str(content) {
                Ok(spec) => (spec, json_source(content)?),
                Err(_) => (
                    serde_yaml::from_str(content)
                        .map_err(|e| Error::spec(format!("Failed to parse API description: {e}")))?,
                    serde_yaml::from_str(content)?,
                ),
            },
        };
    spec.source = Some(source);
    Ok(spec)
}

fn json_source(content: &str) -> Result<serde_yaml::Value> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(serde_yaml::to_value(value)?)
}
