//! Template set manifest parsing
//!
//! Every template set carries a `manifest.yml` listing the files it produces:
//!
//! ```yaml
//! name: haskell-http-client
//! files:
//!   - source: lib/Model.hs
//!     folder: "lib/{{ title }}"
//!     filename: Model.hs
//!   - source: lib/API.hs
//!     folder: "lib/{{ title }}/API"
//!     filename: "{{ classname }}.hs"
//!     for_each: api
//!     when: [generateLenses, "!useMonadLogger"]
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_value::Value as SerdeValue;

use crate::core::error::{Error, Result};
use crate::generation::{FilePlan, FileScope};

/// Logical name of the manifest inside a template set
pub const MANIFEST_NAME: &str = "manifest.yml";

/// Raw manifest YAML structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ManifestData {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub files: Vec<ManifestFileData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ManifestFileData {
    /// Logical template name, without the `.tera` suffix
    pub source: String,
    /// Destination folder relative to the output root; may use template syntax
    #[serde(default)]
    pub folder: String,
    /// Destination filename; defaults to the last segment of `source`
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub for_each: FileScope,
    /// Option names gating the file
    #[serde(default, deserialize_with = "deserialize_conditions")]
    pub when: Vec<String>,
    /// Additional context to pass to the template
    #[serde(default)]
    pub context: serde_json::Value,
}

/// A parsed template set manifest
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateManifest {
    pub name: String,
    pub description: Option<String>,
    pub files: Vec<FilePlan>,
}

impl ManifestData {
    /// Convert the raw manifest data into the domain model
    pub fn into_domain_model(self) -> TemplateManifest {
        TemplateManifest {
            name: self.name,
            description: self.description,
            files: self
                .files
                .into_iter()
                .map(|f| {
                    let filename = f.filename.unwrap_or_else(|| {
                        f.source.rsplit('/').next().unwrap_or(&f.source).to_string()
                    });
                    FilePlan {
                        template: f.source,
                        folder: f.folder,
                        filename,
                        scope: f.for_each,
                        when: f.when,
                        context: f.context,
                    }
                })
                .collect(),
        }
    }
}

/// Parse manifest YAML content into the domain model
pub fn parse_manifest_yaml(content: &str) -> Result<TemplateManifest> {
    let data: ManifestData = serde_yaml::from_str(content)?;
    if data.files.is_empty() {
        return Err(Error::config(format!("manifest '{}' lists no files", data.name)));
    }
    Ok(data.into_domain_model())
}

/// Accept a single condition or a list of conditions
fn deserialize_conditions<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = SerdeValue::deserialize(deserializer)?;

    match value {
        SerdeValue::String(s) => Ok(vec![s]),
        SerdeValue::Seq(seq) => seq
            .into_iter()
            .map(|item| match item {
                SerdeValue::String(s) => Ok(s),
                _ => Err(serde::de::Error::custom("Expected string or array of strings")),
            })
            .collect(),
        SerdeValue::Unit | SerdeValue::Option(None) => Ok(Vec::new()),
        _ => Err(serde::de::Error::custom("Expected string or array of strings")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_manifest() {
        let yaml = r#"
name: test-set
description: A test template set
files:
  - source: README.md
  - source: lib/Model.hs
    folder: "lib/{{ title }}"
  - source: api.hs
    folder: lib
    filename: "{{ classname }}.hs"
    for_each: api
    when: generateLenses
    context:
      custom_key: custom_value
  - source: model.pm
    for_each: model
    when: [generateLenses, "!strictFields"]
"#;
        let manifest = parse_manifest_yaml(yaml).unwrap();

        assert_eq!(manifest.name, "test-set");
        assert_eq!(manifest.files.len(), 4);

        let readme = &manifest.files[0];
        assert_eq!(readme.filename, "README.md");
        assert_eq!(readme.folder, "");
        assert_eq!(readme.scope, FileScope::None);
        assert!(readme.when.is_empty());

        assert_eq!(manifest.files[1].filename, "Model.hs");

        let api = &manifest.files[2];
        assert_eq!(api.scope, FileScope::Api);
        assert_eq!(api.when, vec!["generateLenses"]);
        assert_eq!(api.context, json!({ "custom_key": "custom_value" }));

        assert_eq!(manifest.files[3].scope, FileScope::Model);
        assert_eq!(manifest.files[3].when, vec!["generateLenses", "!strictFields"]);
    }

    #[test]
    fn test_invalid_manifests() {
        assert!(parse_manifest_yaml("name: empty\nfiles: []\n").unwrap_err().is_config());
        assert!(parse_manifest_yaml("name: x\nfiles:\n  - source: a\n    for_each: tag\n").is_err());
        assert!(parse_manifest_yaml("name: x\nfiles:\n  - source: a\n    when: { a: 1 }\n").is_err());
    }
}
