//! Template sources, manifests and rendering

pub mod manifest;
pub mod renderer;
pub mod roots;

pub use manifest::*;
pub use renderer::*;
pub use roots::*;

use crate::core::error::{Error, Result};

impl TemplateSet {
    /// Parse the set's manifest
    pub fn manifest(&self) -> Result<TemplateManifest> {
        let entry = self.get(MANIFEST_NAME).ok_or_else(|| Error::TemplateNotFound {
            template: MANIFEST_NAME.to_string(),
        })?;
        let content = String::from_utf8_lossy(&entry.content);
        let manifest = parse_manifest_yaml(&content)?;
        tracing::debug!(
            manifest = %manifest.name,
            origin = %entry.origin,
            files = manifest.files.len(),
            "Loaded template manifest"
        );
        Ok(manifest)
    }
}
