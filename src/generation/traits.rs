//! Port interfaces for the generation domain

use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::error::Result;
use crate::generation::context::RenderContext;
use crate::generation::types::Artifact;

/// Turns a logical template name and a context into file content
pub trait TemplateRenderer: Send + Sync {
    /// Render a logical template. Static assets come back unchanged.
    fn render(&self, template: &str, context: &RenderContext) -> Result<Vec<u8>>;

    /// Render an inline template string, e.g. a destination path
    fn render_str(&self, source: &str, context: &RenderContext) -> Result<String>;
}

/// Persists rendered artifacts
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Write an artifact, returning the path it was written to
    async fn write(&self, artifact: &Artifact) -> Result<PathBuf>;
}
