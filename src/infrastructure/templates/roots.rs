//! Template roots and the merged template set of a run
//!
//! Roots are consulted in priority order: an explicit override directory, the
//! user's config directory, then the templates embedded in the binary. A file
//! named `X.tera` is compiled and registered as logical template `X`; any other
//! file is a static asset whose bytes are copied as-is.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use rust_embed::RustEmbed;
use tokio::fs;
use tracing::{debug, info};

use crate::core::error::{Error, Result};
use crate::generation::Target;

/// Suffix marking a file as a template to compile
pub const TEMPLATE_SUFFIX: &str = ".tera";

/// Container for all templates embedded at compile time
#[derive(RustEmbed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// A source of template files
#[async_trait]
pub trait TemplateRoot: Send + Sync {
    /// Human readable origin, used in logs
    fn describe(&self) -> String;

    /// Every file of the root as (relative path with `/` separators, contents)
    async fn files(&self) -> Result<Vec<(String, Vec<u8>)>>;
}

/// Templates for one target embedded in the binary
pub struct EmbeddedRoot {
    target: Target,
}

impl EmbeddedRoot {
    pub fn new(target: Target) -> Self {
        Self { target }
    }

    fn prefix(&self) -> String {
        format!("{}/", self.target.as_str())
    }
}

#[async_trait]
impl TemplateRoot for EmbeddedRoot {
    fn describe(&self) -> String {
        format!("embedded:{}", self.target)
    }

    async fn files(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let prefix = self.prefix();
        let mut files = Vec::new();
        for path in EmbeddedTemplates::iter() {
            let Some(relative) = path.strip_prefix(&prefix) else {
                continue;
            };
            if let Some(file) = EmbeddedTemplates::get(path.as_ref()) {
                files.push((relative.to_string(), file.data.to_vec()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

/// Templates read from a directory on disk
pub struct FilesystemRoot {
    dir: PathBuf,
}

impl FilesystemRoot {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TemplateRoot for FilesystemRoot {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn files(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut files = Vec::new();
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.dir) else {
                    continue;
                };
                let relative = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                files.push((relative, fs::read(&path).await?));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

/// Whether a logical template compiles or is copied verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Template,
    Asset,
}

/// A resolved logical template
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub kind: EntryKind,
    pub content: Vec<u8>,
    /// Root the entry came from
    pub origin: String,
}

/// Logical templates merged across roots, highest priority first
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    entries: IndexMap<String, TemplateEntry>,
}

impl TemplateSet {
    /// Merge roots given in priority order
    pub async fn load(roots: &[Box<dyn TemplateRoot>]) -> Result<Self> {
        let mut set = Self::default();
        for root in roots {
            let origin = root.describe();
            let files = root.files().await?;
            debug!(root = %origin, files = files.len(), "Scanned template root");

            let mut claimed_here: Vec<String> = Vec::new();
            for (path, content) in files {
                let (name, kind) = match path.strip_suffix(TEMPLATE_SUFFIX) {
                    Some(name) => (name.to_string(), EntryKind::Template),
                    None => (path, EntryKind::Asset),
                };
                // within one root a compiled template beats an asset of the same name
                let replace = match set.entries.get(&name) {
                    None => true,
                    Some(existing) => {
                        claimed_here.contains(&name)
                            && existing.kind == EntryKind::Asset
                            && kind == EntryKind::Template
                    }
                };
                if replace {
                    set.entries.insert(
                        name.clone(),
                        TemplateEntry {
                            kind,
                            content,
                            origin: origin.clone(),
                        },
                    );
                    claimed_here.push(name);
                }
            }
        }
        info!(templates = set.entries.len(), roots = roots.len(), "Template set loaded");
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&TemplateEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TemplateEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-user template directory for a target
pub fn user_template_dir(target: Target) -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apiforge").join("templates").join(target.as_str()))
}

/// Roots for a run: the override directory, the user's config directory if
/// present, then the embedded defaults
pub fn default_roots(target: Target, override_dir: Option<&Path>) -> Result<Vec<Box<dyn TemplateRoot>>> {
    let mut roots: Vec<Box<dyn TemplateRoot>> = Vec::new();
    if let Some(dir) = override_dir {
        if !dir.is_dir() {
            return Err(Error::config(format!(
                "template directory {} does not exist",
                dir.display()
            )));
        }
        roots.push(Box::new(FilesystemRoot::new(dir)));
    }
    if let Some(dir) = user_template_dir(target) {
        if dir.is_dir() {
            roots.push(Box::new(FilesystemRoot::new(dir)));
        }
    }
    roots.push(Box::new(EmbeddedRoot::new(target)));
    Ok(roots)
}

/// Write the embedded template set of `target` under `output_dir` for customization
pub async fn export_embedded(target: Target, output_dir: &Path) -> Result<usize> {
    info!(target_language = %target, output_dir = %output_dir.display(), "Exporting templates");

    let files = EmbeddedRoot::new(target).files().await?;
    for (relative, content) in &files {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|source| Error::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content)
            .await
            .map_err(|source| Error::Write { path: path.clone(), source })?;
        debug!(file = %path.display(), "Exported template file");
    }

    info!(target_language = %target, file_count = files.len(), "Template export completed");
    Ok(files.len())
}
