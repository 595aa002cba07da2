//! Tera-based template renderer implementation
//!
//! Missing values render as empty: when Tera reports an unknown variable the
//! renderer inserts an empty string at that path and tries again, up to
//! [`MAX_MISSING_KEYS`] times per render.

use std::error::Error as StdError;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tera::Tera;

use crate::core::error::{Error, Result};
use crate::generation::{RenderContext, TemplateRenderer};
use crate::infrastructure::templates::roots::{EntryKind, TemplateSet};

/// Retry bound for filling in missing variables
pub const MAX_MISSING_KEYS: usize = 256;

static MISSING_VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Variable `([^`]+)` not found in context").expect("valid missing-variable regex")
});

/// Renders the logical templates of one [`TemplateSet`]
pub struct TeraRenderer {
    tera: Tera,
    set: TemplateSet,
}

impl TeraRenderer {
    /// Compile every template of the set
    pub fn new(set: TemplateSet) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        let mut sources = Vec::new();
        for (name, entry) in set.entries() {
            if entry.kind != EntryKind::Template {
                continue;
            }
            let source = String::from_utf8(entry.content.clone())
                .map_err(|e| Error::render(name.as_str(), format!("template is not UTF-8: {e}")))?;
            sources.push((name.clone(), source));
        }
        tracing::debug!(templates = sources.len(), "Compiling templates");
        tera.add_raw_templates(sources)
            .map_err(|e| Error::render("<set>", error_chain(&e)))?;

        Ok(Self { tera, set })
    }

    pub fn set(&self) -> &TemplateSet {
        &self.set
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> Result<Vec<u8>> {
        let entry = self.set.get(template).ok_or_else(|| Error::TemplateNotFound {
            template: template.to_string(),
        })?;
        match entry.kind {
            EntryKind::Asset => Ok(entry.content.clone()),
            EntryKind::Template => {
                render_lenient(template, context, |ctx| self.tera.render(template, ctx))
                    .map(String::into_bytes)
            }
        }
    }

    fn render_str(&self, source: &str, context: &RenderContext) -> Result<String> {
        if !source.contains("{{") && !source.contains("{%") {
            return Ok(source.to_string());
        }
        render_lenient(source, context, |ctx| Tera::one_off(source, ctx, false))
    }
}

fn render_lenient<F>(template: &str, context: &RenderContext, render: F) -> Result<String>
where
    F: Fn(&tera::Context) -> tera::Result<String>,
{
    let mut values = context.clone().into_json();
    for _ in 0..MAX_MISSING_KEYS {
        let tera_ctx = tera::Context::from_value(values.clone())
            .map_err(|e| Error::render(template, error_chain(&e)))?;

        let err = match render(&tera_ctx) {
            Ok(rendered) => return Ok(rendered),
            Err(err) => err,
        };
        let message = error_chain(&err);
        let Some(key) = missing_key(&message) else {
            return Err(Error::render(template, message));
        };
        if !insert_empty(&mut values, &key) {
            return Err(Error::Render {
                template: template.to_string(),
                entity: None,
                key: Some(key),
                message,
            });
        }
        tracing::debug!(template = %template, key = %key, "Rendering missing value as empty");
    }
    Err(Error::render(
        template,
        format!("more than {MAX_MISSING_KEYS} missing values"),
    ))
}

/// The full message of an error and its sources
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn missing_key(message: &str) -> Option<String> {
    MISSING_VARIABLE
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split `a.b[0]["c"]` into `a`, `b`, `0`, `c`
fn key_segments(key: &str) -> Vec<String> {
    key.replace('[', ".")
        .split('.')
        .map(|s| s.trim_end_matches(']').trim_matches(|c: char| c == '"' || c == '\''))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Insert an empty string at `key`; returns whether anything changed.
///
/// A key whose head is not a top-level value is taken to name a loop variable,
/// so the rest of the path is filled in on every object held in an array.
fn insert_empty(values: &mut JsonValue, key: &str) -> bool {
    let segments = key_segments(key);
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    let has_head = values.as_object().is_some_and(|root| root.contains_key(head));
    if has_head || rest.is_empty() {
        return insert_at(values, &segments);
    }
    if fill_array_elements(values, rest) {
        return true;
    }
    insert_at(values, &segments)
}

fn insert_at(value: &mut JsonValue, segments: &[String]) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };
    match value {
        JsonValue::Object(map) => {
            if rest.is_empty() {
                return match map.get(head) {
                    None | Some(JsonValue::Null) => {
                        map.insert(head.clone(), JsonValue::String(String::new()));
                        true
                    }
                    Some(_) => false,
                };
            }
            let child = map
                .entry(head.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if child.is_null() {
                *child = JsonValue::Object(Map::new());
            }
            insert_at(child, rest)
        }
        JsonValue::Array(items) => match head.parse::<usize>() {
            Ok(index) => items
                .get_mut(index)
                .is_some_and(|item| insert_at(item, rest)),
            Err(_) => false,
        },
        _ => false,
    }
}

fn fill_array_elements(value: &mut JsonValue, segments: &[String]) -> bool {
    let mut changed = false;
    match value {
        JsonValue::Object(map) => {
            for child in map.values_mut() {
                changed |= fill_array_elements(child, segments);
            }
        }
        JsonValue::Array(items) => {
            for item in items.iter_mut() {
                if item.is_object() {
                    changed |= insert_at(item, segments);
                }
                changed |= fill_array_elements(item, segments);
            }
        }
        _ => {}
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::templates::roots::{FilesystemRoot, TemplateRoot};
    use serde_json::json;
    use tempfile::TempDir;

    async fn renderer(files: &[(&str, &str)]) -> (TempDir, TeraRenderer) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            tokio::fs::write(dir.path().join(name), content).await.unwrap();
        }
        let roots: Vec<Box<dyn TemplateRoot>> = vec![Box::new(FilesystemRoot::new(dir.path()))];
        let set = TemplateSet::load(&roots).await.unwrap();
        (dir, TeraRenderer::new(set).unwrap())
    }

    fn context(value: JsonValue) -> RenderContext {
        let mut ctx = RenderContext::new();
        for (key, value) in value.as_object().unwrap() {
            ctx.add_variable(key, value);
        }
        ctx
    }

    #[tokio::test]
    async fn test_templates_and_assets() {
        let (_dir, renderer) = renderer(&[
            ("Cargo.toml.tera", "name = \"{{ package }}\""),
            ("logo.txt", "{{ untouched }}"),
        ])
        .await;
        let ctx = context(json!({ "package": "petstore" }));

        assert_eq!(renderer.render("Cargo.toml", &ctx).unwrap(), b"name = \"petstore\"".to_vec());
        assert_eq!(renderer.render("logo.txt", &ctx).unwrap(), b"{{ untouched }}".to_vec());

        let err = renderer.render("missing", &ctx).unwrap_err();
        assert!(matches!(err, Error::TemplateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_values_render_empty() {
        let (_dir, renderer) = renderer(&[(
            "model.tera",
            "[{{ model.x_missing }}]{% for var in model.vars %}<{{ var.name }}{{ var.x_flag }}>{% endfor %}{{ absent }}",
        )])
        .await;
        let ctx = context(json!({
            "model": { "vars": [{ "name": "a" }, { "name": "b", "x_flag": "!" }] }
        }));

        let rendered = renderer.render("model", &ctx).unwrap();
        assert_eq!(String::from_utf8(rendered).unwrap(), "[]<a><b!>");
    }

    #[tokio::test]
    async fn test_render_str_for_paths() {
        let (_dir, renderer) = renderer(&[]).await;
        let ctx = context(json!({ "title": "Petstore" }));

        assert_eq!(renderer.render_str("lib/{{ title }}", &ctx).unwrap(), "lib/Petstore");
        assert_eq!(renderer.render_str("plain/path", &ctx).unwrap(), "plain/path");
        assert_eq!(renderer.render_str("{{ nothing }}x", &ctx).unwrap(), "x");
    }

    #[tokio::test]
    async fn test_syntax_errors_are_render_errors() {
        let (_dir, renderer) = renderer(&[]).await;
        let err = renderer
            .render_str("{{ unclosed", &RenderContext::new())
            .unwrap_err();
        assert!(matches!(err, Error::Render { .. }));
    }

    #[test]
    fn test_key_segments() {
        assert_eq!(key_segments("model.vars[0].name"), vec!["model", "vars", "0", "name"]);
        assert_eq!(key_segments("a[\"b\"]"), vec!["a", "b"]);
    }
}
