//! Run-scoped state and render contexts.
//!
//! A [`RunContext`] is created per generation run and threaded through every
//! phase. It owns the identifier registry, the diagnostics list and the
//! worklists that post-processing turns into global template values. Nothing in
//! here is shared between runs.

use std::collections::BTreeSet;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::core::config::ResolvedOptions;
use crate::generation::model::{CodegenParameter, EnumDefinition, MediaTypeInfo, SupportingFile};
use crate::generation::naming::IdentifierAllocator;
use crate::generation::registry::DeduplicationRegistry;
use crate::generation::strategy::TargetStrategy;
use crate::generation::types::{Diagnostic, DiagnosticKind};

/// State of one generation run
#[derive(Debug)]
pub struct RunContext {
    pub strategy: Arc<TargetStrategy>,
    pub options: ResolvedOptions,
    pub allocator: IdentifierAllocator,
    pub registry: DeduplicationRegistry,
    pub diagnostics: Vec<Diagnostic>,
    /// Unrecognized media types keyed by synthesized type name
    pub unknown_media_types: IndexMap<String, MediaTypeInfo>,
    /// Media type names under which each model travels as a request body
    pub model_media_types: IndexMap<String, BTreeSet<String>>,
    /// First parameter seen for every distinct parameter type name
    pub unique_params: IndexMap<String, CodegenParameter>,
    /// Distinct enum types by name
    pub enums: IndexMap<String, EnumDefinition>,
    /// Schema key to allocated classname
    pub model_names: IndexMap<String, String>,
    /// Global template values
    pub globals: Map<String, JsonValue>,
    pub supporting_files: Vec<SupportingFile>,
}

impl RunContext {
    pub fn new(strategy: Arc<TargetStrategy>, options: ResolvedOptions) -> Self {
        let allocator = IdentifierAllocator::new(Arc::clone(&strategy));
        Self {
            strategy,
            options,
            allocator,
            registry: DeduplicationRegistry::new(),
            diagnostics: Vec::new(),
            unknown_media_types: IndexMap::new(),
            model_media_types: IndexMap::new(),
            unique_params: IndexMap::new(),
            enums: IndexMap::new(),
            model_names: IndexMap::new(),
            globals: Map::new(),
            supporting_files: Vec::new(),
        }
    }

    /// Record and log a non-fatal finding
    pub fn warn<S: Into<String>, M: Into<String>>(
        &mut self,
        kind: DiagnosticKind,
        subject: S,
        message: M,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        tracing::warn!(kind = ?diagnostic.kind, subject = %diagnostic.subject, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    pub fn set_global<K: Into<String>, V: Serialize>(&mut self, key: K, value: V) {
        // serializing our own model types cannot fail
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.globals.insert(key.into(), value);
    }

    /// Whether enums become distinct types
    pub fn generate_enums(&self) -> bool {
        self.options.flag("generateEnums")
    }
}

/// Values a template is rendered against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    values: Map<String, JsonValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the run's global values
    pub fn with_globals(globals: &Map<String, JsonValue>) -> Self {
        Self {
            values: globals.clone(),
        }
    }

    /// Add a variable to the render context
    pub fn add_variable<V: Serialize>(&mut self, key: &str, value: V) {
        let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        self.values.insert(key.to_string(), value);
    }

    /// Merge every entry of `extensions` at the top level, overriding earlier values
    pub fn merge(&mut self, extensions: &IndexMap<String, JsonValue>) {
        for (key, value) in extensions {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge a JSON object (per-file overrides); other values are ignored
    pub fn merge_json(&mut self, overrides: &JsonValue) {
        if let Some(map) = overrides.as_object() {
            for (key, value) in map {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    /// Check if a variable exists
    pub fn has_variable(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.values.get(key)
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.values
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GeneratorConfig, common_options};
    use crate::generation::types::Target;
    use crate::infrastructure::strategies;
    use serde_json::json;

    #[test]
    fn test_render_context_merge_order() {
        let mut globals = Map::new();
        globals.insert("title".to_string(), json!("Petstore"));
        globals.insert("package".to_string(), json!("petstore"));

        let mut ctx = RenderContext::with_globals(&globals);
        let mut ext = IndexMap::new();
        ext.insert("package".to_string(), json!("overridden"));
        ctx.merge(&ext);
        ctx.merge_json(&json!({ "title": "File Title" }));

        assert_eq!(ctx.get("package"), Some(&json!("overridden")));
        assert_eq!(ctx.get("title"), Some(&json!("File Title")));
        assert!(!ctx.has_variable("missing"));
    }

    #[test]
    fn test_warn_collects_diagnostics() {
        let strategy = Arc::new(strategies::strategy_for(Target::Haskell));
        let options = GeneratorConfig::default()
            .resolve_options(&common_options())
            .unwrap();
        let mut ctx = RunContext::new(strategy, options);

        ctx.warn(DiagnosticKind::SchemaResolution, "Pet", "no type for map values");
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].to_string(), "Pet: no type for map values");
        assert!(ctx.generate_enums());
    }
}
