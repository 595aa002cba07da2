//! Schema resolution.
//!
//! Component schemas are resolved in two passes. The first reserves a classname
//! for every schema (so `$ref`s, forward or cyclic, always resolve to a name),
//! the second walks each schema into a [`CodegenModel`]. Inline object schemas
//! met along the way become synthesized models of their own.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::core::error::Result;
use crate::core::utils::lower_first;
use crate::generation::context::RunContext;
use crate::generation::model::{
    CodegenModel, CodegenProperty, ContainerType, EnumDefinition, EnumVar, input_extensions,
};
use crate::generation::naming::Role;
use crate::generation::registry::{RecordKind, enum_fingerprint};
use crate::generation::sanitizers::escape_text;
use crate::generation::types::DiagnosticKind;
use crate::infrastructure::openapi::{AdditionalProperties, ApiSpec, SchemaNode};

/// Where an unnamed schema sits; used to name enums and inline models
#[derive(Debug, Clone)]
pub struct TypeHint {
    /// Classname or operation id owning the schema
    pub owner: String,
    /// Field or parameter name
    pub name: String,
}

impl TypeHint {
    pub fn new<O: Into<String>, N: Into<String>>(owner: O, name: N) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Walks schema nodes into models and properties
pub struct SchemaResolver<'a> {
    schemas: &'a IndexMap<String, SchemaNode>,
    inline_models: Vec<CodegenModel>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schemas: &'a IndexMap<String, SchemaNode>) -> Self {
        Self {
            schemas,
            inline_models: Vec::new(),
        }
    }

    /// First pass: reserve a classname for every component schema
    pub fn register_model_names(&mut self, ctx: &mut RunContext) -> Result<()> {
        let schemas = self.schemas;
        for (name, schema) in schemas {
            let candidate = ctx.allocator
                .allocate(name, Role::Type, Some(ctx.strategy.model_prefix.as_str()));
            let classname = if is_enum_schema(schema) {
                let fingerprint = enum_fingerprint(&schema.enum_values);
                ctx.registry.reserve_unique(&candidate, &fingerprint, RecordKind::Enum)?
            } else {
                ctx.registry.reserve_unique(&candidate, name, RecordKind::Model)?
            };

            if classname != candidate {
                ctx.warn(
                    DiagnosticKind::Renamed,
                    name.as_str(),
                    format!("model name '{candidate}' already taken, using '{classname}'"),
                );
            }
            tracing::debug!(schema = %name, classname = %classname, "Registered model name");
            ctx.model_names.insert(name.clone(), classname);
        }
        Ok(())
    }

    /// Second pass: resolve every component schema, then the inline models found
    pub fn resolve_models(&mut self, ctx: &mut RunContext) -> Result<Vec<CodegenModel>> {
        let schemas = self.schemas;
        let mut models = Vec::with_capacity(schemas.len());
        for (name, schema) in schemas {
            models.push(self.resolve_model(ctx, name, schema)?);
        }
        models.extend(self.take_inline_models());
        Ok(models)
    }

    /// Component schema a `$ref` points at
    pub fn lookup(&self, reference: &str) -> Option<&'a SchemaNode> {
        self.schemas.get(ApiSpec::ref_name(reference))
    }

    /// Models synthesized from inline object schemas since the last call
    pub fn take_inline_models(&mut self) -> Vec<CodegenModel> {
        std::mem::take(&mut self.inline_models)
    }

    /// Resolve one named schema
    pub fn resolve_model(
        &mut self,
        ctx: &mut RunContext,
        name: &str,
        schema: &SchemaNode,
    ) -> Result<CodegenModel> {
        let classname = match ctx.model_names.get(name) {
            Some(classname) => classname.clone(),
            None => {
                let candidate =
                    ctx.allocator.allocate(name, Role::Type, Some(ctx.strategy.model_prefix.as_str()));
                let classname = ctx.registry.reserve_unique(&candidate, name, RecordKind::Model)?;
                ctx.model_names.insert(name.to_string(), classname.clone());
                classname
            }
        };
        self.build_model(ctx, name, &classname, schema)
    }

    fn build_model(
        &mut self,
        ctx: &mut RunContext,
        name: &str,
        classname: &str,
        schema: &SchemaNode,
    ) -> Result<CodegenModel> {
        tracing::debug!(schema = %name, classname = %classname, "Resolving model");
        let mut model = CodegenModel {
            name: name.to_string(),
            classname: classname.to_string(),
            description: schema
                .description
                .as_deref()
                .map(|d| escape_text(d, &ctx.strategy.unsafe_text)),
            vendor_extensions: input_extensions(&schema.extensions),
            ..Default::default()
        };

        if is_enum_schema(schema) {
            let base = self.primitive(ctx, classname, schema);
            model.is_enum = true;
            model.allowable_values = schema.enum_values.clone();
            model.enum_vars = enum_vars(ctx, &schema.enum_values, classname);
            model.data_type = Some(base.datatype);
        } else if !schema.all_of.is_empty() {
            let (parent, properties, required) = self.compose(ctx, name, schema);
            model.parent = parent;
            model.vars = self.resolve_vars(ctx, classname, &properties, &required)?;
        } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            ctx.warn(
                DiagnosticKind::SchemaResolution,
                name,
                "oneOf/anyOf composition is ambiguous, falling back to an untyped alias",
            );
            model.is_alias = true;
            model.data_type = Some(ctx.strategy.any_type.clone());
        } else if schema.is_object() && !schema.is_map() {
            model.vars = self.resolve_vars(ctx, classname, &schema.properties, &schema.required)?;
        } else {
            let hint = TypeHint::new(classname, name);
            let aliased = self.resolve_type(ctx, schema, &hint)?;
            model.is_alias = true;
            model.data_type = Some(aliased.datatype_with_enum);
        }

        Ok(model)
    }

    fn resolve_vars(
        &mut self,
        ctx: &mut RunContext,
        classname: &str,
        properties: &IndexMap<String, SchemaNode>,
        required: &[String],
    ) -> Result<Vec<CodegenProperty>> {
        let mut vars = Vec::with_capacity(properties.len());
        for (key, node) in properties {
            let mut prop = self.resolve_property(ctx, key, node, classname)?;
            prop.required = required.iter().any(|r| r == key);
            vars.push(prop);
        }
        Ok(vars)
    }

    /// Resolve a field of `containing_model`
    pub fn resolve_property(
        &mut self,
        ctx: &mut RunContext,
        name: &str,
        schema: &SchemaNode,
        containing_model: &str,
    ) -> Result<CodegenProperty> {
        let prefix = ctx
            .strategy
            .prefix_fields_with_model
            .then(|| lower_first(containing_model));
        let var_name = ctx.allocator.allocate(name, Role::Variable, prefix.as_deref());

        let hint = TypeHint::new(containing_model, name);
        let mut prop = self.resolve_type(ctx, schema, &hint)?;
        prop.name = var_name;
        prop.base_name = name.to_string();
        prop.description = schema
            .description
            .as_deref()
            .map(|d| escape_text(d, &ctx.strategy.unsafe_text));
        prop.default_value = schema.default.as_ref().map(|v| default_literal(ctx, v));
        prop.vendor_extensions.extend(input_extensions(&schema.extensions));
        Ok(prop)
    }

    /// Resolve the type of an unnamed schema (parameters, bodies, fields)
    pub fn resolve_type(
        &mut self,
        ctx: &mut RunContext,
        schema: &SchemaNode,
        hint: &TypeHint,
    ) -> Result<CodegenProperty> {
        if let Some(reference) = &schema.reference {
            return Ok(self.referenced(ctx, reference, hint));
        }

        if schema.is_array() {
            let inner = match &schema.items {
                Some(items) => self.resolve_type(ctx, items, hint)?,
                None => {
                    ctx.warn(
                        DiagnosticKind::SchemaResolution,
                        subject(hint),
                        "array without items, using an untyped element",
                    );
                    self.any(ctx)
                }
            };
            return Ok(self.wrap(ctx, ContainerType::Array, inner));
        }

        if schema.is_map() {
            let inner = match &schema.additional_properties {
                Some(AdditionalProperties::Schema(value)) if has_type_info(value) => {
                    self.resolve_type(ctx, value, hint)?
                }
                _ => {
                    ctx.warn(
                        DiagnosticKind::SchemaResolution,
                        subject(hint),
                        "map value schema has no type, using an untyped value",
                    );
                    self.any(ctx)
                }
            };
            return Ok(self.wrap(ctx, ContainerType::Map, inner));
        }

        if is_enum_schema(schema) {
            return self.enum_property(ctx, schema, hint);
        }

        if !schema.all_of.is_empty() {
            // a lone reference wrapped in allOf is just that reference
            if let [single] = schema.all_of.as_slice() {
                if let (Some(reference), true) = (&single.reference, schema.properties.is_empty()) {
                    return Ok(self.referenced(ctx, reference, hint));
                }
            }
            return self.inline_model(ctx, schema, hint);
        }

        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            ctx.warn(
                DiagnosticKind::SchemaResolution,
                subject(hint),
                "oneOf/anyOf composition is ambiguous, using an untyped value",
            );
            return Ok(self.any(ctx));
        }

        if !schema.properties.is_empty() {
            return self.inline_model(ctx, schema, hint);
        }

        Ok(self.primitive(ctx, &subject(hint), schema))
    }

    fn referenced(&self, ctx: &mut RunContext, reference: &str, hint: &TypeHint) -> CodegenProperty {
        let target = ApiSpec::ref_name(reference);
        match ctx.model_names.get(target) {
            Some(classname) => CodegenProperty {
                datatype: classname.clone(),
                datatype_with_enum: classname.clone(),
                base_type: classname.clone(),
                is_model: true,
                ..Default::default()
            },
            None => {
                ctx.warn(
                    DiagnosticKind::SchemaResolution,
                    subject(hint),
                    format!("unresolvable reference '{reference}', using an untyped value"),
                );
                self.any(ctx)
            }
        }
    }

    fn wrap(&self, ctx: &RunContext, container: ContainerType, inner: CodegenProperty) -> CodegenProperty {
        let (datatype, datatype_with_enum) = match container {
            ContainerType::Map => (
                (ctx.strategy.map_type)(&ctx.strategy.map_key_type, &inner.datatype),
                (ctx.strategy.map_type)(&ctx.strategy.map_key_type, &inner.datatype_with_enum),
            ),
            _ => (
                (ctx.strategy.array_type)(&inner.datatype),
                (ctx.strategy.array_type)(&inner.datatype_with_enum),
            ),
        };
        CodegenProperty {
            datatype,
            datatype_with_enum,
            base_type: inner.base_type.clone(),
            container_type: container,
            items: Some(Box::new(inner)),
            ..Default::default()
        }
    }

    fn any(&self, ctx: &RunContext) -> CodegenProperty {
        CodegenProperty {
            datatype: ctx.strategy.any_type.clone(),
            datatype_with_enum: ctx.strategy.any_type.clone(),
            base_type: ctx.strategy.any_type.clone(),
            ..Default::default()
        }
    }

    /// Scalar type through the strategy's type mapping
    fn primitive(&self, ctx: &mut RunContext, subject: &str, schema: &SchemaNode) -> CodegenProperty {
        let keys = type_keys(schema);
        let mapped = keys
            .iter()
            .find_map(|key| ctx.strategy.map_type_key(key).map(|t| (*key, t.to_string())));

        let (key, datatype) = match mapped {
            Some(found) => found,
            None => {
                ctx.warn(
                    DiagnosticKind::SchemaResolution,
                    subject,
                    format!(
                        "no mapping for type '{}', using an untyped value",
                        keys.first().copied().unwrap_or("unknown")
                    ),
                );
                return self.any(ctx);
            }
        };

        CodegenProperty {
            datatype_with_enum: datatype.clone(),
            base_type: datatype.clone(),
            datatype,
            is_primitive: true,
            is_string: matches!(key, "string" | "UUID" | "password" | "ByteArray"),
            is_date: key == "date",
            is_date_time: key == "DateTime",
            ..Default::default()
        }
    }

    fn enum_property(
        &mut self,
        ctx: &mut RunContext,
        schema: &SchemaNode,
        hint: &TypeHint,
    ) -> Result<CodegenProperty> {
        let mut prop = self.primitive(ctx, &subject(hint), schema);
        prop.is_enum = true;
        prop.allowable_values = schema.enum_values.clone();

        if ctx.generate_enums() {
            let enum_name = allocate_enum(ctx, &hint.name, &schema.enum_values, &prop.datatype)?;
            prop.enum_vars = enum_vars(ctx, &schema.enum_values, &enum_name);
            prop.datatype_with_enum = enum_name.clone();
            prop.enum_name = Some(enum_name);
        }
        Ok(prop)
    }

    fn inline_model(
        &mut self,
        ctx: &mut RunContext,
        schema: &SchemaNode,
        hint: &TypeHint,
    ) -> Result<CodegenProperty> {
        let raw = format!("{}_{}", hint.owner, hint.name);
        let candidate = ctx.allocator.allocate(&raw, Role::Type, Some(ctx.strategy.model_prefix.as_str()));
        let classname = ctx.registry.reserve_unique(&candidate, &raw, RecordKind::Model)?;
        tracing::debug!(owner = %hint.owner, field = %hint.name, classname = %classname, "Synthesized inline model");

        let model = self.build_model(ctx, &raw, &classname, schema)?;
        self.inline_models.push(model);

        Ok(CodegenProperty {
            datatype: classname.clone(),
            datatype_with_enum: classname.clone(),
            base_type: classname,
            is_model: true,
            ..Default::default()
        })
    }

    /// Properties of an `allOf` schema, with the parent when it is a pure
    /// extension of exactly one named schema
    fn compose(
        &self,
        ctx: &mut RunContext,
        name: &str,
        schema: &SchemaNode,
    ) -> (Option<String>, IndexMap<String, SchemaNode>, Vec<String>) {
        let refs: Vec<&str> = schema
            .all_of
            .iter()
            .filter_map(|member| member.reference.as_deref())
            .collect();

        let mut properties = IndexMap::new();
        let mut required = Vec::new();
        let mut visiting = vec![name.to_string()];

        if let [single] = refs.as_slice() {
            let target = ApiSpec::ref_name(single);
            let parent = match ctx.model_names.get(target) {
                Some(classname) => Some(classname.clone()),
                None => {
                    ctx.warn(
                        DiagnosticKind::SchemaResolution,
                        name,
                        format!("unresolvable parent reference '{single}'"),
                    );
                    None
                }
            };
            for member in schema.all_of.iter().filter(|m| m.reference.is_none()) {
                self.collect(ctx, name, member, &mut visiting, &mut properties, &mut required);
            }
            own_properties(schema, &mut properties, &mut required);
            return (parent, properties, required);
        }

        self.collect(ctx, name, schema, &mut visiting, &mut properties, &mut required);
        (None, properties, required)
    }

    /// Flatten the properties of `schema` and everything it composes
    fn collect(
        &self,
        ctx: &mut RunContext,
        subject: &str,
        schema: &SchemaNode,
        visiting: &mut Vec<String>,
        properties: &mut IndexMap<String, SchemaNode>,
        required: &mut Vec<String>,
    ) {
        for member in &schema.all_of {
            match member.reference.as_deref() {
                Some(reference) => {
                    let target = ApiSpec::ref_name(reference);
                    if visiting.iter().any(|v| v == target) {
                        ctx.warn(
                            DiagnosticKind::SchemaResolution,
                            subject,
                            format!("cyclic composition through '{target}' cut off"),
                        );
                        continue;
                    }
                    match self.schemas.get(target) {
                        Some(referenced) => {
                            visiting.push(target.to_string());
                            self.collect(ctx, subject, referenced, visiting, properties, required);
                            visiting.pop();
                        }
                        None => ctx.warn(
                            DiagnosticKind::SchemaResolution,
                            subject,
                            format!("unresolvable reference '{reference}' in composition"),
                        ),
                    }
                }
                None => self.collect(ctx, subject, member, visiting, properties, required),
            }
        }
        own_properties(schema, properties, required);
    }
}

fn own_properties(
    schema: &SchemaNode,
    properties: &mut IndexMap<String, SchemaNode>,
    required: &mut Vec<String>,
) {
    for (key, node) in &schema.properties {
        properties.insert(key.clone(), node.clone());
    }
    for key in &schema.required {
        if !required.contains(key) {
            required.push(key.clone());
        }
    }
}

/// Enum type name for a value list: reuse by value, else reserve a new one
pub(crate) fn allocate_enum(
    ctx: &mut RunContext,
    raw_name: &str,
    values: &[JsonValue],
    data_type: &str,
) -> Result<String> {
    let fingerprint = enum_fingerprint(values);
    if let Some(existing) = ctx.registry.find_enum_by_values(&fingerprint) {
        return Ok(existing.to_string());
    }

    let candidate = format!(
        "{}{}",
        ctx.strategy.enum_type_prefix,
        ctx.allocator.allocate(raw_name, Role::Type, None)
    );
    let name = ctx
        .registry
        .reserve_or_reuse(&candidate, &fingerprint, RecordKind::Enum, false)?;

    if !ctx.enums.contains_key(&name) {
        let definition = EnumDefinition {
            name: name.clone(),
            data_type: data_type.to_string(),
            allowable_values: values.to_vec(),
            enum_vars: enum_vars(ctx, values, &name),
        };
        ctx.enums.insert(name.clone(), definition);
    }
    Ok(name)
}

pub(crate) fn enum_vars(ctx: &RunContext, values: &[JsonValue], type_name: &str) -> Vec<EnumVar> {
    values
        .iter()
        .map(|value| EnumVar {
            name: ctx.allocator.allocate_enum_value(value, Some(type_name)),
            value: default_literal(ctx, value),
        })
        .collect()
}

/// Literal of a JSON value in the target language
pub(crate) fn default_literal(ctx: &RunContext, value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => ctx.strategy.string_literal(s),
        JsonValue::Bool(b) => ctx.strategy.bool_literal(*b).to_string(),
        other => other.to_string(),
    }
}

fn is_enum_schema(schema: &SchemaNode) -> bool {
    !schema.enum_values.is_empty() && schema.reference.is_none() && !schema.is_array()
}

/// Whether a schema says anything about its type
fn has_type_info(schema: &SchemaNode) -> bool {
    schema.reference.is_some()
        || schema.schema_type.is_some()
        || schema.items.is_some()
        || !schema.properties.is_empty()
        || !schema.enum_values.is_empty()
        || schema.additional_properties.is_some()
        || schema.is_composed()
}

/// Type mapping keys for a scalar schema, most specific first
fn type_keys(schema: &SchemaNode) -> Vec<&'static str> {
    let format = schema.format.as_deref();
    match schema.schema_type.as_deref() {
        Some("integer") => match format {
            Some("int64") => vec!["long", "integer"],
            _ => vec!["integer"],
        },
        Some("number") => match format {
            Some("float") => vec!["float", "number"],
            Some("double") => vec!["double", "number"],
            _ => vec!["number"],
        },
        Some("string") => match format {
            Some("date") => vec!["date", "string"],
            Some("date-time") => vec!["DateTime", "string"],
            Some("binary") => vec!["binary", "string"],
            Some("byte") => vec!["ByteArray", "string"],
            Some("uuid") => vec!["UUID", "string"],
            Some("password") => vec!["password", "string"],
            _ => vec!["string"],
        },
        Some("boolean") => vec!["boolean"],
        Some("file") => vec!["file"],
        Some("object") | None => vec!["object", "any"],
        Some(_) => vec![],
    }
}

fn subject(hint: &TypeHint) -> String {
    format!("{}.{}", hint.owner, hint.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{GeneratorConfig, common_options};
    use crate::generation::types::Target;
    use crate::infrastructure::strategies;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn context(target: Target) -> RunContext {
        let strategy = strategies::strategy_for(target);
        let mut declared = common_options();
        declared.extend(strategy.options.clone());
        let options = GeneratorConfig::default().resolve_options(&declared).unwrap();
        RunContext::new(Arc::new(strategy), options)
    }

    fn schemas(yaml: &str) -> IndexMap<String, SchemaNode> {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn resolve_all(ctx: &mut RunContext, schemas: &IndexMap<String, SchemaNode>) -> Vec<CodegenModel> {
        let mut resolver = SchemaResolver::new(schemas);
        resolver.register_model_names(ctx).unwrap();
        resolver.resolve_models(ctx).unwrap()
    }

    #[test]
    fn test_field_names_are_prefixed_with_model() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Sample:
  type: object
  required: [created-at]
  properties:
    created-at: { type: string, format: date-time }
    count: { type: integer, default: 3 }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let sample = &models[0];

        assert_eq!(sample.classname, "Sample");
        let created = sample.var("created-at").unwrap();
        assert_eq!(created.name, "sampleCreatedAt");
        assert_eq!(created.datatype, "DateTime");
        assert!(created.is_date_time);
        assert!(created.required);

        let count = sample.var("count").unwrap();
        assert_eq!(count.name, "sampleCount");
        assert_eq!(count.default_value.as_deref(), Some("3"));
        assert!(!count.required);
    }

    #[test]
    #[traced_test]
    fn test_ambiguous_composition_is_logged() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Shape:
  oneOf:
    - { type: string }
    - { type: integer }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        assert!(models[0].is_alias);
        assert_eq!(models[0].data_type.as_deref(), Some(ctx.strategy.any_type.as_str()));
        assert_eq!(ctx.diagnostics.len(), 1);
        assert!(logs_contain("oneOf/anyOf composition is ambiguous"));
    }

    #[test]
    fn test_colliding_classnames_get_suffixes() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
pet: { type: object, properties: { id: { type: integer } } }
Pet: { type: object, properties: { name: { type: string } } }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        assert_eq!(models[0].classname, "Pet");
        assert_eq!(models[1].classname, "Pet2");
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn test_nested_containers_surface_innermost_enum() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Board:
  type: object
  properties:
    cells:
      type: object
      additionalProperties:
        type: array
        items: { type: string, enum: [x, o] }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let cells = models[0].var("cells").unwrap();

        assert_eq!(cells.container_type, ContainerType::Map);
        assert_eq!(cells.datatype, "(Map.Map String [Text])");
        assert_eq!(cells.datatype_with_enum, "(Map.Map String [E'Cells])");
        let inner = cells.innermost();
        assert!(inner.is_enum);
        assert_eq!(inner.enum_vars[0].name, "E'Cells'X");
        assert_eq!(inner.enum_vars[0].value, "\"x\"");
    }

    #[test]
    fn test_container_declaration_walks_back_to_enum() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Grid:
  type: object
  properties:
    x:
      type: array
      items:
        type: object
        additionalProperties:
          type: array
          items: { type: string, enum: [A, B] }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let x = models[0].var("x").unwrap();

        assert_eq!(x.datatype_with_enum, "[(Map.Map String [E'X])]");

        let mut shapes = Vec::new();
        let mut current = x;
        while let Some(items) = &current.items {
            shapes.push(current.container_type);
            current = items;
        }
        assert_eq!(
            shapes,
            vec![ContainerType::Array, ContainerType::Map, ContainerType::Array]
        );
        assert!(current.is_enum);
        assert_eq!(current.allowable_values, vec![serde_json::json!("A"), serde_json::json!("B")]);
        assert_eq!(ctx.enums["E'X"].allowable_values, current.allowable_values);
    }

    #[test]
    fn test_lookalike_enum_values_get_their_own_types() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Mixed:
  type: object
  properties:
    pair: { type: string, enum: [a, b] }
    joined: { type: string, enum: ["a, b"] }
    code: { type: integer, enum: [1, 2] }
    label: { type: string, enum: ["1", "2"] }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let mixed = &models[0];

        assert_eq!(mixed.var("pair").unwrap().datatype_with_enum, "E'Pair");
        assert_eq!(mixed.var("joined").unwrap().datatype_with_enum, "E'Joined");
        assert_eq!(mixed.var("code").unwrap().datatype_with_enum, "E'Code");
        assert_eq!(mixed.var("label").unwrap().datatype_with_enum, "E'Label");
        assert_eq!(ctx.enums.len(), 4);
        assert_eq!(ctx.enums["E'Code"].data_type, "Int");
        assert_eq!(ctx.enums["E'Label"].data_type, "Text");
    }

    #[test]
    fn test_schema_vendor_keys_reach_models_and_properties() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Counter:
  type: object
  x-internal: true
  properties:
    count: { type: integer, minimum: 0, x-display-name: Count }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let counter = &models[0];

        assert_eq!(counter.vendor_extensions["x_internal"], serde_json::json!(true));
        assert!(!counter.vendor_extensions.contains_key("minimum"));
        let count = counter.var("count").unwrap();
        assert_eq!(count.vendor_extensions["x_display_name"], serde_json::json!("Count"));
        assert_eq!(count.vendor_extensions.len(), 1);
    }

    #[test]
    fn test_enum_names_are_reused_by_value() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Order:
  type: object
  properties:
    status: { type: string, enum: [placed, shipped] }
Shipment:
  type: object
  properties:
    state: { type: string, enum: [placed, shipped] }
    kind: { type: string, enum: [air, sea] }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        let status = models[0].var("status").unwrap();
        let state = models[1].var("state").unwrap();
        let kind = models[1].var("kind").unwrap();
        assert_eq!(status.datatype_with_enum, "E'Status");
        assert_eq!(state.datatype_with_enum, "E'Status");
        assert_eq!(kind.datatype_with_enum, "E'Kind");
        assert_eq!(ctx.enums.len(), 2);
    }

    #[test]
    fn test_top_level_enum_schema_claims_its_values() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
Color: { type: string, enum: [red, green] }
Car:
  type: object
  properties:
    paint: { type: string, enum: [red, green] }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        assert!(models[0].is_enum);
        assert_eq!(models[0].enum_vars[0].name, "ColorRed");
        assert_eq!(models[1].var("paint").unwrap().datatype_with_enum, "Color");
        assert!(ctx.enums.is_empty());
    }

    #[test]
    fn test_enums_disabled_keep_plain_types() {
        let mut ctx = context(Target::Haskell);
        let mut config = GeneratorConfig::default();
        config.apply_define("generateEnums=false").unwrap();
        ctx.options = config.resolve_options(&common_options()).unwrap();

        let schemas = schemas("Order: { type: object, properties: { status: { type: string, enum: [a] } } }");
        let models = resolve_all(&mut ctx, &schemas);
        let status = models[0].var("status").unwrap();
        assert!(status.is_enum);
        assert_eq!(status.datatype_with_enum, "Text");
        assert!(ctx.enums.is_empty());
    }

    #[test]
    fn test_single_parent_composition() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
Animal: { type: object, properties: { name: { type: string } } }
Dog:
  allOf:
    - $ref: '#/components/schemas/Animal'
    - type: object
      properties:
        bark: { type: boolean }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let dog = &models[1];

        assert_eq!(dog.parent.as_deref(), Some("Animal"));
        assert_eq!(dog.vars.len(), 1);
        assert_eq!(dog.vars[0].name, "bark");
        assert_eq!(dog.vars[0].datatype, "bool");
    }

    #[test]
    fn test_multi_reference_composition_is_flattened() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
Named: { type: object, required: [name], properties: { name: { type: string } } }
Aged: { type: object, properties: { age: { type: integer, format: int64 } } }
Person:
  allOf:
    - $ref: '#/components/schemas/Named'
    - $ref: '#/components/schemas/Aged'
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        let person = &models[2];

        assert_eq!(person.parent, None);
        let names: Vec<&str> = person.vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["name", "age"]);
        assert!(person.vars[0].required);
        assert_eq!(person.vars[1].datatype, "i64");
    }

    #[test]
    fn test_cyclic_composition_is_cut_off() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
A:
  allOf:
    - $ref: '#/components/schemas/B'
    - $ref: '#/components/schemas/C'
B:
  allOf:
    - $ref: '#/components/schemas/A'
  properties: { b: { type: string } }
C: { type: object, properties: { c: { type: string } } }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        let a = &models[0];
        assert_eq!(a.vars.len(), 2);
        assert!(
            ctx.diagnostics
                .iter()
                .any(|d| d.message.contains("cyclic composition"))
        );
    }

    #[test]
    fn test_self_reference_resolves_to_name() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
Node:
  type: object
  properties:
    children: { type: array, items: { $ref: '#/components/schemas/Node' } }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);
        assert_eq!(models[0].vars[0].datatype, "Vec<Node>");
    }

    #[test]
    fn test_untyped_map_value_falls_back() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas("Bag: { type: object, properties: { extra: { type: object, additionalProperties: {} } } }");
        let models = resolve_all(&mut ctx, &schemas);

        assert_eq!(models[0].vars[0].datatype, "(Map.Map String A.Value)");
        assert_eq!(ctx.diagnostics[0].kind, DiagnosticKind::SchemaResolution);
    }

    #[test]
    fn test_inline_objects_become_models() {
        let mut ctx = context(Target::Rust);
        let schemas = schemas(
            r#"
Pet:
  type: object
  properties:
    owner:
      type: object
      properties: { name: { type: string } }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].vars[0].datatype, "PetOwner");
        assert_eq!(models[1].classname, "PetOwner");
        assert_eq!(models[1].vars[0].name, "name");
    }

    #[test]
    fn test_aliases_and_reserved_model_names() {
        let mut ctx = context(Target::Haskell);
        let schemas = schemas(
            r#"
Tags: { type: array, items: { type: string } }
data: { type: object, properties: { v: { type: number } } }
"#,
        );
        let models = resolve_all(&mut ctx, &schemas);

        assert!(models[0].is_alias);
        assert_eq!(models[0].data_type.as_deref(), Some("[Text]"));
        assert_eq!(models[1].classname, "ModelData");
        assert_eq!(models[1].vars[0].name, "modelDataV");
    }
}
