//! Operation processing.
//!
//! Walks every path/method pair of the input document into a
//! [`CodegenOperation`]: parameters get names and (for scalar-like types)
//! deduplicated newtype names, the path becomes a literal/placeholder sequence,
//! media types are classified and the return type is inferred.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value as JsonValue, json};

use crate::core::error::Result;
use crate::generation::context::RunContext;
use crate::generation::model::{
    CodegenModel, CodegenOperation, CodegenParameter, CodegenProperty, MediaTypeInfo,
    ParamLocation, PathSegment, input_extensions,
};
use crate::generation::naming::Role;
use crate::generation::registry::{RecordKind, next_name};
use crate::generation::sanitizers::escape_text;
use crate::generation::schema::{SchemaResolver, TypeHint, default_literal};
use crate::generation::types::DiagnosticKind;
use crate::infrastructure::openapi::{
    ApiSpec, OperationNode, ParameterNode, PathItem, RequestBodyNode, SchemaNode,
};

static JSON_MIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^application/.*json(;.*)?$").expect("valid regex"));

pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Whether a media type carries JSON
pub fn is_json_media_type(media_type: &str) -> bool {
    JSON_MIME.is_match(media_type)
}

/// Resolves operations against the models already named by a [`SchemaResolver`]
pub struct OperationProcessor<'a> {
    spec: &'a ApiSpec,
    resolver: SchemaResolver<'a>,
    /// Security scheme key to allocated scheme name
    security_names: IndexMap<String, String>,
}

impl<'a> OperationProcessor<'a> {
    pub fn new(
        spec: &'a ApiSpec,
        resolver: SchemaResolver<'a>,
        security_names: IndexMap<String, String>,
    ) -> Self {
        Self {
            spec,
            resolver,
            security_names,
        }
    }

    /// Models synthesized from inline schemas of parameters, bodies and responses
    pub fn take_inline_models(&mut self) -> Vec<CodegenModel> {
        self.resolver.take_inline_models()
    }

    /// Resolve every operation that passes the include/exclude filters
    pub fn resolve_operations(&mut self, ctx: &mut RunContext) -> Result<Vec<CodegenOperation>> {
        self.register_known_media_types(ctx)?;

        let include = ctx.options.list("includeOperations").to_vec();
        let exclude = ctx.options.list("excludeOperations").to_vec();

        let spec = self.spec;
        let mut operations = Vec::new();
        for (method, path, item, node) in spec.operations() {
            let raw_id = raw_operation_id(method, path, node);
            if !include.is_empty() && !include.contains(&raw_id) {
                tracing::debug!(operation = %raw_id, "Skipping operation not in includeOperations");
                continue;
            }
            if exclude.contains(&raw_id) {
                tracing::debug!(operation = %raw_id, "Skipping excluded operation");
                continue;
            }

            let operation = self
                .resolve_operation(ctx, method, path, item, node)
                .map_err(|e| e.for_entity(&raw_id))?;
            operations.push(operation);
        }
        Ok(operations)
    }

    /// Resolve one operation
    pub fn resolve_operation(
        &mut self,
        ctx: &mut RunContext,
        method: &str,
        path: &str,
        item: &PathItem,
        node: &OperationNode,
    ) -> Result<CodegenOperation> {
        let raw_id = raw_operation_id(method, path, node);
        let (operation_id, operation_type) = unique_operation_id(ctx, &raw_id)?;
        let http_method = method.to_uppercase();
        tracing::debug!(operation = %operation_id, method = %http_method, path = %path, "Resolving operation");

        let mut op = CodegenOperation {
            operation_id: operation_id.clone(),
            path: path.to_string(),
            tags: node.tags.clone(),
            summary: node
                .summary
                .as_deref()
                .map(|s| escape_text(s, &ctx.strategy.unsafe_text)),
            notes: node
                .description
                .as_deref()
                .map(|s| escape_text(s, &ctx.strategy.unsafe_text)),
            deprecated: node.deprecated,
            vendor_extensions: input_extensions(&node.extensions),
            http_method,
            ..Default::default()
        };
        op.vendor_extensions
            .insert("x_operation_type".to_string(), json!(operation_type));
        op.vendor_extensions.insert(
            "x_doc_path".to_string(),
            json!(format!("{} {}", op.http_method, path.replace('/', "\\/"))),
        );

        let mut params = self.parameters(ctx, &operation_id, item, node)?;
        let mut consumes = Vec::new();
        if let Some(body) = self.request_body(ctx, &operation_id, node) {
            consumes = body.content.keys().cloned().collect();
            params.extend(self.body_parameters(ctx, &operation_id, &body)?);
        }
        for param in params.iter_mut() {
            decorate_parameter(ctx, &operation_type, param)?;
        }
        op.params = params;

        let has_optional = op.params.iter().any(|p| !p.required);
        op.vendor_extensions
            .insert("x_has_body_or_form_param".to_string(), json!(op.has_body_or_form_param()));
        op.vendor_extensions
            .insert("x_has_optional_params".to_string(), json!(has_optional));

        op.path_segments = path_segments(ctx, &operation_id, path, &op.params);
        let x_path = (ctx.strategy.path_expression)(&op.path_segments);
        op.vendor_extensions.insert("x_path".to_string(), json!(x_path));

        let produces = produced_media_types(node);
        process_media_types(ctx, &mut op, &consumes, &produces)?;

        self.return_type(ctx, &mut op, node)?;

        let requirements = node.security.as_ref().unwrap_or(&self.spec.security);
        for requirement in requirements {
            for key in requirement.keys() {
                if let Some(name) = self.security_names.get(key) {
                    if !op.auth_methods.contains(name) {
                        op.auth_methods.push(name.clone());
                    }
                }
            }
        }

        Ok(op)
    }

    fn register_known_media_types(&self, ctx: &mut RunContext) -> Result<()> {
        let known: Vec<(String, String)> = ctx
            .strategy
            .known_media_types
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (media_type, name) in known {
            if !ctx.registry.contains(&name) {
                ctx.registry
                    .reserve_or_reuse(&name, &media_type, RecordKind::MediaType, false)?;
            }
        }
        Ok(())
    }

    /// Path-level and operation-level parameters, the latter overriding
    fn parameters(
        &mut self,
        ctx: &mut RunContext,
        operation_id: &str,
        item: &PathItem,
        node: &OperationNode,
    ) -> Result<Vec<CodegenParameter>> {
        let mut merged: IndexMap<(String, String), ParameterNode> = IndexMap::new();
        for raw in item.parameters.iter().chain(&node.parameters) {
            if let Some(resolved) = self.parameter_node(ctx, operation_id, raw) {
                merged.insert((resolved.name.clone(), resolved.location.clone()), resolved);
            }
        }

        let mut params = Vec::with_capacity(merged.len());
        for raw in merged.into_values() {
            let location = match raw.location.as_str() {
                "path" => ParamLocation::Path,
                "query" => ParamLocation::Query,
                "header" => ParamLocation::Header,
                "cookie" => ParamLocation::Cookie,
                "formData" => ParamLocation::Form,
                "body" => ParamLocation::Body,
                other => {
                    ctx.warn(
                        DiagnosticKind::Unsupported,
                        format!("{operation_id}.{}", raw.name),
                        format!("parameter location '{other}' is not supported, skipped"),
                    );
                    continue;
                }
            };

            let schema = match &raw.schema {
                Some(schema) => schema.clone(),
                None => {
                    ctx.warn(
                        DiagnosticKind::SchemaResolution,
                        format!("{operation_id}.{}", raw.name),
                        "parameter without schema, using an untyped value",
                    );
                    SchemaNode::default()
                }
            };

            let hint = TypeHint::new(operation_id, raw.name.as_str());
            let resolved = self.resolver.resolve_type(ctx, &schema, &hint)?;
            let mut param = parameter(ctx, &raw.name, location, resolved);
            param.required = raw.required || location == ParamLocation::Path;
            param.description = raw
                .description
                .as_deref()
                .map(|d| escape_text(d, &ctx.strategy.unsafe_text));
            param.default_value = schema.default.as_ref().map(|v| default_literal(ctx, v));
            if schema.is_array() {
                let (wire, mapped) = collection_format(ctx, operation_id, &raw, location);
                param.collection_format = Some(wire);
                if let Some(mapped) = mapped {
                    param
                        .vendor_extensions
                        .insert("x_collection_format".to_string(), json!(mapped));
                }
            }
            params.push(param);
        }
        Ok(params)
    }

    fn parameter_node(
        &self,
        ctx: &mut RunContext,
        operation_id: &str,
        raw: &ParameterNode,
    ) -> Option<ParameterNode> {
        let Some(reference) = &raw.reference else {
            return Some(raw.clone());
        };
        let found = self
            .spec
            .components
            .parameters
            .get(ApiSpec::ref_name(reference))
            .cloned();
        if found.is_none() {
            ctx.warn(
                DiagnosticKind::SchemaResolution,
                operation_id,
                format!("unresolvable parameter reference '{reference}', skipped"),
            );
        }
        found
    }

    fn request_body(
        &self,
        ctx: &mut RunContext,
        operation_id: &str,
        node: &OperationNode,
    ) -> Option<RequestBodyNode> {
        let body = node.request_body.as_ref()?;
        let Some(reference) = &body.reference else {
            return Some(body.clone());
        };
        let found = self
            .spec
            .components
            .request_bodies
            .get(ApiSpec::ref_name(reference))
            .cloned();
        if found.is_none() {
            ctx.warn(
                DiagnosticKind::SchemaResolution,
                operation_id,
                format!("unresolvable request body reference '{reference}', skipped"),
            );
        }
        found
    }

    /// A single body parameter, or one form parameter per field of a form body
    fn body_parameters(
        &mut self,
        ctx: &mut RunContext,
        operation_id: &str,
        body: &RequestBodyNode,
    ) -> Result<Vec<CodegenParameter>> {
        let Some(media) = body.content.values().next() else {
            return Ok(Vec::new());
        };
        let schema = media.schema.clone().unwrap_or_default();

        // a referenced url-encoded model stays whole so it can be form-encoded as a model
        let is_multipart = body.content.keys().any(|k| k == MULTIPART_FORM_DATA);
        let is_form = is_multipart
            || (schema.reference.is_none() && body.content.keys().any(|k| k == FORM_URL_ENCODED));
        let form_schema = match &schema.reference {
            Some(reference) => self.resolver.lookup(reference).cloned(),
            None => Some(schema.clone()),
        };

        if let (true, Some(form)) = (is_form, form_schema) {
            if !form.properties.is_empty() {
                let mut params = Vec::with_capacity(form.properties.len());
                for (key, field) in &form.properties {
                    let hint = TypeHint::new(operation_id, key.as_str());
                    let resolved = self.resolver.resolve_type(ctx, field, &hint)?;
                    let mut param = parameter(ctx, key, ParamLocation::Form, resolved);
                    param.required = form.required.contains(key);
                    param.description = field
                        .description
                        .as_deref()
                        .map(|d| escape_text(d, &ctx.strategy.unsafe_text));
                    params.push(param);
                }
                return Ok(params);
            }
        }

        let hint = TypeHint::new(operation_id, "body");
        let resolved = self.resolver.resolve_type(ctx, &schema, &hint)?;
        let mut param = parameter(ctx, "body", ParamLocation::Body, resolved);
        param.required = body.required;
        param.description = body
            .description
            .as_deref()
            .map(|d| escape_text(d, &ctx.strategy.unsafe_text));
        Ok(vec![param])
    }

    fn return_type(
        &mut self,
        ctx: &mut RunContext,
        op: &mut CodegenOperation,
        node: &OperationNode,
    ) -> Result<()> {
        let mut has_unknown_return = false;
        let return_type = match success_schema(node) {
            Some(schema) => {
                let hint = TypeHint::new(op.operation_id.as_str(), "response");
                let resolved = self.resolver.resolve_type(ctx, schema, &hint)?;
                op.return_base_type = Some(resolved.base_type.clone());
                op.return_container = resolved.container_type;
                resolved.datatype_with_enum
            }
            None if !op.produces.is_empty() => {
                has_unknown_return = true;
                ctx.strategy.unknown_response_type.clone()
            }
            None => {
                if !op.vendor_extensions.contains_key("x_inline_accept") {
                    op.vendor_extensions
                        .insert("x_inline_accept".to_string(), no_content(ctx));
                }
                ctx.strategy.no_content_type.clone()
            }
        };

        let return_type = if return_type.contains(' ')
            && !(return_type.starts_with('(') && return_type.ends_with(')'))
        {
            format!("({return_type})")
        } else {
            return_type
        };

        op.vendor_extensions
            .insert("x_return_type".to_string(), json!(return_type));
        op.vendor_extensions
            .insert("x_has_unknown_return".to_string(), json!(has_unknown_return));
        op.return_type = return_type;
        Ok(())
    }
}

/// The operation id as written, or one synthesized from path and method
fn raw_operation_id(method: &str, path: &str, node: &OperationNode) -> String {
    match node.operation_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let mut words: Vec<&str> = path
                .split('/')
                .map(|part| part.trim_matches(|c: char| c == '{' || c == '}'))
                .filter(|part| !part.is_empty())
                .collect();
            words.push(method);
            words.join("_")
        }
    }
}

/// Allocate the operation id, renumbering until its operation type name is free
fn unique_operation_id(ctx: &mut RunContext, raw: &str) -> Result<(String, String)> {
    let base = ctx.allocator.allocate_operation_id(raw);
    let mut name = base.clone();
    let mut type_name = operation_type_name(ctx, &name);
    while ctx.registry.contains(&type_name) {
        name = next_name(&name)?;
        type_name = operation_type_name(ctx, &name);
    }
    ctx.registry
        .reserve_unique(&type_name, raw, RecordKind::Operation)?;

    if name != base {
        ctx.warn(
            DiagnosticKind::Renamed,
            raw,
            format!("operation id '{base}' already taken, using '{name}'"),
        );
    }
    Ok((name, type_name))
}

fn operation_type_name(ctx: &RunContext, operation_id: &str) -> String {
    ctx.allocator.allocate(
        operation_id,
        Role::Type,
        Some(ctx.strategy.operation_type_prefix.as_str()),
    )
}

fn parameter(
    ctx: &RunContext,
    base_name: &str,
    location: ParamLocation,
    resolved: CodegenProperty,
) -> CodegenParameter {
    let is_file = is_file_type(ctx, &resolved.datatype);
    CodegenParameter {
        base_name: base_name.to_string(),
        param_name: ctx.allocator.allocate(base_name, Role::Variable, None),
        is_container: resolved.is_container(),
        data_type: resolved.datatype,
        datatype_with_enum: resolved.datatype_with_enum,
        base_type: resolved.base_type,
        location,
        is_enum: resolved.is_enum,
        enum_name: resolved.enum_name,
        allowable_values: resolved.allowable_values,
        is_primitive: resolved.is_primitive,
        is_model: resolved.is_model,
        is_file,
        ..Default::default()
    }
}

fn is_file_type(ctx: &RunContext, data_type: &str) -> bool {
    ["file", "binary"]
        .iter()
        .any(|key| ctx.strategy.map_type_key(key) == Some(data_type))
}

/// Per-parameter vendor keys, plus a deduplicated newtype name for scalar-like
/// parameters
fn decorate_parameter(
    ctx: &mut RunContext,
    operation_type: &str,
    param: &mut CodegenParameter,
) -> Result<()> {
    param
        .vendor_extensions
        .insert("x_operation_type".to_string(), json!(operation_type));
    param
        .vendor_extensions
        .insert("x_is_body_or_form_param".to_string(), json!(param.is_body_or_form()));

    if !(param.is_primitive || param.is_container || param.is_file || param.is_enum) {
        return Ok(());
    }

    let candidate = format!(
        "{}{}",
        ctx.strategy.param_prefix,
        ctx.allocator.allocate(&param.param_name, Role::Type, Some(""))
    );
    let shape_first = ctx.options.flag("paramShapeSuffix") && !param.is_enum;
    let name_type = ctx.registry.reserve_or_reuse(
        &candidate,
        &param.datatype_with_enum,
        RecordKind::Param,
        shape_first,
    )?;
    if name_type != candidate {
        tracing::debug!(candidate = %candidate, name = %name_type, "Parameter type renamed");
    }

    param
        .vendor_extensions
        .insert("x_param_name_type".to_string(), json!(name_type));
    ctx.unique_params
        .entry(name_type)
        .or_insert_with(|| param.clone());
    Ok(())
}

/// Wire collection format and its name in the target, if supported
fn collection_format(
    ctx: &mut RunContext,
    operation_id: &str,
    raw: &ParameterNode,
    location: ParamLocation,
) -> (String, Option<String>) {
    let wire = match raw.collection_format.as_deref() {
        Some(format) => format.to_string(),
        None => {
            let default_style = match location {
                ParamLocation::Query | ParamLocation::Cookie | ParamLocation::Form => "form",
                _ => "simple",
            };
            let style = raw.style.as_deref().unwrap_or(default_style);
            let explode = raw.explode.unwrap_or(style == "form");
            match style {
                "form" if explode => "multi",
                "form" | "simple" => "csv",
                "spaceDelimited" => "ssv",
                "pipeDelimited" => "pipes",
                other => other,
            }
            .to_string()
        }
    };

    match ctx.strategy.collection_formats.get(&wire) {
        Some(mapped) => (wire, Some(mapped.clone())),
        None => {
            ctx.warn(
                DiagnosticKind::Unsupported,
                format!("{operation_id}.{}", raw.name),
                format!("collection format '{wire}' is not supported"),
            );
            (wire, None)
        }
    }
}

/// Split a templated path into literals and placeholders
fn path_segments(
    ctx: &mut RunContext,
    operation_id: &str,
    path: &str,
    params: &[CodegenParameter],
) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut rest = path;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        if open > 0 {
            segments.push(PathSegment::Literal {
                value: rest[..open].to_string(),
            });
        }

        let base_name = &rest[open + 1..close];
        let param_name = match params
            .iter()
            .find(|p| p.location == ParamLocation::Path && p.base_name == base_name)
        {
            Some(param) => param.param_name.clone(),
            None => {
                ctx.warn(
                    DiagnosticKind::Unsupported,
                    operation_id,
                    format!("path placeholder '{{{base_name}}}' has no declared parameter"),
                );
                ctx.allocator.allocate(base_name, Role::Variable, None)
            }
        };
        segments.push(PathSegment::Placeholder {
            expression: (ctx.strategy.placeholder)(&param_name),
            param_name,
            base_name: base_name.to_string(),
        });
        rest = &rest[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(PathSegment::Literal {
            value: rest.to_string(),
        });
    }
    segments
}

/// Media types of every response, in first-seen order
fn produced_media_types(node: &OperationNode) -> Vec<String> {
    let mut produces: Vec<String> = Vec::new();
    for response in node.responses.values() {
        for media_type in response.content.keys() {
            if !produces.contains(media_type) {
                produces.push(media_type.clone());
            }
        }
    }
    produces
}

/// Schema of the first success response, falling back to `default`
fn success_schema(node: &OperationNode) -> Option<&SchemaNode> {
    let response = node
        .responses
        .iter()
        .find(|(code, _)| code.starts_with('2'))
        .map(|(_, response)| response)
        .or_else(|| node.responses.get("default"))?;
    response
        .content
        .values()
        .find_map(|media| media.schema.as_ref())
}

fn no_content(ctx: &RunContext) -> JsonValue {
    json!({ "media_data_type": ctx.strategy.no_content_media_type })
}

/// Classify one media type, recording unknown ones once per run
pub(crate) fn classify_media_type(ctx: &mut RunContext, media_type: &str) -> Result<MediaTypeInfo> {
    let known = ctx.strategy.known_media_types.get(media_type).cloned();
    let media_data_type = match &known {
        Some(name) => name.clone(),
        None => {
            let shortened = media_type.strip_prefix("application/").unwrap_or(media_type);
            let candidate = format!(
                "{}{}",
                ctx.strategy.unknown_media_prefix,
                ctx.allocator.allocate(shortened, Role::Type, Some(""))
            );
            ctx.registry
                .reserve_or_reuse(&candidate, media_type, RecordKind::MediaType, false)?
        }
    };

    let info = MediaTypeInfo {
        media_type: media_type.to_string(),
        media_data_type,
        media_is_json: is_json_media_type(media_type),
    };
    if known.is_none() && !ctx.unknown_media_types.contains_key(&info.media_data_type) {
        tracing::debug!(media_type = %media_type, name = %info.media_data_type, "Recorded unknown media type");
        ctx.unknown_media_types
            .insert(info.media_data_type.clone(), info.clone());
    }
    Ok(info)
}

fn process_media_types(
    ctx: &mut RunContext,
    op: &mut CodegenOperation,
    consumes: &[String],
    produces: &[String],
) -> Result<()> {
    if !op.has_body_or_form_param() {
        op.vendor_extensions
            .insert("x_inline_content_type".to_string(), no_content(ctx));
    }

    for media_type in consumes {
        let info = classify_media_type(ctx, media_type)?;
        associate_models(ctx, op, &info);
        op.consumes.push(info);
    }
    for media_type in produces {
        let info = classify_media_type(ctx, media_type)?;
        associate_models(ctx, op, &info);
        op.produces.push(info);
    }

    let inline = ctx.options.flag("inlineMimeTypes");
    if inline && op.consumes.len() == 1 && !op.vendor_extensions.contains_key("x_inline_content_type") {
        let value = serde_json::to_value(&op.consumes[0])?;
        op.vendor_extensions
            .insert("x_inline_content_type".to_string(), value.clone());
        for param in op
            .params
            .iter_mut()
            .filter(|p| p.location == ParamLocation::Body && p.required)
        {
            param
                .vendor_extensions
                .insert("x_inline_content_type".to_string(), value.clone());
        }
    }
    if inline && op.produces.len() == 1 {
        let value = serde_json::to_value(&op.produces[0])?;
        op.vendor_extensions
            .insert("x_inline_accept".to_string(), value);
    }

    op.is_multipart = consumes.iter().any(|m| m == MULTIPART_FORM_DATA);
    Ok(())
}

/// Record that body/form models travel as `info`
fn associate_models(ctx: &mut RunContext, op: &CodegenOperation, info: &MediaTypeInfo) {
    for param in op.params.iter().filter(|p| p.is_body_or_form()) {
        if param.is_model && !param.is_container && !param.is_primitive {
            ctx.model_media_types
                .entry(param.data_type.clone())
                .or_default()
                .insert(info.media_data_type.clone());
        }
    }
}
