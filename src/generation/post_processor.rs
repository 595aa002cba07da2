//! Post-processing of resolved models and operations.
//!
//! Runs after resolution, when the whole run is known: attaches the flags
//! that depend on every operation (media types a model travels as, first
//! operation of a tag) and publishes the run-wide worklists as globals.

use indexmap::IndexMap;
use serde_json::json;

use crate::generation::context::RunContext;
use crate::generation::model::{
    ApiGroup, CodegenModel, CodegenOperation, CodegenParameter, CodegenSecurity, EnumDefinition,
    MediaTypeInfo,
};
use crate::generation::naming::Role;
use crate::generation::operation::FORM_URL_ENCODED;

/// Tag of operations declaring none
pub const DEFAULT_TAG: &str = "default";

/// Attach model flags that depend on how operations use the model
pub fn post_process_models(ctx: &RunContext, models: &mut [CodegenModel]) {
    let form_type = ctx.strategy.known_media_types.get(FORM_URL_ENCODED);
    let form_instances = ctx.options.flag("generateFormUrlEncodedInstances");
    let with_enums = ctx.generate_enums();

    for model in models.iter_mut() {
        for var in model.vars.iter_mut() {
            let var_type = if with_enums {
                var.datatype_with_enum.clone()
            } else {
                var.datatype.clone()
            };
            var.vendor_extensions.insert("x_data_type".to_string(), json!(var_type));
        }

        let data_type = model
            .data_type
            .clone()
            .unwrap_or_else(|| model.classname.clone());
        model.vendor_extensions.insert("x_data_type".to_string(), json!(data_type));
        model.vendor_extensions.insert("x_is_enum".to_string(), json!(with_enums && model.is_enum));

        let mime_types: Vec<String> = ctx
            .model_media_types
            .get(&model.classname)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        let sent_as_form = form_type.is_some_and(|form| mime_types.contains(form));
        let flat = model.vars.iter().all(|v| {
            !v.is_container() && (v.is_primitive || v.is_string || v.is_date || v.is_date_time)
        });
        if form_instances && sent_as_form && flat {
            tracing::debug!(model = %model.classname, "Model gets a form-urlencoded encoder");
            model
                .vendor_extensions
                .insert("x_has_mime_form_url_encoded".to_string(), json!(true));
        }
        model
            .vendor_extensions
            .insert("x_mime_types".to_string(), json!(mime_types));
    }
}

/// Group operations by first tag and mark the first operation of each group
pub fn post_process_operations(ctx: &RunContext, operations: &mut [CodegenOperation]) -> Vec<ApiGroup> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (index, op) in operations.iter().enumerate() {
        let tag = op.tags.first().map(String::as_str).unwrap_or(DEFAULT_TAG);
        groups.entry(tag.to_string()).or_default().push(index);
    }

    for indices in groups.values() {
        for (position, &index) in indices.iter().enumerate() {
            operations[index]
                .vendor_extensions
                .insert("x_has_new_tag".to_string(), json!(position == 0));
        }
    }

    groups
        .into_iter()
        .map(|(tag, indices)| ApiGroup {
            classname: ctx.allocator.allocate(&tag, Role::Type, None),
            operations: indices.iter().map(|&i| operations[i].clone()).collect(),
            tag,
        })
        .collect()
}

/// Publish the run-wide worklists for templates
pub fn finalize_globals(
    ctx: &mut RunContext,
    models: &[CodegenModel],
    operations: &[CodegenOperation],
    apis: &[ApiGroup],
    security: &[CodegenSecurity],
) {
    let mut unknown: Vec<MediaTypeInfo> = ctx.unknown_media_types.values().cloned().collect();
    unknown.sort_by(|a, b| a.media_type.cmp(&b.media_type));

    let mut params: Vec<(&String, &CodegenParameter)> = ctx.unique_params.iter().collect();
    params.sort_by(|a, b| a.0.cmp(b.0));
    let params: Vec<CodegenParameter> = params.into_iter().map(|(_, p)| p.clone()).collect();

    let enums: Vec<EnumDefinition> = ctx.enums.values().cloned().collect();

    ctx.set_global("x_has_unknown_mime_types", !unknown.is_empty());
    ctx.set_global("x_unknown_mime_types", &unknown);
    ctx.set_global("x_all_unique_params", &params);
    ctx.set_global("x_has_enum_section", !enums.is_empty());
    ctx.set_global("x_all_enums", &enums);
    ctx.set_global("x_has_security", !security.is_empty());
    ctx.set_global("models", models);
    ctx.set_global("operations", operations);
    ctx.set_global("apis", apis);

    tracing::info!(
        models = models.len(),
        operations = operations.len(),
        apis = apis.len(),
        unique_params = params.len(),
        enums = enums.len(),
        unknown_media_types = unknown.len(),
        "Post-processing complete"
    );
}
