//! The resolved intermediate model handed to templates.
//!
//! Field names of these types are what template authors see in a render
//! context. Anything generator specific goes into the `vendor_extensions` map
//! of the entity; each entity owns its map.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Open key-value bag of generator specific flags
pub type VendorExtensions = IndexMap<String, JsonValue>;

/// `x-*` keys of an input node, reachable from templates as `x_snake_case`
pub fn input_extensions(extensions: &IndexMap<String, JsonValue>) -> VendorExtensions {
    extensions
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.replace('-', "_"), value.clone()))
        .collect()
}

/// Container shape of a property or parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    #[default]
    None,
    Array,
    Map,
}

/// One constant of an enumerated type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVar {
    /// Constant identifier, already prefixed with the enum type name
    pub name: String,
    /// Literal of the value in the target language
    pub value: String,
}

/// A distinct enumerated type discovered during resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDefinition {
    pub name: String,
    /// Target type of the underlying values
    pub data_type: String,
    pub allowable_values: Vec<JsonValue>,
    pub enum_vars: Vec<EnumVar>,
}

/// A field of a model, or the element of a container
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenProperty {
    pub name: String,
    pub base_name: String,
    pub datatype: String,
    /// Same as `datatype` with enum type names substituted, through containers
    pub datatype_with_enum: String,
    pub base_type: String,
    pub container_type: ContainerType,
    pub items: Option<Box<CodegenProperty>>,
    pub required: bool,
    pub is_enum: bool,
    pub enum_name: Option<String>,
    pub allowable_values: Vec<JsonValue>,
    pub enum_vars: Vec<EnumVar>,
    pub is_primitive: bool,
    pub is_string: bool,
    pub is_date: bool,
    pub is_date_time: bool,
    pub is_model: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub vendor_extensions: VendorExtensions,
}

impl CodegenProperty {
    pub fn is_container(&self) -> bool {
        self.container_type != ContainerType::None
    }

    /// The innermost element of a container chain (self for scalars)
    pub fn innermost(&self) -> &CodegenProperty {
        let mut current = self;
        while let Some(items) = &current.items {
            current = items;
        }
        current
    }
}

/// A named schema
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenModel {
    /// Schema key as written in the input
    pub name: String,
    pub classname: String,
    pub vars: Vec<CodegenProperty>,
    pub parent: Option<String>,
    pub is_enum: bool,
    pub allowable_values: Vec<JsonValue>,
    pub enum_vars: Vec<EnumVar>,
    /// Non-object schemas become aliases of `data_type`
    pub is_alias: bool,
    pub data_type: Option<String>,
    pub description: Option<String>,
    pub vendor_extensions: VendorExtensions,
}

impl CodegenModel {
    pub fn var(&self, base_name: &str) -> Option<&CodegenProperty> {
        self.vars.iter().find(|v| v.base_name == base_name)
    }
}

/// Where a parameter travels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    #[default]
    Query,
    Header,
    Cookie,
    Form,
    Body,
}

/// An operation input
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenParameter {
    pub base_name: String,
    pub param_name: String,
    pub data_type: String,
    pub datatype_with_enum: String,
    pub base_type: String,
    pub location: ParamLocation,
    pub required: bool,
    pub collection_format: Option<String>,
    pub is_enum: bool,
    pub enum_name: Option<String>,
    pub allowable_values: Vec<JsonValue>,
    pub is_primitive: bool,
    pub is_container: bool,
    pub is_model: bool,
    pub is_file: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub vendor_extensions: VendorExtensions,
}

impl CodegenParameter {
    pub fn is_body_or_form(&self) -> bool {
        matches!(self.location, ParamLocation::Body | ParamLocation::Form)
    }
}

/// A consumed or produced media type with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaTypeInfo {
    pub media_type: String,
    /// Target type name standing for the media type
    pub media_data_type: String,
    pub media_is_json: bool,
}

/// Piece of a templated request path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PathSegment {
    Literal {
        value: String,
    },
    Placeholder {
        param_name: String,
        base_name: String,
        expression: String,
    },
}

/// One API call
#[derive(Debug, Clone, Default, Serialize)]
pub struct CodegenOperation {
    pub operation_id: String,
    pub http_method: String,
    pub path: String,
    pub path_segments: Vec<PathSegment>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub notes: Option<String>,
    pub deprecated: bool,
    pub params: Vec<CodegenParameter>,
    pub consumes: Vec<MediaTypeInfo>,
    pub produces: Vec<MediaTypeInfo>,
    pub return_type: String,
    pub return_base_type: Option<String>,
    pub return_container: ContainerType,
    pub is_multipart: bool,
    pub auth_methods: Vec<String>,
    pub vendor_extensions: VendorExtensions,
}

impl CodegenOperation {
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &CodegenParameter> {
        self.params.iter().filter(move |p| p.location == location)
    }

    pub fn has_body_or_form_param(&self) -> bool {
        self.params.iter().any(CodegenParameter::is_body_or_form)
    }
}

/// Operations sharing a first tag, rendered together as one API module
#[derive(Debug, Clone, Serialize)]
pub struct ApiGroup {
    pub tag: String,
    pub classname: String,
    pub operations: Vec<CodegenOperation>,
}

/// Authentication scheme family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityKind {
    Basic,
    Bearer,
    ApiKey,
    OAuth2,
}

/// A declared OAuth scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityScope {
    pub scope: String,
    pub description: String,
}

/// A security scheme
#[derive(Debug, Clone, Serialize)]
pub struct CodegenSecurity {
    /// Allocated type name, e.g. `AuthApiKeyApiKey`
    pub name: String,
    /// Scheme key as written in the input
    pub key: String,
    pub kind: SecurityKind,
    pub key_param_name: Option<String>,
    pub key_in: Option<String>,
    pub scopes: Vec<SecurityScope>,
    pub description: Option<String>,
    pub vendor_extensions: VendorExtensions,
}

/// A file rendered once per run rather than per model or operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportingFile {
    pub template_ref: String,
    pub destination_folder: String,
    pub destination_filename: String,
}

impl SupportingFile {
    pub fn new<T, F, N>(template_ref: T, destination_folder: F, destination_filename: N) -> Self
    where
        T: Into<String>,
        F: Into<String>,
        N: Into<String>,
    {
        Self {
            template_ref: template_ref.into(),
            destination_folder: destination_folder.into(),
            destination_filename: destination_filename.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_innermost_walks_nested_items() {
        let leaf = CodegenProperty {
            datatype: "Status".to_string(),
            ..Default::default()
        };
        let middle = CodegenProperty {
            container_type: ContainerType::Map,
            items: Some(Box::new(leaf)),
            ..Default::default()
        };
        let outer = CodegenProperty {
            container_type: ContainerType::Array,
            items: Some(Box::new(middle)),
            ..Default::default()
        };

        assert!(outer.is_container());
        assert_eq!(outer.innermost().datatype, "Status");
    }

    #[test]
    fn test_path_segment_serializes_with_kind_tag() {
        let seg = PathSegment::Placeholder {
            param_name: "petId".to_string(),
            base_name: "petId".to_string(),
            expression: "toPath petId".to_string(),
        };
        let json = serde_json::to_value(&seg).unwrap();
        assert_eq!(json["kind"], "placeholder");
        assert_eq!(json["expression"], "toPath petId");
    }

    #[test]
    fn test_params_in_filters_by_location() {
        let op = CodegenOperation {
            params: vec![
                CodegenParameter {
                    base_name: "petId".to_string(),
                    location: ParamLocation::Path,
                    ..Default::default()
                },
                CodegenParameter {
                    base_name: "body".to_string(),
                    location: ParamLocation::Body,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(op.params_in(ParamLocation::Path).count(), 1);
        assert!(op.has_body_or_form_param());
    }
}
