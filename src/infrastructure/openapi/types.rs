//! Input document model.
//!
//! These structs mirror the parts of an OpenAPI 3 document the generator reads.
//! They are deserialized as-is and never mutated; unknown keys are kept in the
//! `extensions` maps so `x-*` vendor keys stay reachable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// HTTP methods in the order operations are visited
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Root of an API description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSpec {
    #[serde(alias = "swagger")]
    pub openapi: String,
    pub info: Info,
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
    pub security: Vec<IndexMap<String, Vec<String>>>,
    /// The document exactly as read, before any typed view was taken
    #[serde(skip)]
    pub source: Option<serde_yaml::Value>,
}

impl ApiSpec {
    /// All operations in document order, methods in [`HTTP_METHODS`] order
    pub fn operations(&self) -> Vec<(&str, &str, &PathItem, &OperationNode)> {
        let mut ops = Vec::new();
        for (path, item) in &self.paths {
            for (method, op) in item.operations() {
                ops.push((method, path.as_str(), item, op));
            }
        }
        ops
    }

    /// Component name a local `$ref` points at
    pub fn ref_name(reference: &str) -> &str {
        reference.rsplit('/').next().unwrap_or(reference)
    }
}

/// API metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

/// Server definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaNode>,
    pub parameters: IndexMap<String, ParameterNode>,
    pub request_bodies: IndexMap<String, RequestBodyNode>,
    pub security_schemes: IndexMap<String, SecuritySchemeNode>,
}

/// Operations available on one path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathItem {
    pub parameters: Vec<ParameterNode>,
    pub get: Option<OperationNode>,
    pub put: Option<OperationNode>,
    pub post: Option<OperationNode>,
    pub delete: Option<OperationNode>,
    pub options: Option<OperationNode>,
    pub head: Option<OperationNode>,
    pub patch: Option<OperationNode>,
    pub trace: Option<OperationNode>,
}

impl PathItem {
    pub fn operations(&self) -> Vec<(&'static str, &OperationNode)> {
        let slots = [
            &self.get,
            &self.put,
            &self.post,
            &self.delete,
            &self.options,
            &self.head,
            &self.patch,
            &self.trace,
        ];
        HTTP_METHODS
            .iter()
            .zip(slots)
            .filter_map(|(method, op)| op.as_ref().map(|op| (*method, op)))
            .collect()
    }
}

/// A single API operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationNode {
    pub operation_id: Option<String>,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ParameterNode>,
    pub request_body: Option<RequestBodyNode>,
    pub responses: IndexMap<String, ResponseNode>,
    pub deprecated: bool,
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
    #[serde(flatten)]
    pub extensions: IndexMap<String, JsonValue>,
}

/// Operation parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub schema: Option<SchemaNode>,
    pub description: Option<String>,
    pub style: Option<String>,
    pub explode: Option<bool>,
    /// Swagger 2 style collection format, honoured when present
    pub collection_format: Option<String>,
}

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBodyNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub content: IndexMap<String, MediaTypeNode>,
}

/// Payload description for one media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaTypeNode {
    pub schema: Option<SchemaNode>,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseNode {
    pub description: String,
    pub content: IndexMap<String, MediaTypeNode>,
}

/// Schema description
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaNode {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(flatten)]
    pub extensions: IndexMap<String, JsonValue>,
}

impl SchemaNode {
    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array") || self.items.is_some()
    }

    /// Object with an explicit value schema for arbitrary keys
    pub fn is_map(&self) -> bool {
        self.properties.is_empty()
            && matches!(
                self.additional_properties,
                Some(AdditionalProperties::Schema(_)) | Some(AdditionalProperties::Boolean(true))
            )
    }

    pub fn is_object(&self) -> bool {
        self.schema_type.as_deref() == Some("object") || !self.properties.is_empty()
    }

    pub fn is_composed(&self) -> bool {
        !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty()
    }
}

/// `additionalProperties` is either a flag or a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Boolean(bool),
    Schema(Box<SchemaNode>),
}

/// Security scheme
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecuritySchemeNode {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub description: Option<String>,
    pub flows: IndexMap<String, OAuthFlowNode>,
}

/// One OAuth2 flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthFlowNode {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    pub scopes: IndexMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
openapi: 3.0.0
info:
  title: Petstore
  version: 1.0.0
paths:
  /pet/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema: { type: integer, format: int64 }
    get:
      operationId: getPetById
      x-codegen-flag: true
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Pet' }
    delete:
      operationId: deletePet
      responses:
        '204': { description: gone }
components:
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name: { type: string }
        tags:
          type: object
          additionalProperties: { type: string }
"#;

    #[test]
    fn test_deserialize_document() {
        let spec: ApiSpec = serde_yaml::from_str(DOC).unwrap();
        assert_eq!(spec.info.title, "Petstore");

        let ops = spec.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].0, "get");
        assert_eq!(ops[1].0, "delete");
        assert_eq!(ops[0].3.extensions.get("x-codegen-flag"), Some(&JsonValue::Bool(true)));

        let pet = &spec.components.schemas["Pet"];
        assert!(pet.is_object());
        assert_eq!(pet.required, vec!["name"]);
        assert!(pet.properties["tags"].is_map());
    }

    #[test]
    fn test_ref_name() {
        assert_eq!(ApiSpec::ref_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(ApiSpec::ref_name("Pet"), "Pet");
    }
}
