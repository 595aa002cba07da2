//! Per-target mapping and escaping data.
//!
//! A [`TargetStrategy`] is everything the resolution engine needs to know about
//! a target language, expressed as tables and plain function pointers. The
//! presets live in `infrastructure::strategies`.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::core::config::OptionSpec;
use crate::generation::model::PathSegment;
use crate::generation::sanitizers::ReplacementTable;
use crate::generation::types::Target;

/// Formats an array type around its element type
pub type ArrayFormatter = fn(&str) -> String;
/// Formats a map type from its key and value types
pub type MapFormatter = fn(&str, &str) -> String;
/// Renders a templated path as an expression of the target language
pub type PathFormatter = fn(&[PathSegment]) -> String;
/// Renders a placeholder for a path parameter
pub type PlaceholderFormatter = fn(&str) -> String;
/// Case conversion
pub type CaseFn = fn(&str) -> String;

/// Prefixes given to security scheme type names, per scheme family
#[derive(Debug, Clone)]
pub struct SecurityPrefixes {
    pub basic: &'static str,
    pub bearer: &'static str,
    pub api_key: &'static str,
    pub oauth: &'static str,
}

impl Default for SecurityPrefixes {
    fn default() -> Self {
        Self {
            basic: "AuthBasic",
            bearer: "AuthBasic",
            api_key: "AuthApiKey",
            oauth: "AuthOAuth",
        }
    }
}

/// Naming and typing rules of one target language
#[derive(Debug, Clone)]
pub struct TargetStrategy {
    pub target: Target,

    /// Source type keys (`integer`, `long`, `DateTime`, ...) to target types
    pub type_mapping: IndexMap<String, String>,
    pub language_primitives: HashSet<String>,
    /// Lowercase reserved words
    pub reserved_words: HashSet<String>,
    /// Replacement names for reserved words, consulted before prefixing
    pub reserved_word_remap: HashMap<String, String>,
    pub replacements: ReplacementTable,

    pub variable_case: CaseFn,
    pub type_case: CaseFn,

    pub array_type: ArrayFormatter,
    pub map_type: MapFormatter,
    /// Key type of every map
    pub map_key_type: String,
    /// Fallback for schemas without usable type information
    pub any_type: String,

    /// Return type of operations without a response body
    pub no_content_type: String,
    /// Return type of operations producing content of undeclared shape
    pub unknown_response_type: String,

    /// Known media types to their type names
    pub known_media_types: IndexMap<String, String>,
    pub no_content_media_type: String,
    pub unknown_media_prefix: String,

    /// Wire collection formats to target names
    pub collection_formats: IndexMap<String, String>,

    pub enum_type_prefix: String,
    pub enum_constant_marker: String,
    /// Whether model fields are named with the model name as prefix
    pub prefix_fields_with_model: bool,

    pub model_prefix: String,
    pub param_prefix: String,
    pub operation_type_prefix: String,
    pub operation_id_prefix: String,
    pub security_prefixes: SecurityPrefixes,

    pub placeholder: PlaceholderFormatter,
    pub path_expression: PathFormatter,
    pub true_literal: String,
    pub false_literal: String,
    /// Extra sequences escaped in free text after quoting
    pub unsafe_text: Vec<(&'static str, &'static str)>,

    /// Options specific to this target
    pub options: Vec<OptionSpec>,
}

impl TargetStrategy {
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words.contains(&word.to_lowercase())
    }

    /// Escape a reserved word: remap table first, else an underscore prefix
    pub fn escape_reserved_word(&self, word: &str) -> String {
        match self.reserved_word_remap.get(word) {
            Some(remapped) => remapped.clone(),
            None => format!("_{word}"),
        }
    }

    /// Whether a type name would shadow a primitive or an already mapped type
    pub fn shadows_builtin_type(&self, name: &str) -> bool {
        self.language_primitives.contains(name) || self.type_mapping.values().any(|t| t == name)
    }

    pub fn map_type_key(&self, key: &str) -> Option<&str> {
        self.type_mapping.get(key).map(String::as_str)
    }

    /// Literal of a string value
    pub fn string_literal(&self, value: &str) -> String {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }

    pub fn bool_literal(&self, value: bool) -> &str {
        if value {
            &self.true_literal
        } else {
            &self.false_literal
        }
    }

    /// Whether `name` could be declared as-is in the target language
    pub fn is_valid_identifier(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let first_ok = match chars.next() {
            Some(c) => c.is_ascii_alphabetic() || c == '_',
            None => false,
        };
        first_ok
            && chars.all(|c| {
                c.is_ascii_alphanumeric()
                    || c == '_'
                    || self.enum_type_prefix.contains(c)
                    || self.enum_constant_marker.contains(c)
            })
    }
}

/// Default path rendering: the literal path with placeholders written back as
/// `{param}` using the allocated parameter names
pub fn braces_path_expression(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|seg| match seg {
            PathSegment::Literal { value } => value.clone(),
            PathSegment::Placeholder { param_name, .. } => format!("{{{param_name}}}"),
        })
        .collect()
}
