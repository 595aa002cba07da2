//! Haskell (http-client) target

use std::collections::{HashMap, HashSet};

use super::{base_replacements, known_media_types, table};
use crate::core::config::OptionSpec;
use crate::core::utils::{to_camel_case, to_pascal_case};
use crate::generation::model::PathSegment;
use crate::generation::sanitizers::ReplacementTable;
use crate::generation::strategy::{SecurityPrefixes, TargetStrategy};
use crate::generation::types::Target;

const RESERVED: &[&str] = &[
    "as", "case", "of", "class", "data", "family", "default", "deriving", "do", "forall",
    "foreign", "hiding", "if", "then", "else", "import", "infix", "infixl", "infixr", "instance",
    "let", "in", "mdo", "module", "newtype", "proc", "qualified", "rec", "type", "where", "pure",
    "return", "accept", "contenttype",
];

const PRIMITIVES: &[&str] = &[
    "Bool", "String", "Int", "Integer", "Float", "Char", "Double", "List", "FilePath", "Text",
];

pub(super) fn strategy() -> TargetStrategy {
    let mut replacements = base_replacements();
    replacements.retain(|(k, _)| !matches!(*k, "-" | ">" | "<" | "\\" | "\""));
    replacements.extend([
        ("-", "Dash"),
        (">", "GreaterThan"),
        ("<", "LessThan"),
        ("\\\\", "Back_Slash"),
        ("\\\"", "Double_Quote"),
    ]);

    TargetStrategy {
        target: Target::Haskell,
        type_mapping: table(&[
            ("boolean", "Bool"),
            ("int", "Int"),
            ("long", "Integer"),
            ("short", "Int"),
            ("char", "Char"),
            ("float", "Float"),
            ("double", "Double"),
            ("number", "Double"),
            ("integer", "Int"),
            ("file", "FilePath"),
            ("string", "Text"),
            ("UUID", "Text"),
            ("any", "A.Value"),
            ("object", "A.Value"),
            ("binary", "Binary"),
            ("ByteArray", "ByteArray"),
            ("date", "Date"),
            ("DateTime", "DateTime"),
        ]),
        language_primitives: PRIMITIVES.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        reserved_words: RESERVED.iter().map(|s| s.to_string()).collect(),
        reserved_word_remap: HashMap::new(),
        replacements: ReplacementTable::new(replacements),
        variable_case: to_camel_case,
        type_case: to_pascal_case,
        array_type: |inner| format!("[{inner}]"),
        map_type: |key, value| format!("(Map.Map {key} {value})"),
        map_key_type: "String".to_string(),
        any_type: "A.Value".to_string(),
        no_content_type: "NoContent".to_string(),
        unknown_response_type: "res".to_string(),
        known_media_types: known_media_types(),
        no_content_media_type: "MimeNoContent".to_string(),
        unknown_media_prefix: "Mime".to_string(),
        collection_formats: table(&[
            ("csv", "CommaSeparated"),
            ("tsv", "TabSeparated"),
            ("ssv", "SpaceSeparated"),
            ("pipes", "PipeSeparated"),
            ("multi", "MultiParamArray"),
        ]),
        enum_type_prefix: "E'".to_string(),
        enum_constant_marker: "'".to_string(),
        prefix_fields_with_model: true,
        model_prefix: "Model".to_string(),
        param_prefix: "Param".to_string(),
        operation_type_prefix: "Op".to_string(),
        operation_id_prefix: "op".to_string(),
        security_prefixes: SecurityPrefixes::default(),
        placeholder: |name| format!("toPath {name}"),
        path_expression,
        true_literal: "True".to_string(),
        false_literal: "False".to_string(),
        unsafe_text: vec![("{-", "{_-"), ("-}", "-_}")],
        options: vec![
            OptionSpec::flag("allowFromJsonNulls", "Allow JSON null during model decoding", true),
            OptionSpec::flag("allowToJsonNulls", "Emit JSON null during model encoding", false),
            OptionSpec::flag("generateLenses", "Generate lens optics for models", true),
            OptionSpec::flag(
                "generateModelConstructors",
                "Generate smart constructors taking only required fields",
                true,
            ),
            OptionSpec::string(
                "modelDeriving",
                "Additional classes for the deriving clause of models",
                None,
            ),
            OptionSpec::flag("strictFields", "Add strictness annotations to model fields", true),
            OptionSpec::flag(
                "useMonadLogger",
                "Log through monad-logger instead of katip",
                false,
            ),
        ],
    }
}

/// `["/pet/",toPath petId]`
fn path_expression(segments: &[PathSegment]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .map(|seg| match seg {
            PathSegment::Literal { value } => format!("\"{value}\""),
            PathSegment::Placeholder { expression, .. } => expression.clone(),
        })
        .collect();
    format!("[{}]", parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_syntax() {
        let s = strategy();
        assert_eq!((s.array_type)("Text"), "[Text]");
        assert_eq!((s.map_type)(&s.map_key_type, "[Int]"), "(Map.Map String [Int])");
    }

    #[test]
    fn test_path_expression() {
        let segments = vec![
            PathSegment::Literal {
                value: "/pet/".to_string(),
            },
            PathSegment::Placeholder {
                param_name: "petId".to_string(),
                base_name: "petId".to_string(),
                expression: "toPath petId".to_string(),
            },
        ];
        assert_eq!(path_expression(&segments), "[\"/pet/\",toPath petId]");
    }

    #[test]
    fn test_reserved_words_are_case_insensitive() {
        let s = strategy();
        assert!(s.is_reserved("Accept"));
        assert!(s.is_reserved("DATA"));
        assert!(!s.is_reserved("pet"));
    }
}
