//! Rust target

use std::collections::{HashMap, HashSet};

use super::{base_replacements, known_media_types, table};
use crate::core::config::OptionSpec;
use crate::core::utils::{to_pascal_case, to_snake_case};
use crate::generation::sanitizers::ReplacementTable;
use crate::generation::strategy::{SecurityPrefixes, TargetStrategy, braces_path_expression};
use crate::generation::types::Target;

const RESERVED: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "str",
    "String", "Vec", "HashMap", "Option", "Result", "Box",
];

pub(super) fn strategy() -> TargetStrategy {
    let reserved: HashSet<String> = RESERVED.iter().map(|s| s.to_string()).collect();
    let remap: HashMap<String, String> = RESERVED
        .iter()
        .map(|word| (word.to_string(), format!("{word}_")))
        .collect();

    TargetStrategy {
        target: Target::Rust,
        type_mapping: table(&[
            ("boolean", "bool"),
            ("int", "i32"),
            ("integer", "i32"),
            ("long", "i64"),
            ("short", "i16"),
            ("float", "f32"),
            ("double", "f64"),
            ("number", "f64"),
            ("string", "String"),
            ("password", "String"),
            ("UUID", "uuid::Uuid"),
            ("date", "chrono::NaiveDate"),
            ("DateTime", "chrono::DateTime<chrono::Utc>"),
            ("binary", "Vec<u8>"),
            ("ByteArray", "String"),
            ("file", "std::path::PathBuf"),
            ("any", "serde_json::Value"),
            ("object", "serde_json::Value"),
        ]),
        language_primitives: PRIMITIVES.iter().map(|s| s.to_string()).collect(),
        reserved_words: reserved,
        reserved_word_remap: remap,
        replacements: ReplacementTable::new(base_replacements()),
        variable_case: to_snake_case,
        type_case: to_pascal_case,
        array_type: |inner| format!("Vec<{inner}>"),
        map_type: |key, value| format!("HashMap<{key}, {value}>"),
        map_key_type: "String".to_string(),
        any_type: "serde_json::Value".to_string(),
        no_content_type: "()".to_string(),
        unknown_response_type: "serde_json::Value".to_string(),
        known_media_types: known_media_types(),
        no_content_media_type: "MimeNoContent".to_string(),
        unknown_media_prefix: "Mime".to_string(),
        collection_formats: table(&[
            ("csv", "Csv"),
            ("tsv", "Tsv"),
            ("ssv", "Ssv"),
            ("pipes", "Pipes"),
            ("multi", "Multi"),
        ]),
        enum_type_prefix: String::new(),
        enum_constant_marker: String::new(),
        prefix_fields_with_model: false,
        model_prefix: "Model".to_string(),
        param_prefix: "Param".to_string(),
        operation_type_prefix: "Op".to_string(),
        operation_id_prefix: "op".to_string(),
        security_prefixes: SecurityPrefixes::default(),
        placeholder: |name| format!("{{{name}}}"),
        path_expression: braces_path_expression,
        true_literal: "true".to_string(),
        false_literal: "false".to_string(),
        unsafe_text: vec![("*/", "*_/")],
        options: vec![
            OptionSpec::string("crateName", "Name of the generated crate", None),
            OptionSpec::string("crateVersion", "Version of the generated crate", Some("0.1.0")),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_syntax() {
        let s = strategy();
        assert_eq!((s.array_type)("i32"), "Vec<i32>");
        assert_eq!(
            (s.map_type)(&s.map_key_type, "Vec<i32>"),
            "HashMap<String, Vec<i32>>"
        );
    }

    #[test]
    fn test_keywords_get_trailing_underscore() {
        let s = strategy();
        assert!(s.is_reserved("type"));
        assert_eq!(s.escape_reserved_word("type"), "type_");
        assert!(s.shadows_builtin_type("String"));
    }
}
