//! Perl target

use std::collections::HashMap;

use super::{base_replacements, known_media_types, table};
use crate::core::config::OptionSpec;
use crate::core::utils::{to_pascal_case, to_snake_case};
use crate::generation::sanitizers::ReplacementTable;
use crate::generation::strategy::{SecurityPrefixes, TargetStrategy, braces_path_expression};
use crate::generation::types::Target;

const RESERVED: &[&str] = &[
    "else", "lock", "qw", "__end__", "elsif", "lt", "qx", "__file__", "eq", "m", "s",
    "__line__", "exp", "ne", "sub", "__package__", "for", "no", "tr", "and", "foreach", "or",
    "unless", "cmp", "ge", "package", "until", "continue", "gt", "q", "while", "core", "if",
    "qq", "xor", "do", "le", "qr", "y", "return",
];

const PRIMITIVES: &[&str] = &[
    "int", "double", "string", "boolean", "DateTime", "ARRAY", "HASH", "object",
];

pub(super) fn strategy() -> TargetStrategy {
    TargetStrategy {
        target: Target::Perl,
        type_mapping: table(&[
            ("integer", "int"),
            ("long", "int"),
            ("float", "double"),
            ("double", "double"),
            ("number", "double"),
            ("boolean", "boolean"),
            ("string", "string"),
            ("UUID", "string"),
            ("date", "DateTime"),
            ("DateTime", "DateTime"),
            ("password", "string"),
            ("object", "object"),
            ("any", "object"),
            ("file", "string"),
            ("binary", "string"),
            ("ByteArray", "string"),
        ]),
        language_primitives: PRIMITIVES.iter().map(|s| s.to_string()).collect(),
        reserved_words: RESERVED.iter().map(|s| s.to_string()).collect(),
        reserved_word_remap: HashMap::new(),
        replacements: ReplacementTable::new(base_replacements()),
        variable_case: to_snake_case,
        type_case: to_pascal_case,
        array_type: |inner| format!("ARRAY[{inner}]"),
        map_type: |key, value| format!("HASH[{key},{value}]"),
        map_key_type: "string".to_string(),
        any_type: "object".to_string(),
        no_content_type: "undef".to_string(),
        unknown_response_type: "object".to_string(),
        known_media_types: known_media_types(),
        no_content_media_type: "MimeNoContent".to_string(),
        unknown_media_prefix: "Mime".to_string(),
        collection_formats: table(&[
            ("csv", "csv"),
            ("tsv", "tsv"),
            ("ssv", "ssv"),
            ("pipes", "pipes"),
            ("multi", "multi"),
        ]),
        enum_type_prefix: String::new(),
        enum_constant_marker: String::new(),
        prefix_fields_with_model: false,
        model_prefix: "Model".to_string(),
        param_prefix: "Param".to_string(),
        operation_type_prefix: "Op".to_string(),
        operation_id_prefix: "call".to_string(),
        security_prefixes: SecurityPrefixes::default(),
        placeholder: |name| format!("{{{name}}}"),
        path_expression: braces_path_expression,
        true_literal: "1".to_string(),
        false_literal: "0".to_string(),
        unsafe_text: vec![("=cut", "= cut")],
        options: vec![
            OptionSpec::string(
                "moduleName",
                "Perl module name (convention: CamelCase or Long::Module)",
                Some("WWW::OpenAPIClient"),
            ),
            OptionSpec::string("moduleVersion", "Perl module version", Some("1.0.0")),
        ],
    }
}
