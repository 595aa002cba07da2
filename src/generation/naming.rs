//! Identifier allocation.
//!
//! [`IdentifierAllocator`] turns raw names from the input document into
//! candidate identifiers of the target language. It is pure: the same input
//! always gives the same candidate, and uniqueness across the run is left to
//! the [`DeduplicationRegistry`](crate::generation::registry::DeduplicationRegistry).

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::core::utils::upper_first;
use crate::generation::sanitizers::{EMPTY_FALLBACK, NameSanitizer};
use crate::generation::strategy::TargetStrategy;

/// What an identifier will name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Fields, parameters, functions
    Variable,
    /// Models, newtypes, enums
    Type,
    /// Constants of an enumerated type
    EnumConstant,
}

const SEPARATORS: &[char] = &['-', ' ', '.', '/', '[', '(', ':', '\t'];

/// Builds candidate identifiers according to a [`TargetStrategy`]
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    strategy: Arc<TargetStrategy>,
    sanitizer: NameSanitizer,
}

impl IdentifierAllocator {
    pub fn new(strategy: Arc<TargetStrategy>) -> Self {
        let sanitizer = NameSanitizer::new(strategy.replacements.clone());
        Self {
            strategy,
            sanitizer,
        }
    }

    pub fn sanitizer(&self) -> &NameSanitizer {
        &self.sanitizer
    }

    /// Allocate a candidate identifier.
    ///
    /// For [`Role::Variable`] a `prefix` is the owning entity's name and the
    /// result is `prefix` followed by the type-cased name. For [`Role::Type`] the
    /// prefix is the escape prefix used when the name would be reserved,
    /// digit-leading or shadow a builtin type (the strategy's model prefix when
    /// absent). For [`Role::EnumConstant`] the prefix is the enum type name.
    pub fn allocate(&self, raw: &str, role: Role, prefix: Option<&str>) -> String {
        match role {
            Role::Variable => self.variable(raw, prefix),
            Role::Type => self.type_name(raw, prefix),
            Role::EnumConstant => self.enum_constant(raw, false, prefix),
        }
    }

    /// Enum constant for a JSON value; numbers get the `Num` spelling
    pub fn allocate_enum_value(&self, value: &JsonValue, prefix: Option<&str>) -> String {
        match value {
            JsonValue::String(s) => self.enum_constant(s, false, prefix),
            JsonValue::Number(n) => self.enum_constant(&n.to_string(), true, prefix),
            JsonValue::Null => self.enum_constant("null", false, prefix),
            other => self.enum_constant(&other.to_string(), false, prefix),
        }
    }

    /// Function-style name of an operation, escaped with the operation id prefix
    pub fn allocate_operation_id(&self, raw: &str) -> String {
        let name = (self.strategy.variable_case)(&self.fragment(raw));
        if self.needs_escape(&name) || self.strategy.shadows_builtin_type(&name) {
            (self.strategy.variable_case)(&format!("{}_{name}", self.strategy.operation_id_prefix))
        } else {
            name
        }
    }

    fn variable(&self, raw: &str, prefix: Option<&str>) -> String {
        let fragment = self.fragment(raw);
        if let Some(prefix) = prefix {
            return format!("{prefix}{}", (self.strategy.type_case)(&fragment));
        }

        let name = non_empty((self.strategy.variable_case)(&fragment));
        if self.needs_escape(&name) {
            self.strategy.escape_reserved_word(&name)
        } else {
            name
        }
    }

    fn type_name(&self, raw: &str, prefix: Option<&str>) -> String {
        let name = non_empty((self.strategy.type_case)(&self.fragment(raw)));
        if self.needs_escape(&name) || self.strategy.shadows_builtin_type(&name) {
            let prefix = prefix.unwrap_or(&self.strategy.model_prefix);
            format!("{prefix}{name}")
        } else {
            name
        }
    }

    fn enum_constant(&self, raw: &str, numeric: bool, prefix: Option<&str>) -> String {
        let body = if raw.is_empty() {
            EMPTY_FALLBACK.to_string()
        } else if let Some(symbol) = self.sanitizer.symbol_name(raw) {
            (self.strategy.type_case)(symbol)
        } else if numeric {
            let spelled = raw
                .replace('-', "Minus_")
                .replace('+', "Plus_")
                .replace('.', "_Dot_");
            format!("Num{spelled}")
        } else {
            non_empty((self.strategy.type_case)(&self.fragment(raw)))
        };

        let constant = format!("{}{}", self.strategy.enum_constant_marker, upper_first(&body));
        match prefix {
            Some(prefix) => format!("{prefix}{constant}"),
            None => constant,
        }
    }

    /// Separator normalization followed by sanitization
    fn fragment(&self, raw: &str) -> String {
        let normalized: String = raw
            .chars()
            .map(|c| if SEPARATORS.contains(&c) { '_' } else { c })
            .collect();
        self.sanitizer.sanitize(&normalized)
    }

    fn needs_escape(&self, name: &str) -> bool {
        name.starts_with(|c: char| c.is_ascii_digit()) || self.strategy.is_reserved(name)
    }
}

fn non_empty(name: String) -> String {
    if name.is_empty() {
        EMPTY_FALLBACK.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::strategies;
    use crate::generation::types::Target;

    fn haskell() -> IdentifierAllocator {
        IdentifierAllocator::new(Arc::new(strategies::strategy_for(Target::Haskell)))
    }

    fn rust() -> IdentifierAllocator {
        IdentifierAllocator::new(Arc::new(strategies::strategy_for(Target::Rust)))
    }

    #[test]
    fn test_field_name_with_model_prefix() {
        let alloc = haskell();
        assert_eq!(
            alloc.allocate("created-at", Role::Variable, Some("sample")),
            "sampleCreatedAt"
        );
        assert_eq!(alloc.allocate("id", Role::Variable, Some("pet")), "petId");
    }

    #[test]
    fn test_variable_escaping() {
        let alloc = haskell();
        assert_eq!(alloc.allocate("pet_id", Role::Variable, None), "petId");
        // reserved words and digit-leading names get escaped
        assert_eq!(alloc.allocate("type", Role::Variable, None), "_type");
        assert_eq!(alloc.allocate("1st", Role::Variable, None), "_1st");
    }

    #[test]
    fn test_type_escaping_uses_role_prefix() {
        let alloc = haskell();
        assert_eq!(alloc.allocate("pet", Role::Type, Some("Model")), "Pet");
        assert_eq!(
            alloc.allocate("200_response", Role::Type, Some("Model")),
            "Model200Response"
        );
        // shadows a mapped type
        assert_eq!(alloc.allocate("text", Role::Type, Some("Param")), "ParamText");
        // reserved, case-insensitively
        assert_eq!(alloc.allocate("Data", Role::Type, None), "ModelData");
    }

    #[test]
    fn test_snake_case_target() {
        let alloc = rust();
        assert_eq!(alloc.allocate("petId", Role::Variable, None), "pet_id");
        assert_eq!(alloc.allocate("type", Role::Variable, None), "type_");
        assert_eq!(alloc.allocate("pet-status", Role::Type, None), "PetStatus");
    }

    #[test]
    fn test_enum_constants() {
        let alloc = haskell();
        assert_eq!(
            alloc.allocate("available", Role::EnumConstant, Some("E'Status")),
            "E'Status'Available"
        );
        assert_eq!(alloc.allocate("", Role::EnumConstant, None), "'Empty");
        assert_eq!(alloc.allocate("-", Role::EnumConstant, None), "'Dash");
        assert_eq!(
            alloc.allocate_enum_value(&serde_json::json!(-1.5), None),
            "'NumMinus_1_Dot_5"
        );
    }

    #[test]
    fn test_operation_ids() {
        let alloc = haskell();
        assert_eq!(alloc.allocate_operation_id("find_pets"), "findPets");
        assert_eq!(alloc.allocate_operation_id("123go"), "op123go");
        assert_eq!(alloc.allocate_operation_id("type"), "opType");
    }

    #[test]
    fn test_never_empty() {
        let alloc = haskell();
        assert_eq!(alloc.allocate("", Role::Type, None), "Empty");
        assert_eq!(alloc.allocate("日本", Role::Variable, None), "empty");
        // symbols with a table entry are spelled out instead
        assert_eq!(alloc.allocate("$$$", Role::Variable, None), "dollarDollarDollar");
    }
}
