//! Property tests for identifier sanitization and allocation

use std::sync::Arc;

use apiforge::generation::Target;
use apiforge::generation::naming::{IdentifierAllocator, Role};
use apiforge::generation::registry::{DeduplicationRegistry, RecordKind};
use apiforge::infrastructure::strategies::strategy_for;
use proptest::prelude::*;

fn allocator(target: Target) -> IdentifierAllocator {
    IdentifierAllocator::new(Arc::new(strategy_for(target)))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    #[test]
    fn test_sanitizer_is_total(raw in any::<String>()) {
        let alloc = allocator(Target::Haskell);
        let out = alloc.sanitizer().sanitize(&raw);

        prop_assert!(!out.is_empty());
        prop_assert!(out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        prop_assert!(out.chars().any(|c| c.is_ascii_alphanumeric()));

        let variable = alloc.allocate(&raw, Role::Variable, None);
        prop_assert!(!variable.is_empty());
        prop_assert!(variable.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn test_type_names_are_identifiers(raw in "\\PC{0,24}") {
        for target in Target::all() {
            let alloc = allocator(target);
            let name = alloc.allocate(&raw, Role::Type, None);
            prop_assert!(is_identifier(&name), "{target}: {raw:?} -> {name:?}");
            prop_assert_eq!(&name, &alloc.allocate(&raw, Role::Type, None));
        }
    }

    #[test]
    fn test_unique_reservations_never_repeat(candidates in prop::collection::vec("[A-Za-z]{1,4}[0-9]{0,2}", 1..64)) {
        let mut registry = DeduplicationRegistry::new();
        let mut seen = std::collections::HashSet::new();
        for (i, candidate) in candidates.iter().enumerate() {
            let name = registry
                .reserve_unique(candidate, &i.to_string(), RecordKind::Model)
                .unwrap();
            prop_assert!(seen.insert(name.clone()), "{name} handed out twice");
        }
        prop_assert_eq!(registry.len(), candidates.len());
    }

    #[test]
    fn test_suffixes_are_monotonic(stem in "[A-Z][a-z]{0,8}", shapes in 1usize..20) {
        let mut registry = DeduplicationRegistry::new();
        let names: Vec<String> = (0..shapes)
            .map(|i| {
                registry
                    .reserve_or_reuse(&stem, &format!("shape{i}"), RecordKind::Param, false)
                    .unwrap()
            })
            .collect();

        prop_assert_eq!(&names[0], &stem);
        for (i, name) in names.iter().enumerate().skip(1) {
            prop_assert_eq!(name, &format!("{stem}{}", i + 1));
        }

        // an identical shape always comes back to its first name
        let again = registry
            .reserve_or_reuse(&stem, "shape0", RecordKind::Param, false)
            .unwrap();
        prop_assert_eq!(again, stem);
    }
}
