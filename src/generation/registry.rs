//! Run-scoped identifier registry.
//!
//! Every type-level name handed out during a run is recorded here together with
//! a shape fingerprint. A candidate that collides with a record of the same kind
//! and identical fingerprint reuses that record; any other collision is
//! disambiguated with a strictly increasing numeric suffix.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::core::error::Result;

/// What a registered name stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Param,
    Enum,
    Model,
    Operation,
    MediaType,
    Security,
}

impl RecordKind {
    /// Kinds whose records may be shared by identical shapes
    fn reusable(self) -> bool {
        matches!(self, RecordKind::Param | RecordKind::Enum | RecordKind::MediaType)
    }
}

/// A reserved name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeduplicationRecord {
    pub allocated_name: String,
    pub fingerprint: String,
    pub kind: RecordKind,
}

/// Name registry owned by a single run
#[derive(Debug, Clone, Default)]
pub struct DeduplicationRegistry {
    records: IndexMap<String, DeduplicationRecord>,
}

impl DeduplicationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `candidate`, reuse an identical record, or pick the next free suffix.
    ///
    /// With `append_shape_first`, a candidate already held by a different shape
    /// first gets a rendering of `fingerprint` appended before any numbering.
    pub fn reserve_or_reuse(
        &mut self,
        candidate: &str,
        fingerprint: &str,
        kind: RecordKind,
        append_shape_first: bool,
    ) -> Result<String> {
        let mut name = candidate.to_string();

        if append_shape_first {
            if let Some(existing) = self.records.get(&name) {
                if !Self::is_same_shape(existing, fingerprint, kind) {
                    name.push_str(&shape_suffix(fingerprint));
                }
            }
        }

        loop {
            match self.records.get(&name) {
                None => {
                    self.insert(&name, fingerprint, kind);
                    return Ok(name);
                }
                Some(existing) if Self::is_same_shape(existing, fingerprint, kind) => {
                    return Ok(name);
                }
                Some(_) => name = next_name(&name)?,
            }
        }
    }

    /// Reserve a name that is never shared, suffixing on any collision
    pub fn reserve_unique(
        &mut self,
        candidate: &str,
        fingerprint: &str,
        kind: RecordKind,
    ) -> Result<String> {
        let mut name = candidate.to_string();
        while self.records.contains_key(&name) {
            name = next_name(&name)?;
        }
        self.insert(&name, fingerprint, kind);
        Ok(name)
    }

    /// Name of an enum already registered with exactly this value list
    pub fn find_enum_by_values(&self, fingerprint: &str) -> Option<&str> {
        self.records
            .values()
            .find(|r| r.kind == RecordKind::Enum && r.fingerprint == fingerprint)
            .map(|r| r.allocated_name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&DeduplicationRecord> {
        self.records.get(name)
    }

    /// Records in reservation order
    pub fn records(&self) -> impl Iterator<Item = &DeduplicationRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, name: &str, fingerprint: &str, kind: RecordKind) {
        tracing::trace!(name, fingerprint, ?kind, "Reserved identifier");
        self.records.insert(
            name.to_string(),
            DeduplicationRecord {
                allocated_name: name.to_string(),
                fingerprint: fingerprint.to_string(),
                kind,
            },
        );
    }

    fn is_same_shape(existing: &DeduplicationRecord, fingerprint: &str, kind: RecordKind) -> bool {
        existing.kind == kind && kind.reusable() && existing.fingerprint == fingerprint
    }
}

/// Next candidate after `name`: increment a trailing integer, or append `2`.
///
/// The digits are incremented as text, so arbitrarily long suffixes never overflow.
///
/// ```
/// use apiforge::generation::registry::next_name;
///
/// assert_eq!(next_name("Pet").unwrap(), "Pet2");
/// assert_eq!(next_name("Pet2").unwrap(), "Pet3");
/// assert_eq!(next_name("Pet09").unwrap(), "Pet10");
/// assert_eq!(next_name("Pet99").unwrap(), "Pet100");
/// ```
pub fn next_name(name: &str) -> Result<String> {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &name[stem.len()..];
    if digits.is_empty() {
        return Ok(format!("{name}2"));
    }

    let mut bumped: Vec<u8> = digits.bytes().collect();
    let mut carry = true;
    for digit in bumped.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        bumped.insert(0, b'1');
    }

    // leading zeros are dropped the way an integer increment would drop them
    let bumped: String = bumped.into_iter().map(char::from).collect();
    let trimmed = bumped.trim_start_matches('0');
    let next = if trimmed.is_empty() { "0" } else { trimmed };
    Ok(format!("{stem}{next}"))
}

/// Canonical fingerprint of an enum value list.
///
/// Values keep their JSON typing and quoting, so `[1, 2]` and `["1", "2"]` differ.
pub fn enum_fingerprint(values: &[JsonValue]) -> String {
    JsonValue::Array(values.to_vec()).to_string()
}

fn shape_suffix(fingerprint: &str) -> String {
    fingerprint
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(crate::core::utils::upper_first)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_shape_is_reused() {
        let mut registry = DeduplicationRegistry::new();
        let a = registry
            .reserve_or_reuse("ParamLimit", "Int", RecordKind::Param, false)
            .unwrap();
        let b = registry
            .reserve_or_reuse("ParamLimit", "Int", RecordKind::Param, false)
            .unwrap();
        let c = registry
            .reserve_or_reuse("ParamLimit", "Text", RecordKind::Param, false)
            .unwrap();

        assert_eq!(a, "ParamLimit");
        assert_eq!(b, "ParamLimit");
        assert_eq!(c, "ParamLimit2");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_shape_suffix_first() {
        let mut registry = DeduplicationRegistry::new();
        registry
            .reserve_or_reuse("Status", "Int", RecordKind::Param, true)
            .unwrap();
        let name = registry
            .reserve_or_reuse("Status", "[Text]", RecordKind::Param, true)
            .unwrap();
        assert_eq!(name, "StatusText");

        // the suffixed name is itself reused for the same shape
        let again = registry
            .reserve_or_reuse("Status", "[Text]", RecordKind::Param, true)
            .unwrap();
        assert_eq!(again, "StatusText");
    }

    #[test]
    fn test_models_are_never_reused() {
        let mut registry = DeduplicationRegistry::new();
        let first = registry.reserve_unique("Pet", "pet", RecordKind::Model).unwrap();
        let second = registry.reserve_unique("Pet", "pet", RecordKind::Model).unwrap();
        assert_eq!(first, "Pet");
        assert_eq!(second, "Pet2");
    }

    #[test]
    fn test_kinds_do_not_share_records() {
        let mut registry = DeduplicationRegistry::new();
        registry.reserve_unique("Status", "Status", RecordKind::Model).unwrap();
        let name = registry
            .reserve_or_reuse("Status", "Status", RecordKind::Param, false)
            .unwrap();
        assert_eq!(name, "Status2");
    }

    #[test]
    fn test_enum_lookup_by_values() {
        let mut registry = DeduplicationRegistry::new();
        let fp = enum_fingerprint(&[serde_json::json!("a"), serde_json::json!("b")]);
        assert_eq!(fp, r#"["a","b"]"#);

        registry
            .reserve_or_reuse("E'Kind", &fp, RecordKind::Enum, false)
            .unwrap();
        assert_eq!(registry.find_enum_by_values(&fp), Some("E'Kind"));
        assert_eq!(registry.find_enum_by_values(r#"["a"]"#), None);
    }

    #[test]
    fn test_suffixes_increase_monotonically() {
        let mut registry = DeduplicationRegistry::new();
        let names: Vec<String> = (0..5)
            .map(|i| {
                registry
                    .reserve_or_reuse("Limit", &format!("T{i}"), RecordKind::Param, false)
                    .unwrap()
            })
            .collect();
        assert_eq!(names, ["Limit", "Limit2", "Limit3", "Limit4", "Limit5"]);
    }

    #[test]
    fn test_next_name_handles_long_digit_suffixes() {
        assert_eq!(
            next_name("Pet123456789012345678901").unwrap(),
            "Pet123456789012345678902"
        );
        assert_eq!(
            next_name(&format!("Pet{}", u64::MAX)).unwrap(),
            "Pet18446744073709551616"
        );
        assert_eq!(next_name("Pet999").unwrap(), "Pet1000");
        assert_eq!(next_name("Pet0").unwrap(), "Pet1");
    }

    #[test]
    fn test_long_numeric_names_collide_without_failing() {
        let mut registry = DeduplicationRegistry::new();
        let first = registry
            .reserve_unique("Pet123456789012345678901", "a", RecordKind::Model)
            .unwrap();
        let second = registry
            .reserve_unique("Pet123456789012345678901", "b", RecordKind::Model)
            .unwrap();
        assert_eq!(first, "Pet123456789012345678901");
        assert_eq!(second, "Pet123456789012345678902");
    }

    #[test]
    fn test_enum_fingerprint_keeps_types_and_quoting() {
        use serde_json::json;

        let pair = enum_fingerprint(&[json!("a"), json!("b")]);
        let joined = enum_fingerprint(&[json!("a, b")]);
        assert_ne!(pair, joined);

        let ints = enum_fingerprint(&[json!(1), json!(2)]);
        let strings = enum_fingerprint(&[json!("1"), json!("2")]);
        assert_ne!(ints, strings);
        assert_eq!(ints, "[1,2]");
    }
}
