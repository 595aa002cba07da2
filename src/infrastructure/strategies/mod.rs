//! Built-in target strategies

mod haskell;
mod perl;
mod registry;
mod rust;

pub use registry::StrategyRegistry;

use indexmap::IndexMap;

use crate::generation::strategy::TargetStrategy;
use crate::generation::types::Target;

/// Strategy preset for `target`
pub fn strategy_for(target: Target) -> TargetStrategy {
    match target {
        Target::Haskell => haskell::strategy(),
        Target::Perl => perl::strategy(),
        Target::Rust => rust::strategy(),
    }
}

/// Symbol names shared by all targets. `_` is deliberately absent: it is
/// already legal in identifiers.
pub(crate) fn base_replacements() -> Vec<(&'static str, &'static str)> {
    vec![
        ("$", "Dollar"),
        ("^", "Caret"),
        ("|", "Pipe"),
        ("=", "Equal"),
        ("*", "Star"),
        ("-", "Minus"),
        ("&", "Ampersand"),
        ("%", "Percent"),
        ("#", "Hash"),
        ("@", "At"),
        ("!", "Exclamation"),
        ("+", "Plus"),
        (":", "Colon"),
        (">", "Greater_Than"),
        ("<", "Less_Than"),
        (".", "Period"),
        ("?", "Question_Mark"),
        (",", "Comma"),
        ("'", "Quote"),
        ("\"", "Double_Quote"),
        ("/", "Slash"),
        ("\\", "Back_Slash"),
        ("(", "Left_Parenthesis"),
        (")", "Right_Parenthesis"),
        ("{", "Left_Curly_Bracket"),
        ("}", "Right_Curly_Bracket"),
        ("[", "Left_Square_Bracket"),
        ("]", "Right_Square_Bracket"),
        ("~", "Tilde"),
        ("`", "Backtick"),
        ("<=", "Less_Than_Or_Equal_To"),
        (">=", "Greater_Than_Or_Equal_To"),
        ("!=", "Not_Equal"),
    ]
}

/// Media types every target recognises
pub(crate) fn known_media_types() -> IndexMap<String, String> {
    [
        ("application/json", "MimeJSON"),
        ("application/xml", "MimeXML"),
        ("application/x-www-form-urlencoded", "MimeFormUrlEncoded"),
        ("application/octet-stream", "MimeOctetStream"),
        ("multipart/form-data", "MimeMultipartFormData"),
        ("text/plain", "MimePlainText"),
        ("*/*", "MimeAny"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub(crate) fn table(entries: &[(&str, &str)]) -> IndexMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_has_a_strategy() {
        for target in Target::all() {
            let strategy = strategy_for(target);
            assert_eq!(strategy.target, target);
            assert!(strategy.map_type_key("string").is_some());
            assert!(!strategy.any_type.is_empty());
        }
    }

    #[test]
    fn test_base_replacements_leave_underscore_alone() {
        assert!(base_replacements().iter().all(|(k, _)| *k != "_"));
    }
}
