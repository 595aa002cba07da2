//! Sanitizers turning arbitrary input text into identifier fragments and safe
//! documentation strings.

use once_cell::sync::Lazy;
use regex::Regex;

/// Token returned when nothing usable survives sanitization
pub const EMPTY_FALLBACK: &str = "Empty";

/// Ordered mapping of disallowed character sequences to word fragments.
///
/// Entries are kept longest-first so that multi-character sequences (an escaped
/// backslash, say) win over the single characters they contain.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    entries: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        // stable: equal lengths keep declaration order
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    /// Fragment for a whole value, if the table has one
    pub fn lookup(&self, whole: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(seq, _)| seq == whole)
            .map(|(_, fragment)| fragment.as_str())
    }

    fn match_prefix(&self, input: &str) -> Option<(&str, &str)> {
        self.entries
            .iter()
            .find(|(seq, _)| input.starts_with(seq.as_str()))
            .map(|(seq, fragment)| (seq.as_str(), fragment.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns raw strings into fragments made only of `[A-Za-z0-9_]`.
///
/// Sequences found in the replacement table are swapped for their fragment,
/// delimited by underscores so later case conversion sees word boundaries.
/// Everything else outside the identifier alphabet is dropped. Inputs with no
/// surviving letter or digit become [`EMPTY_FALLBACK`].
#[derive(Debug, Clone, Default)]
pub struct NameSanitizer {
    table: ReplacementTable,
}

impl NameSanitizer {
    pub fn new(table: ReplacementTable) -> Self {
        Self { table }
    }

    pub fn sanitize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(ch) = rest.chars().next() {
            if let Some((seq, fragment)) = self.table.match_prefix(rest) {
                out.push('_');
                out.push_str(fragment);
                out.push('_');
                rest = &rest[seq.len()..];
                continue;
            }
            if ch.is_ascii_alphanumeric() || ch == '_' {
                out.push(ch);
            }
            rest = &rest[ch.len_utf8()..];
        }

        if out.chars().any(|c| c.is_ascii_alphanumeric()) {
            out
        } else {
            EMPTY_FALLBACK.to_string()
        }
    }

    /// Table fragment for a value made entirely of one known symbol
    pub fn symbol_name(&self, raw: &str) -> Option<&str> {
        self.table.lookup(raw)
    }
}

static SMART_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2014}]").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Flattens free text (descriptions, summaries) for use inside generated
/// comments and string literals.
///
/// Smart punctuation is replaced with ASCII, whitespace collapsed to single
/// spaces, backslashes and double quotes escaped, then `unsafe_sequences` are
/// applied in order.
///
/// # Examples
/// ```
/// use apiforge::generation::sanitizers::escape_text;
///
/// let out = escape_text("A \u{201C}quoted\u{201D}\n\tvalue", &[]);
/// assert_eq!(out, "A \\\"quoted\\\" value");
/// ```
pub fn escape_text(input: &str, unsafe_sequences: &[(&str, &str)]) -> String {
    let plain = SMART_PUNCTUATION.replace_all(input, |caps: &regex::Captures| match &caps[0] {
        "\u{2018}" | "\u{2019}" => "'",
        "\u{201C}" | "\u{201D}" => "\"",
        _ => "-",
    });
    let collapsed = WHITESPACE.replace_all(plain.trim(), " ");
    let mut safe = collapsed.replace('\\', "\\\\").replace('"', "\\\"");
    for (from, to) in unsafe_sequences {
        safe = safe.replace(from, to);
    }
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haskell_like() -> NameSanitizer {
        NameSanitizer::new(ReplacementTable::new([
            ("-", "Dash"),
            (">", "GreaterThan"),
            ("\\\\", "Back_Slash"),
            ("\\\"", "Double_Quote"),
        ]))
    }

    #[test]
    fn test_keeps_identifier_alphabet() {
        let s = NameSanitizer::default();
        assert_eq!(s.sanitize("pet_id42"), "pet_id42");
        assert_eq!(s.sanitize("pét id"), "ptid");
    }

    #[test]
    fn test_table_sequences_become_fragments() {
        let s = haskell_like();
        assert_eq!(s.sanitize("a>b"), "a_GreaterThan_b");
        assert_eq!(s.sanitize("x-y"), "x_Dash_y");
    }

    #[test]
    fn test_longer_sequences_win() {
        let s = haskell_like();
        // an escaped backslash pair is one token, not two lone backslashes
        assert_eq!(s.sanitize("\\\\"), "_Back_Slash_");
        assert_eq!(s.sanitize("\\\""), "_Double_Quote_");
    }

    #[test]
    fn test_falls_back_to_empty_token() {
        let s = haskell_like();
        assert_eq!(s.sanitize(""), EMPTY_FALLBACK);
        assert_eq!(s.sanitize("$"), EMPTY_FALLBACK);
        assert_eq!(s.sanitize("___"), EMPTY_FALLBACK);
        assert_eq!(s.sanitize("日本"), EMPTY_FALLBACK);
    }

    #[test]
    fn test_symbol_name_matches_whole_values_only() {
        let s = haskell_like();
        assert_eq!(s.symbol_name(">"), Some("GreaterThan"));
        assert_eq!(s.symbol_name(">="), None);
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("  a\tb\n\nc ", &[]), "a b c");
        assert_eq!(escape_text("say \"hi\"", &[]), "say \\\"hi\\\"");
        assert_eq!(escape_text("x\u{2014}y", &[]), "x-y");
        assert_eq!(escape_text("{- comment -}", &[("{-", "{_-"), ("-}", "-_}")]), "{_- comment -_}");
    }
}
