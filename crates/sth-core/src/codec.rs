//! # Name Codec
//!
//! Reversible escaping of database and collection name segments.
//!
//! The document store restricts the characters allowed in names. Each
//! forbidden character is replaced by the escape marker `x` followed by its
//! code point as exactly four lowercase hex digits (`$` -> `x0024`).
//!
//! Text that already looks like an escape (`x12ab`) gets one more leading
//! marker (`xx12ab`), so every encoding pass adds exactly one level and
//! every decoding pass removes exactly one.
//!
//! ## Rules
//!
//! | Rule | Escaped |
//! |------|---------|
//! | [`EncodingRule::Database`] | `/ \ . " $ NUL`, whitespace, `A-Z`, existing escapes |
//! | [`EncodingRule::Collection`] | `$ NUL /`, a leading `system.`, existing escapes |
//!
//! The name separator is syntactically an escape but is never decoded.
//!
//! Decode inverts encode on names without forbidden characters. A literal
//! `x` in front of an escape is not escaped itself, so `"x$"` and `"x0024"`
//! both encode to `xx0024`, exactly as names already stored spell them.

use crate::primitives::{
    ENCODED_NAME_SEPARATOR, ESCAPE_HEX_DIGITS, ESCAPE_MARKER, RESERVED_COLLECTION_PREFIX,
};
use serde::{Deserialize, Serialize};

/// Length of a bare escape sequence (`x` + hex digits).
const ESCAPE_LEN: usize = 1 + ESCAPE_HEX_DIGITS;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

// =============================================================================
// ENCODING RULE
// =============================================================================

/// Which storage-engine restrictions a name segment must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingRule {
    /// Database names: case-insensitive, many forbidden characters.
    Database,
    /// Collection names: case-sensitive, few forbidden characters and a
    /// reserved `system.` prefix.
    Collection,
}

impl EncodingRule {
    /// Whether `c` is replaced by an escape under this rule.
    #[must_use]
    pub fn escapes(self, c: char) -> bool {
        match self {
            Self::Database => {
                matches!(c, '/' | '\\' | '.' | '"' | '$' | '\0' | '\u{feff}')
                    || c.is_whitespace()
                    || c.is_ascii_uppercase()
            }
            // `/` breaks the store's dump/export tooling
            Self::Collection => matches!(c, '$' | '\0' | '/'),
        }
    }

    /// Rule name as used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Collection => "collection",
        }
    }
}

impl std::str::FromStr for EncodingRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "database" | "db" => Ok(Self::Database),
            "collection" => Ok(Self::Collection),
            other => Err(format!(
                "unknown encoding rule '{}' (expected 'database' or 'collection')",
                other
            )),
        }
    }
}

// =============================================================================
// SCANNER
// =============================================================================

/// One unit of encoder output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// Copied through unchanged.
    Literal(char),
    /// Replaced by `x` + 4 hex digits.
    Escape(char),
    /// An existing escape or reserved prefix; gains one leading marker.
    Prefixed(&'a str),
}

/// Whether `s` starts with `x` followed by four lowercase hex digits.
fn starts_with_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= ESCAPE_LEN
        && bytes[0] == ESCAPE_MARKER as u8
        && bytes[1..ESCAPE_LEN]
            .iter()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Whether `s` is exactly one escape sequence, e.g. `xffff`.
#[must_use]
pub fn is_escape_sequence(s: &str) -> bool {
    s.len() == ESCAPE_LEN && starts_with_escape(s)
}

/// Byte length of a leading `system.` behind at most `max_markers` escape
/// markers, if present.
fn reserved_prefix_len(s: &str, max_markers: usize) -> Option<usize> {
    let markers = s
        .bytes()
        .take(max_markers)
        .take_while(|&b| b == ESCAPE_MARKER as u8)
        .count();
    s[markers..]
        .starts_with(RESERVED_COLLECTION_PREFIX)
        .then_some(markers + RESERVED_COLLECTION_PREFIX.len())
}

fn tokenize(name: &str, rule: EncodingRule) -> Vec<Token<'_>> {
    let mut tokens = Vec::with_capacity(name.len());
    let mut rest = name;

    if rule == EncodingRule::Collection
        && let Some(len) = reserved_prefix_len(rest, 1)
    {
        let (prefix, tail) = rest.split_at(len);
        tokens.push(Token::Prefixed(prefix));
        rest = tail;
    }

    while let Some(c) = rest.chars().next() {
        if starts_with_escape(rest) {
            let (sequence, tail) = rest.split_at(ESCAPE_LEN);
            tokens.push(Token::Prefixed(sequence));
            rest = tail;
            continue;
        }
        tokens.push(if rule.escapes(c) {
            Token::Escape(c)
        } else {
            Token::Literal(c)
        });
        rest = &rest[c.len_utf8()..];
    }

    tokens
}

fn push_escape(out: &mut String, c: char) {
    let code = u32::from(c);
    out.push(ESCAPE_MARKER);
    for shift in (0..ESCAPE_HEX_DIGITS).rev() {
        out.push(HEX_DIGITS[((code >> (shift * 4)) & 0xf) as usize] as char);
    }
}

// =============================================================================
// NAME CODEC
// =============================================================================

/// Encoder/decoder bound to the reserved name separator.
///
/// Both directions are total: every input produces an output, and
/// `decode(encode(s)) == s` whenever `s` has no character the rule escapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCodec {
    separator: String,
}

impl Default for NameCodec {
    fn default() -> Self {
        Self::new(ENCODED_NAME_SEPARATOR)
    }
}

impl NameCodec {
    /// Create a codec that never decodes `separator`.
    #[must_use]
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// The reserved separator sequence.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Encode `name` under `rule`.
    #[must_use]
    pub fn encode(&self, name: &str, rule: EncodingRule) -> String {
        let mut encoded = String::with_capacity(name.len() + name.len() / 2);
        for token in tokenize(name, rule) {
            match token {
                Token::Literal(c) => encoded.push(c),
                Token::Escape(c) => push_escape(&mut encoded, c),
                Token::Prefixed(text) => {
                    encoded.push(ESCAPE_MARKER);
                    encoded.push_str(text);
                }
            }
        }
        encoded
    }

    /// Decode one level of escaping from `name` under `rule`.
    ///
    /// Only acts where an escape pattern matches; other text is copied.
    #[must_use]
    pub fn decode(&self, name: &str, rule: EncodingRule) -> String {
        let mut decoded = String::with_capacity(name.len());
        let mut rest = name;

        if rule == EncodingRule::Collection
            && rest.starts_with(ESCAPE_MARKER)
            && let Some(len) = reserved_prefix_len(rest, 2)
        {
            decoded.push_str(&rest[1..len]);
            rest = &rest[len..];
        }

        while let Some(c) = rest.chars().next() {
            if c == ESCAPE_MARKER && starts_with_escape(&rest[1..]) {
                // Doubled escape: drop one marker
                decoded.push_str(&rest[1..=ESCAPE_LEN]);
                rest = &rest[ESCAPE_LEN + 1..];
            } else if starts_with_escape(rest) {
                let (sequence, tail) = rest.split_at(ESCAPE_LEN);
                match self.unescape(sequence) {
                    Some(original) => decoded.push(original),
                    None => decoded.push_str(sequence),
                }
                rest = tail;
            } else {
                decoded.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }

        decoded
    }

    /// The character behind a bare escape, or `None` if it must stay as is.
    fn unescape(&self, sequence: &str) -> Option<char> {
        if sequence == self.separator {
            return None;
        }
        u32::from_str_radix(&sequence[1..], 16)
            .ok()
            .and_then(char::from_u32)
    }

    /// Encode a database name.
    #[must_use]
    pub fn encode_database_name(&self, name: &str) -> String {
        self.encode(name, EncodingRule::Database)
    }

    /// Decode a database name.
    #[must_use]
    pub fn decode_database_name(&self, name: &str) -> String {
        self.decode(name, EncodingRule::Database)
    }

    /// Encode a collection name segment.
    #[must_use]
    pub fn encode_collection_name(&self, name: &str) -> String {
        self.encode(name, EncodingRule::Collection)
    }

    /// Decode a collection name segment.
    #[must_use]
    pub fn decode_collection_name(&self, name: &str) -> String {
        self.decode(name, EncodingRule::Collection)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> NameCodec {
        NameCodec::default()
    }

    #[test]
    fn database_forbidden_characters_encoded() {
        let codec = codec();
        for (raw, encoded) in [
            ("/", "x002f"),
            ("\\", "x005c"),
            (".", "x002e"),
            (" ", "x0020"),
            ("\"", "x0022"),
            ("$", "x0024"),
            ("\0", "x0000"),
        ] {
            assert_eq!(codec.encode_database_name(raw), encoded);
            assert_eq!(codec.decode_database_name(encoded), raw);
        }
    }

    #[test]
    fn database_uppercase_folded() {
        let codec = codec();
        for c in 'A'..='Z' {
            let encoded = codec.encode_database_name(&c.to_string());
            assert_eq!(encoded, format!("x00{:x}", c as u32));
            assert_eq!(codec.decode_database_name(&encoded), c.to_string());
        }
        assert_eq!(codec.encode_database_name("Service"), "x0053ervice");
    }

    #[test]
    fn database_lowercase_and_punctuation_untouched() {
        let codec = codec();
        for raw in ["abcxyz", "_", "¿", "?", "¡", "!", "|", ",", "#"] {
            assert_eq!(codec.encode_database_name(raw), raw);
            assert_eq!(codec.decode_database_name(raw), raw);
        }
    }

    #[test]
    fn existing_escape_gains_one_marker() {
        let codec = codec();
        assert_eq!(codec.encode_database_name("x12ab"), "xx12ab");
        assert_eq!(codec.decode_database_name("xx12ab"), "x12ab");
        assert_eq!(codec.encode_collection_name("x12ab"), "xx12ab");
        assert_eq!(codec.decode_collection_name("xx12ab"), "x12ab");
    }

    #[test]
    fn uppercase_hex_is_not_an_escape() {
        let codec = codec();
        assert_eq!(codec.encode_database_name("x12AB"), "x12x0041x0042");
        assert_eq!(codec.decode_database_name("x12x0041x0042"), "x12AB");
        assert_eq!(codec.encode_collection_name("x12AB"), "x12AB");
    }

    #[test]
    fn mixed_database_name() {
        let codec = codec();
        let raw = "Service.Madrid#North\\$Alcobendas City";
        let encoded = "x0053ervicex002ex004dadrid#x004eorthx005cx0024x0041lcobendasx0020x0043ity";
        assert_eq!(codec.encode_database_name(raw), encoded);
        assert_eq!(codec.decode_database_name(encoded), raw);
    }

    #[test]
    fn separator_never_decoded() {
        let codec = codec();
        assert_eq!(codec.decode_database_name("xffff"), "xffff");
        assert_eq!(codec.decode_collection_name("xffff"), "xffff");
        assert_eq!(codec.decode_collection_name("ax0024xffffb"), "a$xffffb");
    }

    #[test]
    fn collection_forbidden_characters_encoded() {
        let codec = codec();
        assert_eq!(codec.encode_collection_name("$"), "x0024");
        assert_eq!(codec.encode_collection_name("\0"), "x0000");
        assert_eq!(codec.encode_collection_name("/"), "x002f");
        assert_eq!(codec.encode_collection_name("Room"), "Room");
        assert_eq!(codec.encode_collection_name("a.b c"), "a.b c");
    }

    #[test]
    fn reserved_prefix_escaped_at_start_only() {
        let codec = codec();
        assert_eq!(codec.encode_collection_name("system."), "xsystem.");
        assert_eq!(codec.encode_collection_name("xsystem."), "xxsystem.");
        assert_eq!(codec.decode_collection_name("xsystem."), "system.");
        assert_eq!(codec.decode_collection_name("xxsystem."), "xsystem.");
        assert_eq!(
            codec.encode_collection_name("the.system.collection"),
            "the.system.collection"
        );
        assert_eq!(
            codec.decode_collection_name("the.system.collection"),
            "the.system.collection"
        );
    }

    #[test]
    fn literal_marker_is_never_escaped() {
        let codec = codec();
        assert_eq!(codec.encode_collection_name("box"), "box");
        assert_eq!(codec.encode_collection_name("fax"), "fax");
        assert_eq!(codec.encode_database_name("linux"), "linux");
        assert_eq!(codec.encode_database_name("x$"), "xx0024");
        assert_eq!(codec.encode_database_name("xA"), "xx0041");
        assert_eq!(codec.encode_database_name("x0024"), "xx0024");
    }

    #[test]
    fn reserved_prefix_takes_one_marker() {
        let codec = codec();
        assert_eq!(codec.encode_collection_name("xxsystem.a"), "xxsystem.a");
        assert_eq!(codec.decode_collection_name("xxsystem.a"), "xsystem.a");
        assert_eq!(codec.decode_collection_name("xxxsystem.a"), "xxxsystem.a");
    }

    #[test]
    fn surrogate_escape_left_untouched() {
        assert_eq!(codec().decode_database_name("xd800"), "xd800");
    }

    #[test]
    fn rule_parses_from_cli_names() {
        assert_eq!(
            "database".parse::<EncodingRule>(),
            Ok(EncodingRule::Database)
        );
        assert_eq!(
            "collection".parse::<EncodingRule>(),
            Ok(EncodingRule::Collection)
        );
        assert!("table".parse::<EncodingRule>().is_err());
    }

    #[test]
    fn escape_sequence_detection() {
        assert!(is_escape_sequence("xffff"));
        assert!(!is_escape_sequence("xfff"));
        assert!(!is_escape_sequence("xFFFF"));
        assert!(!is_escape_sequence("xffff0"));
    }
}
