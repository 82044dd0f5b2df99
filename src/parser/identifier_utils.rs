//! Identifier canonicalization for T-SQL object names.
//!
//! Every "is this the same object?" decision in the parser goes through
//! [`canonical_key`]. Names are split on `.`, each part loses one layer of
//! `[...]` or `"..."` delimiters, and comparison ignores case.
//!
//! # Examples
//!
//! ```
//! use rust_sqlgraph::parser::{canonicalize, same_object};
//!
//! assert_eq!(canonicalize("[dbo].[Orders]"), "dbo.Orders");
//! assert_eq!(canonicalize("\"dbo\".\"Orders\""), "dbo.Orders");
//! assert!(same_object("[dbo].[Orders]", "DBO.orders"));
//! assert!(!same_object("Orders", "dbo.Orders"));
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Regex fragment for a single identifier part: bracketed, double-quoted,
/// or bare. Bare parts cannot start with `@` or `#`, so table variables
/// and temp tables never match.
pub(crate) const IDENT_PART: &str = r#"(?:\[[^\]\r\n]+\]|"[^"\r\n]+"|[A-Za-z_][\w$]*)"#;

/// Regex fragment for a dotted identifier path of one or more parts
pub(crate) fn object_name_pattern() -> String {
    format!(r"{IDENT_PART}(?:\s*\.\s*{IDENT_PART})*")
}

/// `FROM <name>` / `JOIN <name>`; group 1 is the name. The match ends at the
/// name so scanning resumes right after it.
pub(crate) static FROM_JOIN_TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(?:FROM|JOIN)\s+({})", object_name_pattern())).unwrap()
});

/// Strips one layer of brackets `[]` or double quotes `""` from an identifier part.
///
/// Delimiters are only removed when present on both ends. Whitespace is
/// trimmed around the delimiters, never inside them.
pub fn normalize_identifier(ident: &str) -> &str {
    let trimmed = ident.trim();
    let delimited = trimmed.len() >= 2
        && ((trimmed.starts_with('[') && trimmed.ends_with(']'))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')));
    if delimited {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

/// Canonical spelling of a (possibly multi-part) object name.
///
/// Empty parts are dropped, so whitespace-only input yields an empty string.
/// Casing is preserved; use [`canonical_key`] for comparisons.
pub fn canonicalize(raw: &str) -> String {
    raw.split('.')
        .map(normalize_identifier)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Case-folded canonical name, used as the identity key in sets and maps
pub fn canonical_key(raw: &str) -> String {
    canonicalize(raw).to_lowercase()
}

/// Whether two raw names refer to the same logical object
pub fn same_object(a: &str, b: &str) -> bool {
    canonical_key(a) == canonical_key(b)
}
