//! Collection of structural names that are never object references.
//!
//! A grammar-free scanner cannot tell `FROM cte` or `JOIN o` apart from a
//! real table reference, so the labels a script introduces are gathered up
//! front and every candidate reference is checked against them:
//!
//! - CTE names (`WITH a AS (...), b AS (...)`)
//! - Derived-table aliases (`FROM ( ... ) AS x`, also after `JOIN`/`APPLY`)
//!   and pivot aliases (`PIVOT ( ... ) AS p`)
//! - Correlation aliases (`FROM dbo.Orders o`, `JOIN dbo.Lines AS l`)
//! - Projection qualifiers (`SELECT o.Id` -> `o`)
//! - Cursor names (`DECLARE c CURSOR`, later read by `FETCH NEXT FROM c`)
//!
//! The trigger pseudo-tables `inserted` and `deleted` are always noise.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::{canonical_key, same_object, FROM_JOIN_TARGET_RE, IDENT_PART};
use super::paren_scanner::{find_matching_paren, next_significant_char};

static CTE_HEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bWITH\s+({IDENT_PART})(?:\s*\([^()]*\)\s*|\s+)AS\s*\("
    ))
    .unwrap()
});

static CTE_NEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*,\s*({IDENT_PART})(?:\s*\([^()]*\)\s*|\s+)AS\s*\("
    ))
    .unwrap()
});

static DERIVED_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:FROM|JOIN|APPLY|PIVOT|UNPIVOT)\s*\(").unwrap());

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^\s*(?:AS\s+)?({IDENT_PART})")).unwrap());

static CURSOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bDECLARE\s+({IDENT_PART})\s+(?:INSENSITIVE\s+|SCROLL\s+)*CURSOR\b"
    ))
    .unwrap()
});

static SELECT_LIST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bSELECT\b(.*?)\bFROM\b").unwrap());

static QUALIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({IDENT_PART})\s*\.")).unwrap());

/// Trigger pseudo-tables
const PSEUDO_TABLES: &[&str] = &["inserted", "deleted"];

/// Words that can follow a table or derived table where an alias would go
const ALIAS_STOP_WORDS: &[&str] = &[
    "AND", "APPLY", "AS", "BEGIN", "BREAK", "CLOSE", "COMMIT", "CONTINUE", "CROSS", "DEALLOCATE",
    "DECLARE", "DELETE", "ELSE", "END", "EXCEPT", "EXEC", "EXECUTE", "FETCH", "FOR", "FROM",
    "FULL", "GO", "GROUP", "HAVING", "IF", "INNER", "INSERT", "INTERSECT", "INTO", "JOIN", "LEFT",
    "MERGE", "ON", "OPEN", "OPTION", "OR", "ORDER", "OUTER", "OUTPUT", "PIVOT", "PRINT",
    "RAISERROR", "RETURN", "RIGHT", "ROLLBACK", "SELECT", "SET", "TABLESAMPLE", "THEN", "THROW",
    "TRUNCATE", "UNION", "UNPIVOT", "UPDATE", "USING", "VALUES", "WAITFOR", "WHEN", "WHERE",
    "WHILE", "WITH",
];

fn is_alias_stop_word(word: &str) -> bool {
    ALIAS_STOP_WORDS
        .iter()
        .any(|stop| stop.eq_ignore_ascii_case(word))
}

/// Names collected from one script that must never become edges
#[derive(Debug, Clone, Default)]
pub struct NoiseNames {
    pub cte_names: Vec<String>,
    pub derived_aliases: Vec<String>,
    pub correlation_aliases: Vec<String>,
    pub qualifiers: Vec<String>,
    pub cursor_names: Vec<String>,
    keys: HashSet<String>,
}

impl NoiseNames {
    /// Collect all noise names from cleaned text
    pub fn collect(cleaned: &str) -> Self {
        let table_keys: HashSet<String> = FROM_JOIN_TARGET_RE
            .captures_iter(cleaned)
            .filter_map(|caps| caps.get(1))
            .map(|m| canonical_key(m.as_str()))
            .collect();

        let mut noise = Self {
            cte_names: collect_cte_names(cleaned),
            derived_aliases: collect_derived_aliases(cleaned),
            correlation_aliases: collect_correlation_aliases(cleaned),
            // A table spelled out as its own qualifier (`Orders.Id`) is still a table
            qualifiers: collect_qualifiers(cleaned)
                .into_iter()
                .filter(|q| !table_keys.contains(&canonical_key(q)))
                .collect(),
            cursor_names: CURSOR_RE
                .captures_iter(cleaned)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
            keys: HashSet::new(),
        };

        let keys = noise
            .cte_names
            .iter()
            .chain(&noise.derived_aliases)
            .chain(&noise.correlation_aliases)
            .chain(&noise.qualifiers)
            .chain(&noise.cursor_names)
            .map(|name| canonical_key(name))
            .chain(PSEUDO_TABLES.iter().map(|t| t.to_string()))
            .collect();
        noise.keys = keys;
        noise
    }

    /// Whether `name` canonically matches a collected noise name
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&canonical_key(name))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn collect_cte_names(text: &str) -> Vec<String> {
    let mut names = Vec::new();

    for caps in CTE_HEAD_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        names.push(name.as_str().to_string());

        // Walk the comma-separated siblings at the same nesting level
        let mut open = whole.end() - 1;
        while let Some(close) = find_matching_paren(text, open) {
            let rest = &text[close + 1..];
            let Some(next) = CTE_NEXT_RE.captures(rest) else {
                break;
            };
            let (Some(next_whole), Some(next_name)) = (next.get(0), next.get(1)) else {
                break;
            };
            names.push(next_name.as_str().to_string());
            open = close + 1 + next_whole.end() - 1;
        }
    }

    names
}

fn collect_derived_aliases(text: &str) -> Vec<String> {
    DERIVED_OPEN_RE
        .find_iter(text)
        .filter_map(|m| find_matching_paren(text, m.end() - 1))
        .filter_map(|close| alias_at(text, close + 1))
        .map(str::to_string)
        .collect()
}

fn collect_correlation_aliases(text: &str) -> Vec<String> {
    let mut aliases = Vec::new();

    for caps in FROM_JOIN_TARGET_RE.captures_iter(text) {
        let Some(target) = caps.get(1) else {
            continue;
        };

        // Skip a table-valued call's argument list: `FROM dbo.fn(@x) f`
        let mut after = target.end();
        if next_significant_char(text, after) == Some('(') {
            let open = after + text[after..].find('(').unwrap_or(0);
            match find_matching_paren(text, open) {
                Some(close) => after = close + 1,
                None => continue,
            }
        }

        if let Some(alias) = alias_at(text, after) {
            if !same_object(alias, target.as_str()) {
                aliases.push(alias.to_string());
            }
        }
    }

    aliases
}

fn collect_qualifiers(text: &str) -> Vec<String> {
    let mut qualifiers = Vec::new();
    for select in SELECT_LIST_RE.captures_iter(text) {
        let Some(list) = select.get(1) else {
            continue;
        };
        for caps in QUALIFIER_RE.captures_iter(list.as_str()) {
            if let Some(q) = caps.get(1) {
                if !qualifiers.iter().any(|seen: &String| same_object(seen, q.as_str())) {
                    qualifiers.push(q.as_str().to_string());
                }
            }
        }
    }
    qualifiers
}

/// Alias token starting at `offset`, optionally introduced by `AS`
fn alias_at(text: &str, offset: usize) -> Option<&str> {
    let caps = ALIAS_RE.captures(text.get(offset..)?)?;
    let alias = caps.get(1)?.as_str();
    if is_alias_stop_word(alias) {
        None
    } else {
        Some(alias)
    }
}
