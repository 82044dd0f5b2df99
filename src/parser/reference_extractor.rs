//! Reference extractors over cleaned script text.
//!
//! Each extractor is an independent recognizer for one statement shape and
//! returns the callee objects it found, already filtered against the
//! script's own definition and its noise names. The only ordering
//! dependency is [`TvfNames`]: the table-valued extractor fills it, and the
//! scalar and table extractors read it so one invocation is never reported
//! under two kinds.
//!
//! | Shape | Kind |
//! |---|---|
//! | `EXEC name` (no `(`) | StoredProcedure |
//! | `FROM name(` / `JOIN name(` / `APPLY name(` | UserFunction |
//! | `name(` elsewhere | UserFunction |
//! | `FROM name` / `JOIN name` | Table |
//! | `INSERT INTO name`, `UPDATE schema.name`, `DELETE FROM name` | Table |
//! | `MERGE name`, `USING name`, `USING (... FROM name ...)` | Table |

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::{
    canonical_key, object_name_pattern, same_object, FROM_JOIN_TARGET_RE, IDENT_PART,
};
use super::noise_names::NoiseNames;
use super::paren_scanner::{in_any_span, next_significant_char, preceding_word};
use crate::model::{SqlObject, SqlObjectKind};

static EXEC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bEXEC(?:UTE)?\s+(?:@\w+\s*=\s*)?({})",
        object_name_pattern()
    ))
    .unwrap()
});

static TVF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:FROM|JOIN|APPLY)\s+({})\s*\(",
        object_name_pattern()
    ))
    .unwrap()
});

static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({})\s*\(", object_name_pattern())).unwrap());

static INSERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bINSERT\s+INTO\s+({})", object_name_pattern())).unwrap()
});

static UPDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bUPDATE\s+({IDENT_PART}\s*\.\s*{IDENT_PART}(?:\s*\.\s*{IDENT_PART})*)"
    ))
    .unwrap()
});

static DELETE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bDELETE\s+FROM\s+({})", object_name_pattern())).unwrap()
});

static MERGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bMERGE\s+(?:INTO\s+)?({})",
        object_name_pattern()
    ))
    .unwrap()
});

static USING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bUSING\s+({})", object_name_pattern())).unwrap()
});

/// `INDEX <name> ON` ending at the end of the haystack
static INDEX_ON_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\bINDEX\s+{IDENT_PART}\s+ON\s*$")).unwrap());

/// Keywords that are followed by `(` but are never calls
const CALL_LIKE_KEYWORDS: &[&str] = &[
    "ALL", "AND", "ANY", "APPLY", "AS", "BEGIN", "BY", "CASE", "CHECK", "CLUSTERED", "CONSTRAINT",
    "CONTAINS", "CURSOR", "DECLARE", "DEFAULT", "DELETE", "ELSE", "END", "EXEC", "EXECUTE",
    "EXISTS", "FOREIGN", "FREETEXT", "FROM", "GROUP", "IDENTITY", "IF", "IN", "INCLUDE", "INDEX",
    "INSERT", "INTO", "JOIN", "KEY", "MERGE", "NONCLUSTERED", "NOT", "ON", "OPTION", "OR", "OUTPUT",
    "OVER", "PARTITION", "PIVOT", "PRIMARY", "PRINT", "REFERENCES", "RETURN", "RETURNS", "SELECT",
    "SET", "SOME", "TABLE", "THEN", "TOP", "UNION", "UNIQUE", "UNPIVOT", "UPDATE", "USING",
    "VALUES", "WHEN", "WHERE", "WHILE", "WITH",
];

/// Built-in functions that are never reported as user functions
const BUILTIN_FUNCTIONS: &[&str] = &[
    "ABS", "AVG", "CAST", "CEILING", "CHARINDEX", "CHECKSUM", "CHOOSE", "COALESCE", "CONCAT",
    "CONVERT", "COUNT", "COUNT_BIG", "DATALENGTH", "DATEADD", "DATEDIFF", "DATENAME", "DATEPART",
    "DAY", "DB_NAME", "DENSE_RANK", "EOMONTH", "ERROR_LINE", "ERROR_MESSAGE", "ERROR_NUMBER",
    "ERROR_PROCEDURE", "ERROR_SEVERITY", "ERROR_STATE", "FLOOR", "FORMAT", "GETDATE",
    "GETUTCDATE", "HASHBYTES", "IIF", "ISJSON", "ISNULL", "JSON_QUERY", "JSON_VALUE", "LAG",
    "LEAD", "LEFT", "LEN", "LOWER", "LTRIM", "MAX", "MIN", "MONTH", "NEWID", "NEWSEQUENTIALID",
    "NTILE", "NULLIF", "OBJECT_ID", "OPENJSON", "OPENQUERY", "OPENROWSET", "OPENXML", "PATINDEX",
    "POWER", "QUOTENAME", "RAISERROR", "RANK", "REPLACE", "REPLICATE", "REVERSE", "RIGHT",
    "ROUND", "ROW_NUMBER", "RTRIM", "SCOPE_IDENTITY", "SIGN", "SPACE", "SQRT", "STRING_AGG",
    "STRING_SPLIT", "STUFF", "SUBSTRING", "SUM", "SUSER_SNAME", "SYSDATETIME", "TRIM",
    "TRY_CAST", "TRY_CONVERT", "UPPER", "USER_NAME", "XACT_STATE", "YEAR",
];

/// XML data type methods invoked as `column.method(`
const XML_METHODS: &[&str] = &["exist", "modify", "nodes", "query", "value"];

/// Words that, directly before `name(`, mean the parentheses are not a call
/// argument list (table-valued sites, column definitions, FK column lists).
/// `ON` only counts after `INDEX <name>`; see [`is_index_column_list`].
const NON_CALL_PREFIXES: &[&str] = &["APPLY", "FROM", "INTO", "JOIN", "REFERENCES", "TABLE"];

fn contains_ci(list: &[&str], word: &str) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

/// Single-part names on the keyword or built-in lists
fn is_ignored_call(name: &str) -> bool {
    if name.contains('.') {
        return false;
    }
    contains_ci(CALL_LIKE_KEYWORDS, name) || contains_ci(BUILTIN_FUNCTIONS, name)
}

/// Single-part names on the keyword list (`EXECUTE AS`, `EXEC AS USER`)
fn is_keyword(name: &str) -> bool {
    !name.contains('.') && contains_ci(CALL_LIKE_KEYWORDS, name)
}

fn is_xml_method_call(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, method)) => contains_ci(XML_METHODS, method.trim()),
        None => false,
    }
}

/// Whether the character before `offset` continues an identifier, meaning
/// the regex matched the tail of a variable, temp table, or longer path.
fn continues_identifier(text: &str, offset: usize) -> bool {
    text[..offset]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$' | '.' | ']' | '"'))
}

/// Whether the name starting at `offset` is the table of `CREATE INDEX ix ON name (cols)`
fn is_index_column_list(text: &str, offset: usize) -> bool {
    preceding_word(text, offset).is_some_and(|w| w.eq_ignore_ascii_case("ON"))
        && INDEX_ON_TAIL_RE.is_match(&text[..offset])
}

/// Whether the identifier ending at `offset` is followed by `(`
fn followed_by_paren(text: &str, offset: usize) -> bool {
    next_significant_char(text, offset) == Some('(')
}

/// Names already classified as table-valued functions. Append-only.
#[derive(Debug, Clone, Default)]
pub struct TvfNames {
    keys: HashSet<String>,
}

impl TvfNames {
    fn insert(&mut self, name: &str) {
        self.keys.insert(canonical_key(name));
    }

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

/// Read-only inputs shared by all extractors for one script
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    /// Preprocessed script text
    pub text: &'a str,
    /// The script's own definition
    pub definition: &'a SqlObject,
    pub noise: &'a NoiseNames,
    /// `USING ( ... )` groups owned by the MERGE subquery extractor
    pub merge_spans: &'a [Range<usize>],
}

impl ExtractionContext<'_> {
    /// Self-reference and noise filter applied to every candidate
    pub fn admits(&self, name: &str) -> bool {
        !same_object(name, &self.definition.name) && !self.noise.contains(name)
    }

    fn candidate(&self, name: &str, kind: SqlObjectKind) -> Option<SqlObject> {
        self.admits(name).then(|| SqlObject::new(name, kind))
    }
}

/// `EXEC name` / `EXECUTE name`, including `EXEC @rc = name`.
/// The `EXECUTE AS` security clause is not a call.
pub fn extract_procedure_calls(ctx: &ExtractionContext) -> Vec<SqlObject> {
    EXEC_RE
        .captures_iter(ctx.text)
        .filter_map(|caps| caps.get(1))
        .filter(|m| !is_keyword(m.as_str()) && !followed_by_paren(ctx.text, m.end()))
        .filter_map(|m| ctx.candidate(m.as_str(), SqlObjectKind::StoredProcedure))
        .collect()
}

/// `FROM name(`, `JOIN name(`, `APPLY name(`; records every name in `tvfs`
pub fn extract_table_valued_calls(ctx: &ExtractionContext, tvfs: &mut TvfNames) -> Vec<SqlObject> {
    let mut found = Vec::new();
    for caps in TVF_RE.captures_iter(ctx.text) {
        let Some(m) = caps.get(1) else {
            continue;
        };
        let name = m.as_str();
        if is_ignored_call(name) {
            continue;
        }
        tvfs.insert(name);
        found.extend(ctx.candidate(name, SqlObjectKind::UserFunction));
    }
    found
}

/// `name(` anywhere a table-valued call cannot be
pub fn extract_scalar_calls(ctx: &ExtractionContext, tvfs: &TvfNames) -> Vec<SqlObject> {
    let mut found = Vec::new();
    for caps in CALL_RE.captures_iter(ctx.text) {
        let Some(m) = caps.get(1) else {
            continue;
        };
        let name = m.as_str();

        if continues_identifier(ctx.text, m.start()) {
            continue;
        }
        if preceding_word(ctx.text, m.start()).is_some_and(|w| contains_ci(NON_CALL_PREFIXES, w))
            || is_index_column_list(ctx.text, m.start())
        {
            continue;
        }
        if is_ignored_call(name) || is_xml_method_call(name) || tvfs.contains(name) {
            continue;
        }
        found.extend(ctx.candidate(name, SqlObjectKind::UserFunction));
    }
    found
}

/// `FROM name` / `JOIN name` outside MERGE source subqueries
pub fn extract_query_sources(ctx: &ExtractionContext, tvfs: &TvfNames) -> Vec<SqlObject> {
    FROM_JOIN_TARGET_RE
        .captures_iter(ctx.text)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?)))
        .filter(|(start, _)| !in_any_span(ctx.merge_spans, *start))
        .filter(|(_, m)| !followed_by_paren(ctx.text, m.end()) && !tvfs.contains(m.as_str()))
        .filter_map(|(_, m)| ctx.candidate(m.as_str(), SqlObjectKind::Table))
        .collect()
}

/// `INSERT INTO name`
pub fn extract_insert_targets(ctx: &ExtractionContext) -> Vec<SqlObject> {
    tables_matching(ctx, &INSERT_RE)
}

/// `UPDATE schema.name`. Single-part targets are usually aliases and are
/// left to the `FROM`/`JOIN` extractor.
pub fn extract_update_targets(ctx: &ExtractionContext) -> Vec<SqlObject> {
    tables_matching(ctx, &UPDATE_RE)
}

/// `DELETE FROM name`
pub fn extract_delete_targets(ctx: &ExtractionContext) -> Vec<SqlObject> {
    tables_matching(ctx, &DELETE_RE)
}

/// `MERGE [INTO] name`
pub fn extract_merge_targets(ctx: &ExtractionContext) -> Vec<SqlObject> {
    tables_matching(ctx, &MERGE_RE)
}

/// MERGE sources: `USING name` directly, or every `FROM`/`JOIN` table inside
/// a `USING ( ... )` subquery.
pub fn extract_merge_sources(ctx: &ExtractionContext, tvfs: &TvfNames) -> Vec<SqlObject> {
    let Some(first_merge) = MERGE_RE.find(ctx.text).map(|m| m.start()) else {
        return Vec::new();
    };

    let mut found: Vec<SqlObject> = USING_RE
        .captures_iter(ctx.text)
        .filter_map(|caps| caps.get(1))
        .filter(|m| m.start() > first_merge && !followed_by_paren(ctx.text, m.end()))
        .filter_map(|m| ctx.candidate(m.as_str(), SqlObjectKind::Table))
        .collect();

    for span in ctx.merge_spans {
        let subquery = &ctx.text[span.clone()];
        for caps in FROM_JOIN_TARGET_RE.captures_iter(subquery) {
            let Some(m) = caps.get(1) else {
                continue;
            };
            if followed_by_paren(subquery, m.end()) || tvfs.contains(m.as_str()) {
                continue;
            }
            found.extend(ctx.candidate(m.as_str(), SqlObjectKind::Table));
        }
    }

    found
}

fn tables_matching(ctx: &ExtractionContext, re: &Regex) -> Vec<SqlObject> {
    re.captures_iter(ctx.text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| ctx.candidate(m.as_str(), SqlObjectKind::Table))
        .collect()
}
