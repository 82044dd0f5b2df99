//! Lexical preprocessing for reference extraction
//!
//! Produces the cleaned text every later stage scans. Passes run in a fixed
//! order, each over the previous pass's output:
//!
//! 1. Block comments `/* ... */` (non-greedy, spanning lines)
//! 2. Line comments `-- ...` up to the end of the line
//! 3. Single-quoted string literals, including doubled-quote escapes
//! 4. Parameter lists of parameterized data types (`DECIMAL(10,2)` -> `DECIMAL`)
//! 5. Column lists after `INSERT INTO <target>` and after
//!    `WHEN [NOT] MATCHED [BY TARGET|SOURCE] THEN INSERT`
//!
//! Block comments become a single space so that removing one never joins
//! the tokens on either side of it.

use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::object_name_pattern;

static BLOCK_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--[^\r\n]*").unwrap());

static STRING_LITERAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").unwrap());

static TYPE_PARAMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(NVARCHAR|VARCHAR|NCHAR|CHAR|VARBINARY|BINARY|DECIMAL|NUMERIC|FLOAT|DATETIME2|DATETIMEOFFSET|TIME)\s*\([^()]*\)",
    )
    .unwrap()
});

static INSERT_COLUMNS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(INSERT\s+INTO\s+{})\s*\([^()]*\)",
        object_name_pattern()
    ))
    .unwrap()
});

static MERGE_INSERT_COLUMNS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(WHEN\s+(?:NOT\s+)?MATCHED(?:\s+BY\s+(?:TARGET|SOURCE))?\s+THEN\s+INSERT)\s*\([^()]*\)",
    )
    .unwrap()
});

/// Strip comments and string literals, and neutralize type parameter and
/// column lists so none of them can be mistaken for references.
pub fn preprocess(sql: &str) -> String {
    let text = BLOCK_COMMENT_RE.replace_all(sql, " ");
    let text = LINE_COMMENT_RE.replace_all(&text, "");
    let text = STRING_LITERAL_RE.replace_all(&text, "");
    let text = TYPE_PARAMS_RE.replace_all(&text, "${1}");
    let text = INSERT_COLUMNS_RE.replace_all(&text, "${1}");
    let text = MERGE_INSERT_COLUMNS_RE.replace_all(&text, "${1}");
    text.into_owned()
}
