//! Locates the single CREATE statement a script defines

use std::sync::LazyLock;

use regex::Regex;

use super::identifier_utils::object_name_pattern;
use crate::model::{SqlObject, SqlObjectKind};

static CREATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+(PROCEDURE|PROC|TABLE|VIEW|FUNCTION|TRIGGER)\s+({})",
        object_name_pattern()
    ))
    .unwrap()
});

/// Find the first CREATE statement in cleaned text and return its object.
///
/// Only the first match counts. `ALTER` and `CREATE OR ALTER` are not
/// definitions.
pub fn locate_definition(cleaned: &str) -> Option<SqlObject> {
    let caps = CREATE_RE.captures(cleaned)?;
    let keyword = caps.get(1)?.as_str();
    let name = caps.get(2)?.as_str().trim();
    Some(SqlObject::new(name, kind_for_keyword(keyword)))
}

fn kind_for_keyword(keyword: &str) -> SqlObjectKind {
    match keyword.to_ascii_uppercase().as_str() {
        "PROCEDURE" | "PROC" => SqlObjectKind::StoredProcedure,
        "TABLE" => SqlObjectKind::Table,
        "VIEW" => SqlObjectKind::View,
        "FUNCTION" => SqlObjectKind::UserFunction,
        "TRIGGER" => SqlObjectKind::Trigger,
        other => unreachable!("CREATE_RE captured unsupported keyword {other}"),
    }
}
