//! Object and edge types produced by script parsing

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::SqlGraphError;

/// Kind of database object a node or edge endpoint refers to.
///
/// Scalar and table-valued functions both map to `UserFunction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SqlObjectKind {
    Table,
    View,
    StoredProcedure,
    Trigger,
    UserFunction,
}

impl SqlObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlObjectKind::Table => "Table",
            SqlObjectKind::View => "View",
            SqlObjectKind::StoredProcedure => "StoredProcedure",
            SqlObjectKind::Trigger => "Trigger",
            SqlObjectKind::UserFunction => "UserFunction",
        }
    }
}

impl fmt::Display for SqlObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlObjectKind {
    type Err = SqlGraphError;

    /// Accepts both the kind names (`StoredProcedure`) and the CREATE
    /// keywords (`PROCEDURE`, `PROC`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TABLE" => Ok(SqlObjectKind::Table),
            "VIEW" => Ok(SqlObjectKind::View),
            "PROCEDURE" | "PROC" | "STOREDPROCEDURE" => Ok(SqlObjectKind::StoredProcedure),
            "TRIGGER" => Ok(SqlObjectKind::Trigger),
            "FUNCTION" | "USERFUNCTION" => Ok(SqlObjectKind::UserFunction),
            _ => Err(SqlGraphError::UnknownObjectKind {
                keyword: s.to_string(),
            }),
        }
    }
}

/// A named database object. `name` keeps the spelling found in the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlObject {
    pub name: String,
    pub kind: SqlObjectKind,
}

impl SqlObject {
    pub fn new(name: impl Into<String>, kind: SqlObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for SqlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.kind)
    }
}

/// Directed reference from the script's definition to another object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationEdge {
    pub caller: SqlObject,
    pub callee: SqlObject,
}

/// Outcome of parsing one script: its definition plus deduplicated edges
/// in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedResult {
    pub definition: SqlObject,
    pub edges: Vec<InvocationEdge>,
}

impl ParsedResult {
    /// Callee objects of the given kind, in edge order
    pub fn callees_of_kind(&self, kind: SqlObjectKind) -> Vec<&SqlObject> {
        self.edges
            .iter()
            .map(|e| &e.callee)
            .filter(|c| c.kind == kind)
            .collect()
    }

    /// Callee names, in edge order
    pub fn callee_names(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.callee.name.as_str()).collect()
    }
}
