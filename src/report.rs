//! Rendering of scan results as text or JSON

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::error::SqlGraphError;
use crate::model::{InvocationEdge, SqlObject};
use crate::parser::ScriptReport;

/// Output format for scan results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `caller [Kind] -> callee [Kind]` line per edge
    #[default]
    Text,
    /// Pretty-printed JSON array, one entry per file
    Json,
}

#[derive(Serialize)]
struct JsonScript<'a> {
    file: &'a Path,
    definition: Option<&'a SqlObject>,
    edges: &'a [InvocationEdge],
}

/// Render reports in the requested format
pub fn render(scripts: &[ScriptReport], format: OutputFormat) -> Result<String, SqlGraphError> {
    match format {
        OutputFormat::Text => Ok(render_text(scripts)),
        OutputFormat::Json => render_json(scripts),
    }
}

/// Plain edge listing grouped by file
pub fn render_text(scripts: &[ScriptReport]) -> String {
    let mut out = String::new();
    for script in scripts {
        match &script.result {
            Some(result) => {
                let _ = writeln!(out, "-- {}", script.path.display());
                if result.edges.is_empty() {
                    let _ = writeln!(out, "{}", result.definition);
                }
                for edge in &result.edges {
                    let _ = writeln!(out, "{} -> {}", edge.caller, edge.callee);
                }
            }
            None => {
                let _ = writeln!(out, "-- {}: no definition", script.path.display());
            }
        }
    }
    out
}

/// JSON array of `{ file, definition, edges }`
pub fn render_json(scripts: &[ScriptReport]) -> Result<String, SqlGraphError> {
    let entries: Vec<JsonScript> = scripts
        .iter()
        .map(|script| JsonScript {
            file: &script.path,
            definition: script.result.as_ref().map(|r| &r.definition),
            edges: script
                .result
                .as_ref()
                .map(|r| r.edges.as_slice())
                .unwrap_or_default(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}
