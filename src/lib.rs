//! rust-sqlgraph: object dependency extraction for T-SQL scripts
//!
//! Each script is expected to define one database object with a CREATE
//! statement. The library finds that definition and every procedure,
//! function, and table the script references, producing a small
//! dependency-graph fragment per file.
//!
//! ```
//! use rust_sqlgraph::{parse_script, SqlObjectKind};
//!
//! let result = parse_script("CREATE PROCEDURE dbo.P AS EXEC dbo.Other").unwrap();
//! assert_eq!(result.definition.kind, SqlObjectKind::StoredProcedure);
//! assert_eq!(result.callee_names(), vec!["dbo.Other"]);
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod project;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;

pub use error::SqlGraphError;
pub use model::{InvocationEdge, ParsedResult, SqlObject, SqlObjectKind};
pub use parser::{parse_script, ScriptReport};
pub use report::OutputFormat;

/// Options for scanning SQL scripts
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// A single .sql file or a directory to walk
    pub input_path: PathBuf,
    /// Where to write the rendered report (stdout when `None`)
    pub output_path: Option<PathBuf>,
    /// Report format
    pub format: OutputFormat,
    /// Glob patterns for files to skip
    pub exclude: Vec<String>,
}

/// Results of a scan, one entry per file in path order
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub scripts: Vec<ScriptReport>,
}

impl ScanReport {
    /// Definitions found across all scripts
    pub fn definitions(&self) -> impl Iterator<Item = &SqlObject> {
        self.scripts
            .iter()
            .filter_map(|s| s.result.as_ref())
            .map(|r| &r.definition)
    }

    /// All edges across all scripts
    pub fn edges(&self) -> impl Iterator<Item = &InvocationEdge> {
        self.scripts
            .iter()
            .filter_map(|s| s.result.as_ref())
            .flat_map(|r| r.edges.iter())
    }

    /// Scripts with no recognized definition
    pub fn unresolved(&self) -> impl Iterator<Item = &ScriptReport> {
        self.scripts.iter().filter(|s| s.result.is_none())
    }
}

/// Scan SQL scripts and write the rendered report
pub fn scan(options: &ScanOptions) -> Result<ScanReport> {
    tracing::debug!("Scanning {}", options.input_path.display());

    // Step 1: Find the scripts
    let files = project::discover_sql_files(&options.input_path, &options.exclude)?;
    tracing::info!("Found {} SQL files", files.len());

    // Step 2: Parse them
    let report = ScanReport {
        scripts: parser::parse_sql_files(&files)?,
    };
    tracing::info!(
        "Found {} definitions and {} edges ({} files without a definition)",
        report.definitions().count(),
        report.edges().count(),
        report.unresolved().count()
    );

    // Step 3: Render and write
    let rendered = report::render(&report.scripts, options.format)?;
    match &options.output_path {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| SqlGraphError::OutputWriteError {
                path: path.clone(),
                source: e,
            })?;
            tracing::info!("Wrote report: {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(report)
}
