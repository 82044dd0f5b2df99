//! Script parsing pipeline
//!
//! Raw text is cleaned once, the definition and noise names are found,
//! every extractor runs over the same cleaned text, and the union of their
//! candidates is deduplicated into the final edge list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use rayon::prelude::*;

use super::definition_parser::locate_definition;
use super::identifier_utils::{canonical_key, same_object};
use super::noise_names::NoiseNames;
use super::paren_scanner::using_subquery_spans;
use super::preprocess_parser::preprocess;
use super::reference_extractor::{
    extract_delete_targets, extract_insert_targets, extract_merge_sources, extract_merge_targets,
    extract_procedure_calls, extract_query_sources, extract_scalar_calls,
    extract_table_valued_calls, extract_update_targets, ExtractionContext, TvfNames,
};
use crate::model::{InvocationEdge, ParsedResult, SqlObject, SqlObjectKind};
use crate::project::read_sql_file;

/// Parse one script into its definition and outgoing edges.
///
/// Returns `None` when the script has no recognized CREATE statement,
/// which is a normal outcome for pure scripts and `ALTER` scripts.
pub fn parse_script(sql: &str) -> Option<ParsedResult> {
    let cleaned = preprocess(sql);
    let definition = locate_definition(&cleaned)?;

    let noise = NoiseNames::collect(&cleaned);
    let merge_spans = using_subquery_spans(&cleaned);
    let ctx = ExtractionContext {
        text: &cleaned,
        definition: &definition,
        noise: &noise,
        merge_spans: &merge_spans,
    };

    // Table-valued calls first: the scalar and table extractors consult them
    let mut tvfs = TvfNames::default();
    let table_valued = extract_table_valued_calls(&ctx, &mut tvfs);

    let candidates = [
        extract_procedure_calls(&ctx),
        table_valued,
        extract_scalar_calls(&ctx, &tvfs),
        extract_query_sources(&ctx, &tvfs),
        extract_insert_targets(&ctx),
        extract_update_targets(&ctx),
        extract_delete_targets(&ctx),
        extract_merge_targets(&ctx),
        extract_merge_sources(&ctx, &tvfs),
    ];

    let mut edges = EdgeCollector::new(&definition);
    let mut candidate_count = 0;
    for callee in candidates.into_iter().flatten() {
        candidate_count += 1;
        edges.push(callee);
    }

    tracing::debug!(
        definition = %definition,
        noise_names = noise.len(),
        table_valued = tvfs.len(),
        candidates = candidate_count,
        edges = edges.len(),
        "parsed script"
    );

    Some(ParsedResult {
        edges: edges.into_edges(),
        definition,
    })
}

/// Accumulates edges from one caller, dropping self-references and
/// duplicates. The first spelling seen for a callee is the one kept.
#[derive(Debug)]
pub struct EdgeCollector<'a> {
    caller: &'a SqlObject,
    seen: HashSet<(String, SqlObjectKind, String)>,
    edges: Vec<InvocationEdge>,
}

impl<'a> EdgeCollector<'a> {
    pub fn new(caller: &'a SqlObject) -> Self {
        Self {
            caller,
            seen: HashSet::new(),
            edges: Vec::new(),
        }
    }

    /// Add an edge to `callee`; returns whether it was kept
    pub fn push(&mut self, callee: SqlObject) -> bool {
        if same_object(&callee.name, &self.caller.name) {
            return false;
        }
        let key = (
            canonical_key(&self.caller.name),
            callee.kind,
            canonical_key(&callee.name),
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.edges.push(InvocationEdge {
            caller: self.caller.clone(),
            callee,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn into_edges(self) -> Vec<InvocationEdge> {
        self.edges
    }
}

/// Parse outcome for one file
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptReport {
    pub path: PathBuf,
    pub result: Option<ParsedResult>,
}

/// Minimum number of files to benefit from parallel processing.
/// Below this threshold, sequential processing is faster due to rayon overhead.
const PARALLEL_THRESHOLD: usize = 8;

/// Parse a single SQL file
pub fn parse_sql_file(path: &Path) -> Result<ScriptReport> {
    let content = read_sql_file(path)?;
    let result = parse_script(&content);
    if result.is_none() {
        tracing::warn!("No CREATE statement found in {}", path.display());
    }
    Ok(ScriptReport {
        path: path.to_path_buf(),
        result,
    })
}

/// Parse multiple SQL files, using parallel processing for larger file sets.
///
/// Reports come back in the same order as `files`.
pub fn parse_sql_files(files: &[PathBuf]) -> Result<Vec<ScriptReport>> {
    if files.len() >= PARALLEL_THRESHOLD {
        // Each parse is independent; collect propagates the first error
        files.par_iter().map(|file| parse_sql_file(file)).collect()
    } else {
        // Sequential processing for small sets (avoids rayon overhead)
        files.iter().map(|file| parse_sql_file(file)).collect()
    }
}
