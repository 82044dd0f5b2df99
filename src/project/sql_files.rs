//! SQL file discovery and decoding

use std::path::{Path, PathBuf};

use anyhow::Result;
use encoding_rs::WINDOWS_1252;

use crate::error::SqlGraphError;

/// Read a SQL file as text.
///
/// Tries UTF-8 first (stripping a BOM), then falls back to Windows-1252,
/// which is common for scripts saved by SQL Server tooling.
pub fn read_sql_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| SqlGraphError::SqlFileReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => {
            // Every byte has a Windows-1252 mapping, so this never fails
            let (decoded, _, _) = WINDOWS_1252.decode(err.as_bytes());
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Collect the `.sql` files to scan under `input`.
///
/// A file path is returned as-is. Directories are walked recursively,
/// skipping `bin` and `obj` build output; paths matching any `exclude`
/// glob are dropped. Results are sorted for deterministic output.
pub fn discover_sql_files(input: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(SqlGraphError::InputNotFound {
            path: input.to_path_buf(),
        }
        .into());
    }

    let patterns = exclude
        .iter()
        .map(|pattern| {
            glob::Pattern::new(pattern).map_err(|source| SqlGraphError::InvalidExcludePattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut sql_files: Vec<PathBuf> = walkdir::WalkDir::new(input)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.depth() > 0
                && entry.file_type().is_dir()
                && matches!(entry.file_name().to_str(), Some("bin") | Some("obj")))
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
        })
        .filter(|path| {
            let relative = path.strip_prefix(input).unwrap_or(path);
            !patterns
                .iter()
                .any(|p| p.matches_path(relative) || p.matches_path(path))
        })
        .collect();

    sql_files.sort();
    Ok(sql_files)
}
