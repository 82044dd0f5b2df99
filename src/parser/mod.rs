//! T-SQL reference extraction

mod definition_parser;
mod identifier_utils;
mod noise_names;
mod paren_scanner;
mod preprocess_parser;
mod reference_extractor;
mod script_parser;

pub use definition_parser::locate_definition;
pub use identifier_utils::{canonical_key, canonicalize, normalize_identifier, same_object};
pub use noise_names::NoiseNames;
pub use paren_scanner::{find_matching_paren, using_subquery_spans};
pub use preprocess_parser::preprocess;
pub use reference_extractor::{
    extract_delete_targets, extract_insert_targets, extract_merge_sources, extract_merge_targets,
    extract_procedure_calls, extract_query_sources, extract_scalar_calls,
    extract_table_valued_calls, extract_update_targets, ExtractionContext, TvfNames,
};
pub use script_parser::{parse_script, parse_sql_file, parse_sql_files, EdgeCollector, ScriptReport};
