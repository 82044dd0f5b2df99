//! Locating and reading the SQL scripts to scan

mod sql_files;

pub use sql_files::{discover_sql_files, read_sql_file};
