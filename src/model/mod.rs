//! Dependency graph model

mod elements;

pub use elements::*;
