//! Unit tests - public API checks that need no compiled query
//!
//! Catalog loading from YAML and SQL parsing edge cases.

mod catalog_loading_tests;
mod parser_tests;
