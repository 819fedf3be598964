//! sql2sparql - SQL to SPARQL compiler over a virtual-table catalog
//!
//! This crate exposes RDF graph data as relational tables through:
//! - A catalog of schemas, tables and columns, each column backed by a
//!   triple pattern template
//! - A SQL SELECT parser
//! - Compilation of parsed statements into a SPARQL query algebra
//! - SPARQL 1.1 text generation

pub mod config;
pub mod graph_catalog;
pub mod graph_expr;
pub mod query_builder;
pub mod sparql_generator;
pub mod sql_compiler;
pub mod sql_parser;

pub use graph_catalog::{load_catalog, Catalog};
pub use sparql_generator::generate_sparql;
pub use sql_compiler::{errors::CompileError, CompileOptions, SqlCompiler};
