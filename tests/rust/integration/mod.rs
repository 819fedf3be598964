//! Integration tests - SQL text through the compiler to SPARQL
//!
//! Every test starts from the YAML fixture catalog in `tests/fixtures`.

use std::sync::Arc;

use sql2sparql::{
    graph_catalog::load_catalog,
    sql_compiler::{function_registry::FunctionRegistry, CompileOptions, SqlCompiler},
};

mod compile_tests;
mod sparql_output_tests;
mod view_tests;

pub fn fixture_compiler(use_service: bool) -> SqlCompiler {
    let path = format!("{}/tests/fixtures/test_catalog.yaml", env!("CARGO_MANIFEST_DIR"));
    let catalog = load_catalog(path, true).expect("fixture catalog should load");
    SqlCompiler::new(Arc::new(catalog), Arc::new(FunctionRegistry::standard())).with_options(
        CompileOptions {
            default_schema: None,
            use_service,
        },
    )
}

/// `testSchema·table·column`
pub fn column_var(table: &str, column: &str) -> sql2sparql::graph_expr::Variable {
    sql2sparql::graph_expr::Variable::new(&format!("testSchema\u{b7}{}\u{b7}{}", table, column))
}
