//! Shared catalog fixtures for unit tests.

use super::catalog::{Catalog, CatalogBuilder, ColumnBuilder, SchemaBuilder, TableBuilder};

pub const TEST_CATALOG: &str = "testCatalog";
pub const TEST_SCHEMA: &str = "testSchema";

fn column(name: &str, predicate: &str, sql_type: &str, nullable: bool) -> ColumnBuilder {
    ColumnBuilder::new(name, &format!("{{subject}} <{}> {{object}} .", predicate))
        .sql_type(sql_type)
        .nullable(nullable)
}

pub fn foo_table() -> TableBuilder {
    TableBuilder::new("foo")
        .iri("http://example.com/foo")
        .template("{subject} a {object} .")
        .column(column("StringCol", "http://example.com/zero", "VARCHAR", false))
        .column(column("NullableStringCol", "http://example.com/one", "VARCHAR", true))
        .column(column("IntCol", "http://example.com/two", "INTEGER", false))
        .column(column("NullableIntCol", "http://example.com/three", "INTEGER", true))
}

pub fn bar_table() -> TableBuilder {
    TableBuilder::new("bar")
        .template("{subject} a <http://example.com/bar> .")
        .column(column("BarStringCol", "http://example.com/bar/zero", "VARCHAR", false))
        .column(column(
            "BarNullableStringCol",
            "http://example.com/bar/one",
            "VARCHAR",
            true,
        ))
        .column(column("IntCol", "http://example.com/bar/two", "INTEGER", false))
        .column(column(
            "BarNullableIntCol",
            "http://example.com/bar/three",
            "INTEGER",
            true,
        ))
}

/// `testCatalog.testSchema` holding `foo` and `bar`. Both tables have an
/// `IntCol`, so an unqualified `IntCol` is ambiguous once both are bound.
pub fn foo_bar_catalog() -> Catalog {
    match CatalogBuilder::new(TEST_CATALOG)
        .prefix("ex", "http://example.com/")
        .schema(SchemaBuilder::new(TEST_SCHEMA).table(foo_table()).table(bar_table()))
        .build()
    {
        Ok(catalog) => catalog,
        Err(e) => panic!("fixture catalog failed to build: {}", e),
    }
}

/// Same tables split across two schemas, for default-schema resolution.
pub fn two_schema_catalog() -> Catalog {
    match CatalogBuilder::new(TEST_CATALOG)
        .schema(SchemaBuilder::new(TEST_SCHEMA).table(foo_table()))
        .schema(SchemaBuilder::new("otherSchema").table(foo_table()).table(bar_table()))
        .build()
    {
        Ok(catalog) => catalog,
        Err(e) => panic!("fixture catalog failed to build: {}", e),
    }
}
