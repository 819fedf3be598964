//! Rendering compiled queries as SPARQL text.

use sql2sparql::{generate_sparql, sparql_generator::ToSparql};

use super::fixture_compiler;

fn sparql_for(sql: &str, use_service: bool) -> String {
    let algebra = fixture_compiler(use_service)
        .compile_sql(sql)
        .unwrap_or_else(|e| panic!("{} failed to compile: {}", sql, e));
    generate_sparql(&algebra).unwrap_or_else(|e| panic!("{} failed to render: {}", sql, e))
}

#[test]
fn test_filter_query_text() {
    let sparql = sparql_for("SELECT StringCol FROM foo WHERE StringCol != 'baz'", false);
    println!("Generated SPARQL:\n{}", sparql);

    let expected = "PREFIX ex: <http://example.com/>\n\
        SELECT (?testSchema\u{b7}foo\u{b7}StringCol AS ?StringCol)\n\
        WHERE {\n\
        \x20 ?testSchema\u{b7}foo <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://example.com/foo> .\n\
        \x20 ?testSchema\u{b7}foo <http://example.com/zero> ?testSchema\u{b7}foo\u{b7}StringCol .\n\
        \x20 FILTER (?testSchema\u{b7}foo\u{b7}StringCol != \"baz\")\n\
        }\n";
    assert_eq!(sparql, expected);
}

#[test]
fn test_service_wrapper() {
    let sparql = sparql_for("SELECT StringCol FROM foo", true);
    assert!(
        sparql.contains("  SERVICE <http://localhost:3030/ds/sparql> {\n"),
        "SPARQL must wrap the pattern in SERVICE:\n{}",
        sparql
    );
    let without = sparql_for("SELECT StringCol FROM foo", false);
    assert!(!without.contains("SERVICE"));
}

#[test]
fn test_nullable_columns_are_optional() {
    let sparql = sparql_for("SELECT StringCol, NullableIntCol FROM foo", false);
    let optional_pos = sparql.find("OPTIONAL {").expect("OPTIONAL block must exist");
    let three_pos = sparql
        .find("<http://example.com/three>")
        .expect("nullable column triple must exist");
    assert!(three_pos > optional_pos);
    assert!(sparql.find("<http://example.com/zero>").unwrap() < optional_pos);
}

#[test]
fn test_left_join_optional_group() {
    let sparql = sparql_for(
        "SELECT foo.StringCol, b.BarStringCol FROM foo LEFT JOIN bar b ON foo.IntCol = b.IntCol",
        false,
    );
    println!("Generated SPARQL:\n{}", sparql);

    let optional_pos = sparql.find("OPTIONAL {").expect("OPTIONAL group must exist");
    // the right-hand table's type triple moves inside the group
    assert!(sparql.find("<http://example.com/bar>").unwrap() > optional_pos);
    // the ON condition filters inside the group, not the whole pattern
    let filter_pos = sparql.find("FILTER").expect("ON condition must render");
    assert!(filter_pos > optional_pos);
    assert_eq!(sparql.matches("FILTER").count(), 1);
}

#[test]
fn test_aggregates_grouping_and_paging() {
    let sparql = sparql_for(
        "SELECT StringCol, COUNT(DISTINCT IntCol) AS n FROM foo \
         GROUP BY StringCol HAVING COUNT(DISTINCT IntCol) > 1 \
         ORDER BY n DESC LIMIT 10 OFFSET 20",
        false,
    );
    println!("Generated SPARQL:\n{}", sparql);

    assert!(sparql.contains("(COUNT(DISTINCT ?testSchema\u{b7}foo\u{b7}IntCol) AS ?n)"));
    assert!(sparql.contains("GROUP BY ?testSchema\u{b7}foo\u{b7}StringCol\n"));
    assert!(sparql.contains("HAVING (COUNT(DISTINCT ?testSchema\u{b7}foo\u{b7}IntCol) > 1)\n"));
    assert!(sparql.contains("LIMIT 10\nOFFSET 20\n"));

    // HAVING must come after GROUP BY
    let group_by_pos = sparql.find("GROUP BY").unwrap();
    let having_pos = sparql.find("HAVING").unwrap();
    let order_pos = sparql.find("ORDER BY").unwrap();
    assert!(group_by_pos < having_pos && having_pos < order_pos);
}

#[test]
fn test_function_rewrites_and_like() {
    let sparql = sparql_for(
        "SELECT StringCol FROM foo WHERE TRIM(StringCol) = 'x' AND LEFT(StringCol, 2) LIKE 'a%'",
        false,
    );
    println!("Generated SPARQL:\n{}", sparql);

    assert!(sparql.contains("REPLACE(?testSchema\u{b7}foo\u{b7}StringCol, \"^\\\\s+|\\\\s+$\", \"\")"));
    assert!(sparql.contains("REGEX(SUBSTR(?testSchema\u{b7}foo\u{b7}StringCol, 1, 2), \"^a(.+)$\")"));
}

#[test]
fn test_bind_for_computed_column() {
    let algebra = fixture_compiler(false)
        .compile_sql("SELECT UPPER(StringCol) AS u, IntCol + 1 FROM foo")
        .unwrap();
    let sparql = algebra.to_sparql().unwrap();
    assert!(sparql.contains("SELECT ?u ?expr2\n"), "{}", sparql);
    assert!(sparql.contains("BIND(UCASE(?testSchema\u{b7}foo\u{b7}StringCol) AS ?u)"));
    assert!(sparql.contains("BIND(?testSchema\u{b7}foo\u{b7}IntCol + 1 AS ?expr2)"));
}
