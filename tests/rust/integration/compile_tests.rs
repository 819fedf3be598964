//! Compiling SQL statements into query algebra.

use sql2sparql::{
    graph_expr::{BinaryOp, GraphExpr, Literal},
    query_builder::algebra::PatternElement,
    CompileError,
};
use test_case::test_case;

use super::{column_var, fixture_compiler};

#[test]
fn test_select_star() {
    let compiler = fixture_compiler(false);
    let algebra = compiler.compile_sql("SELECT * FROM foo").unwrap();

    let names: Vec<&str> = algebra
        .projections()
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec!["StringCol", "NullableStringCol", "IntCol", "NullableIntCol"]
    );

    // type triple and non-null columns share one block; nullable columns are optional
    let kinds: Vec<&str> = algebra.elements().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["required", "optional", "required", "optional"]);
    assert_eq!(algebra.required_blocks().map(|b| b.len()).sum::<usize>(), 3);
    assert!(algebra.projections()[1].nullable);
    assert_eq!(algebra.projections()[2].sql_type.as_deref(), Some("INTEGER"));
}

#[test]
fn test_simple_filter() {
    let compiler = fixture_compiler(false);
    let algebra = compiler
        .compile_sql("SELECT StringCol FROM foo WHERE StringCol != 'baz'")
        .unwrap();

    assert_eq!(algebra.projections().len(), 1);
    assert_eq!(algebra.required_blocks().count(), 1);
    let filters: Vec<&GraphExpr> = algebra.filters().collect();
    assert_eq!(
        filters,
        vec![&GraphExpr::binary(
            BinaryOp::NotEquals,
            GraphExpr::var(&column_var("foo", "StringCol")),
            GraphExpr::Constant(Literal::String("baz".to_string())),
        )]
    );
    // filters follow every triple block
    assert!(matches!(algebra.elements().last(), Some(PatternElement::Filter(_))));
}

#[test]
fn test_comma_join_matches_inner_join() {
    let compiler = fixture_compiler(false);
    let comma = compiler
        .compile_sql("SELECT foo.StringCol, bar.BarStringCol FROM foo, bar WHERE foo.IntCol = bar.IntCol")
        .unwrap();
    let joined = compiler
        .compile_sql(
            "SELECT foo.StringCol, bar.BarStringCol FROM foo INNER JOIN bar ON foo.IntCol = bar.IntCol",
        )
        .unwrap();

    assert_eq!(comma.projections(), joined.projections());
    assert_eq!(comma.elements(), joined.elements());
    assert_eq!(
        comma.filters().next(),
        Some(&GraphExpr::binary(
            BinaryOp::Equals,
            GraphExpr::var(&column_var("foo", "IntCol")),
            GraphExpr::var(&column_var("bar", "IntCol")),
        ))
    );
}

#[test]
fn test_comma_join_matches_inner_join_on_nullable_columns() {
    let compiler = fixture_compiler(false);
    let comma = compiler
        .compile_sql(
            "SELECT foo.StringCol, bar.BarStringCol FROM foo, bar \
             WHERE foo.NullableIntCol = bar.BarNullableIntCol",
        )
        .unwrap();
    let joined = compiler
        .compile_sql(
            "SELECT foo.StringCol, bar.BarStringCol FROM foo INNER JOIN bar \
             ON foo.NullableIntCol = bar.BarNullableIntCol",
        )
        .unwrap();

    assert_eq!(comma.projections(), joined.projections());
    assert_eq!(comma.elements(), joined.elements());
    // the join columns stay in OPTIONAL groups either way
    let optional_vars: Vec<_> = joined
        .optional_groups()
        .flat_map(|group| group.all_triples())
        .flat_map(|triple| triple.variables())
        .cloned()
        .collect();
    assert!(optional_vars.contains(&column_var("foo", "NullableIntCol")));
    assert!(optional_vars.contains(&column_var("bar", "BarNullableIntCol")));
}

#[test]
fn test_ambiguous_column() {
    let compiler = fixture_compiler(false);
    match compiler.compile_sql("SELECT IntCol FROM foo, bar") {
        Err(CompileError::Builder(err)) => assert!(err.to_string().contains("IntCol")),
        other => panic!("expected ambiguity error, got {:?}", other),
    }
}

#[test]
fn test_unknown_table_and_column() {
    let compiler = fixture_compiler(false);
    assert!(matches!(
        compiler.compile_sql("SELECT * FROM nowhere"),
        Err(CompileError::Builder(_))
    ));
    assert!(matches!(
        compiler.compile_sql("SELECT Missing FROM foo"),
        Err(CompileError::Builder(_))
    ));
}

#[test]
fn test_like_becomes_regex_or_equality() {
    let compiler = fixture_compiler(false);
    let algebra = compiler
        .compile_sql("SELECT StringCol FROM foo WHERE StringCol LIKE 'ab%c_' AND NullableStringCol LIKE 'exact'")
        .unwrap();
    let filter = algebra.filters().next().unwrap();
    match filter {
        GraphExpr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            assert!(matches!(
                left.as_ref(),
                GraphExpr::Regex { pattern, .. } if pattern == "^ab(.+)c.$"
            ));
            assert!(matches!(
                right.as_ref(),
                GraphExpr::Binary { op: BinaryOp::Equals, .. }
            ));
        }
        other => panic!("unexpected filter {:?}", other),
    }
}

#[test]
fn test_between_and_in_list() {
    let compiler = fixture_compiler(false);
    let algebra = compiler
        .compile_sql("SELECT IntCol FROM foo WHERE IntCol BETWEEN 1 AND 5 OR IntCol IN (7, 9)")
        .unwrap();
    let int_col = GraphExpr::var(&column_var("foo", "IntCol"));
    let expected = GraphExpr::binary(
        BinaryOp::Or,
        GraphExpr::and(
            GraphExpr::binary(
                BinaryOp::GreaterThanOrEqual,
                int_col.clone(),
                GraphExpr::Constant(Literal::Integer(1)),
            ),
            GraphExpr::binary(
                BinaryOp::LessThanOrEqual,
                int_col.clone(),
                GraphExpr::Constant(Literal::Integer(5)),
            ),
        ),
        GraphExpr::In {
            expr: Box::new(int_col),
            list: vec![
                GraphExpr::Constant(Literal::Integer(7)),
                GraphExpr::Constant(Literal::Integer(9)),
            ],
            negated: false,
        },
    );
    assert_eq!(algebra.filters().collect::<Vec<_>>(), vec![&expected]);
}

#[test]
fn test_is_null_uses_bound() {
    let compiler = fixture_compiler(false);
    let algebra = compiler
        .compile_sql("SELECT StringCol FROM foo WHERE NullableIntCol IS NULL")
        .unwrap();
    let nullable = column_var("foo", "NullableIntCol");
    assert_eq!(
        algebra.filters().next(),
        Some(&GraphExpr::not(GraphExpr::Bound(nullable.clone())))
    );
    // a column first seen in WHERE is still bound optionally
    assert!(algebra.column(&nullable).unwrap().optional);
}

#[test_case("SELECT StringCol FROM foo WHERE StringCol = ?" ; "parameter")]
#[test_case("SELECT IntCol % 2 FROM foo" ; "modulo")]
#[test_case("SELECT StringCol || 'x' FROM foo" ; "concat operator")]
#[test_case("SELECT CASE WHEN IntCol > 1 THEN 'a' ELSE 'b' END FROM foo" ; "case")]
#[test_case("SELECT StringCol FROM foo WHERE EXISTS (SELECT * FROM bar)" ; "exists")]
#[test_case("SELECT StringCol FROM foo WHERE IntCol IN (SELECT IntCol FROM bar)" ; "in subquery")]
#[test_case("SELECT StringCol FROM foo WHERE IntCol = NULL" ; "null literal")]
#[test_case("SELECT * FROM foo RIGHT JOIN bar ON foo.IntCol = bar.IntCol" ; "right join")]
#[test_case("SELECT StringCol FROM foo WHERE MAX(IntCol) > 1" ; "aggregate in where")]
fn test_unsupported_constructs(sql: &str) {
    let compiler = fixture_compiler(false);
    match compiler.compile_sql(sql) {
        Err(CompileError::UnsupportedConstruct { .. }) => {}
        other => panic!("{}: expected unsupported construct, got {:?}", sql, other),
    }
}

#[test]
fn test_function_errors() {
    let compiler = fixture_compiler(false);
    assert_eq!(
        compiler.compile_sql("SELECT soundex(StringCol) FROM foo"),
        Err(CompileError::UnsupportedFunction {
            name: "SOUNDEX".to_string()
        })
    );
    assert!(matches!(
        compiler.compile_sql("SELECT UPPER(StringCol, IntCol) FROM foo"),
        Err(CompileError::ArgumentCount { actual: 2, .. })
    ));
}

#[test]
fn test_parse_error_surfaces() {
    let compiler = fixture_compiler(false);
    assert!(matches!(
        compiler.compile_sql("SELECT * FROM foo WHERE"),
        Err(CompileError::Parse(_))
    ));
}
