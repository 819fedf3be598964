//! SQL parsing edge cases and error handling.

use sql2sparql::sql_parser::{
    ast::{JoinOperator, SelectItem, SqlExpr, SqlLiteral, TableFactor},
    parse_statement,
};
use test_case::test_case;

#[test]
fn test_full_statement() {
    let statement = parse_statement(
        "SELECT DISTINCT f.StringCol AS s, COUNT(*) n \
         FROM testSchema.foo f LEFT OUTER JOIN bar ON f.IntCol = bar.IntCol \
         WHERE f.IntCol BETWEEN 1 AND 10 \
         GROUP BY f.StringCol HAVING COUNT(*) > 1 \
         ORDER BY s DESC LIMIT 5 OFFSET 10;",
    )
    .expect("statement should parse");

    assert!(statement.distinct);
    assert_eq!(statement.projection.len(), 2);
    assert!(matches!(
        &statement.projection[0],
        SelectItem::Expr { alias: Some(alias), .. } if alias == "s"
    ));
    assert_eq!(statement.from.len(), 1);
    match &statement.from[0].relation {
        TableFactor::Table { name, alias } => {
            assert_eq!(name.parts(), &["testSchema".to_string(), "foo".to_string()]);
            assert_eq!(alias.as_deref(), Some("f"));
        }
        other => panic!("unexpected relation {:?}", other),
    }
    assert!(matches!(
        statement.from[0].joins[0].operator,
        JoinOperator::LeftOuter(Some(_))
    ));
    assert!(matches!(statement.where_clause, Some(SqlExpr::Between { negated: false, .. })));
    assert_eq!(statement.group_by, vec![SqlExpr::column(&["f", "StringCol"])]);
    assert!(statement.having.is_some());
    assert!(!statement.order_by[0].ascending);
    assert_eq!(statement.limit, Some(5));
    assert_eq!(statement.offset, Some(10));
}

#[test]
fn test_keywords_are_case_insensitive() {
    let statement = parse_statement("select * from foo where NullableIntCol is not null").unwrap();
    assert_eq!(statement.projection, vec![SelectItem::Wildcard]);
    assert!(matches!(statement.where_clause, Some(SqlExpr::IsNull { negated: true, .. })));
}

#[test]
fn test_jdbc_date_escape() {
    let statement = parse_statement("SELECT * FROM foo WHERE d = {d '2020-01-31'}").unwrap();
    match statement.where_clause {
        Some(SqlExpr::BinaryOp { right, .. }) => {
            assert_eq!(*right, SqlExpr::Literal(SqlLiteral::Date("2020-01-31".to_string())));
        }
        other => panic!("unexpected where clause {:?}", other),
    }
}

#[test_case("" ; "empty statement")]
#[test_case("SELECT" ; "select without items")]
#[test_case("SELECT FROM foo" ; "missing select list")]
#[test_case("SELECT * FROM" ; "missing table")]
#[test_case("SELECT * FROM foo WHERE" ; "missing predicate")]
#[test_case("SELECT * FROM foo LIMIT x" ; "non numeric limit")]
#[test_case("SELECT * FROM foo GARBAGE AFTER" ; "trailing tokens")]
#[test_case("SELECT (a FROM foo" ; "unbalanced parenthesis")]
#[test_case("SELECT * FROM foo UNION SELECT * FROM bar" ; "union")]
fn test_malformed_statements_are_errors(sql: &str) {
    assert!(parse_statement(sql).is_err(), "{} should not parse", sql);
}

#[test]
fn test_error_names_offending_input() {
    let err = parse_statement("SELECT * FROM foo ORDER BY").unwrap_err();
    assert!(!err.errors.is_empty());
    assert!(err.to_string().to_lowercase().contains("order by"));
}
