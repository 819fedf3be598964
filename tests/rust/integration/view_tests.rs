//! Compiled queries wrapped as virtual tables.

use sql2sparql::{
    graph_catalog::{ItemName, TableType},
    graph_expr::{BinaryOp, GraphExpr, Literal, Variable},
    query_builder::view::QueryView,
};

use super::fixture_compiler;

#[test]
fn test_view_over_compiled_query() {
    let algebra = fixture_compiler(false)
        .compile_sql("SELECT StringCol AS s, NullableIntCol FROM foo WHERE IntCol > 3")
        .unwrap();
    let view = QueryView::new(ItemName::table_name(Some("views"), "big_foo"), algebra);

    assert_eq!(view.table().table_type(), TableType::View);
    let columns: Vec<(&str, &str, bool)> = view
        .table()
        .columns()
        .iter()
        .map(|c| (c.short_name(), c.sql_type(), c.is_nullable()))
        .collect();
    assert_eq!(
        columns,
        vec![("s", "VARCHAR", false), ("NullableIntCol", "INTEGER", true)]
    );

    // the inner filter re-expressed under the view name
    assert_eq!(
        view.rewritten_filters(),
        vec![GraphExpr::binary(
            BinaryOp::GreaterThan,
            GraphExpr::var(&Variable::new("views\u{b7}big_foo\u{b7}IntCol")),
            GraphExpr::Constant(Literal::Integer(3)),
        )]
    );
}
