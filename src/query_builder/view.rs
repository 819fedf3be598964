//! Compiled queries exposed as virtual tables.

use crate::graph_catalog::{item_name::ItemName, Table};
use crate::graph_expr::expression_rewriter::ExpressionRewriter;
use crate::graph_expr::{GraphExpr, Variable};

use super::algebra::QueryAlgebra;

/// A built query presented as a table named `name`.
///
/// The virtual table's columns are the query's projections. Expressions
/// compiled against the inner bindings can be re-expressed under the view
/// name with [`QueryView::rewrite`].
#[derive(Debug, Clone)]
pub struct QueryView {
    algebra: QueryAlgebra,
    table: Table,
    rewriter: ExpressionRewriter,
}

impl QueryView {
    pub fn new(name: ItemName, algebra: QueryAlgebra) -> Self {
        let table_name = name.without_column();
        let columns = algebra
            .projections()
            .iter()
            .map(|p| {
                (
                    p.display_name.clone(),
                    p.sql_type.clone().unwrap_or_else(|| "VARCHAR".to_string()),
                    p.nullable,
                )
            })
            .collect();
        let table = Table::view(table_name.clone(), columns);

        let mut rewriter = ExpressionRewriter::new();
        let mut seen = Vec::new();
        for column in algebra.columns() {
            let binding = column.name.without_column();
            if !seen.contains(&binding) {
                rewriter.add_alias(binding.clone(), table_name.clone());
                seen.push(binding);
            }
        }

        QueryView {
            algebra,
            table,
            rewriter,
        }
    }

    pub fn name(&self) -> &ItemName {
        self.table.name()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn algebra(&self) -> &QueryAlgebra {
        &self.algebra
    }

    pub fn rewriter(&self) -> &ExpressionRewriter {
        &self.rewriter
    }

    /// Outer variable for an inner one. Variables not tied to a catalog
    /// column (computed projections) are returned unchanged.
    pub fn outer_variable(&self, inner: &Variable) -> Variable {
        self.rewriter.rewrite_variable(&self.algebra, inner)
    }

    pub fn rewrite(&self, expr: &GraphExpr) -> GraphExpr {
        self.rewriter.rewrite(&self.algebra, expr)
    }

    /// The inner query's filters, renamed for the outer query.
    pub fn rewritten_filters(&self) -> Vec<GraphExpr> {
        self.algebra.filters().map(|f| self.rewrite(f)).collect()
    }
}
