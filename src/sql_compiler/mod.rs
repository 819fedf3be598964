//! SQL to graph query compilation.
//!
//! [`SqlCompiler`] drives one [`QueryBuilder`] per statement: FROM and JOIN
//! clauses bind tables, the select list registers projections, and the ON,
//! WHERE, GROUP BY, HAVING and ORDER BY clauses go through the
//! [`SqlExprVisitor`]. The catalog and the function table are passed in and
//! shared read-only, so independent compilations can run concurrently.

use std::sync::Arc;

use crate::graph_catalog::{item_name::ItemName, Catalog};
use crate::graph_expr::GraphExpr;
use crate::query_builder::algebra::QueryAlgebra;
use crate::query_builder::errors::QueryBuilderError;
use crate::query_builder::QueryBuilder;
use crate::sql_parser::ast::{
    JoinOperator, ObjectName, SelectItem, SelectStatement, SqlExpr, SqlLiteral, TableFactor,
};
use crate::sql_parser::parse_statement;

pub mod errors;
pub mod expr_visitor;
pub mod function_registry;
pub mod like_pattern;

use errors::CompileError;
use expr_visitor::SqlExprVisitor;
use function_registry::FunctionRegistry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Schema tried first for unqualified table names.
    pub default_schema: Option<String>,
    /// Wrap the pattern in `SERVICE <endpoint>` when the catalog has one.
    pub use_service: bool,
}

#[derive(Debug, Clone)]
pub struct SqlCompiler {
    catalog: Arc<Catalog>,
    functions: Arc<FunctionRegistry>,
    options: CompileOptions,
}

impl SqlCompiler {
    pub fn new(catalog: Arc<Catalog>, functions: Arc<FunctionRegistry>) -> Self {
        SqlCompiler {
            catalog,
            functions,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Parse and compile one SQL statement.
    pub fn compile_sql(&self, sql: &str) -> Result<QueryAlgebra, CompileError> {
        let statement = parse_statement(sql)
            .map_err(|e| CompileError::Parse(e.to_string().trim_end().to_string()))?;
        self.compile(&statement)
    }

    pub fn compile(&self, statement: &SelectStatement) -> Result<QueryAlgebra, CompileError> {
        let mut builder = QueryBuilder::new(&self.catalog)
            .with_default_schema(self.options.default_schema.as_deref())
            .with_service(self.options.use_service);

        if statement.from.is_empty() {
            return Err(QueryBuilderError::EmptyFromClause.into());
        }

        // 1. FROM / JOIN bindings
        let mut inner_constraints: Vec<&SqlExpr> = Vec::new();
        let mut left_constraints: Vec<(usize, &SqlExpr)> = Vec::new();
        for table in &statement.from {
            bind_factor(&mut builder, &table.relation, false)?;
            for join in &table.joins {
                match &join.operator {
                    JoinOperator::Inner(constraint) => {
                        bind_factor(&mut builder, &join.relation, false)?;
                        inner_constraints.extend(constraint.iter());
                    }
                    JoinOperator::Cross => {
                        bind_factor(&mut builder, &join.relation, false)?;
                    }
                    JoinOperator::LeftOuter(constraint) => {
                        let id = bind_factor(&mut builder, &join.relation, true)?;
                        if let Some(constraint) = constraint {
                            left_constraints.push((id, constraint));
                        }
                    }
                    other @ (JoinOperator::RightOuter(_) | JoinOperator::FullOuter(_)) => {
                        return Err(CompileError::unsupported(other.name()));
                    }
                }
            }
        }

        // 2. select list
        builder.set_distinct(statement.distinct);
        for (position, item) in statement.projection.iter().enumerate() {
            self.add_select_item(&mut builder, item, position + 1)?;
        }

        // 3. join constraints
        for constraint in inner_constraints {
            let filter = SqlExprVisitor::new(&mut builder, &self.functions, "ON clause").visit(constraint)?;
            builder.add_filter(filter);
        }
        for (binding_id, constraint) in left_constraints {
            let filter = SqlExprVisitor::new(&mut builder, &self.functions, "ON clause")
                .optional_columns(true)
                .visit(constraint)?;
            builder.add_binding_filter(binding_id, filter)?;
        }

        // 4. WHERE
        if let Some(condition) = &statement.where_clause {
            let filter = SqlExprVisitor::new(&mut builder, &self.functions, "WHERE clause").visit(condition)?;
            builder.add_filter(filter);
        }

        // 5. GROUP BY / HAVING
        for expr in &statement.group_by {
            let key = SqlExprVisitor::new(&mut builder, &self.functions, "GROUP BY clause")
                .resolve_aliases(true)
                .visit(expr)?;
            builder.add_group_by(key);
        }
        if let Some(having) = &statement.having {
            let condition = SqlExprVisitor::new(&mut builder, &self.functions, "HAVING clause")
                .allow_aggregates(true)
                .resolve_aliases(true)
                .visit(having)?;
            builder.add_having(condition);
        }

        // 6. ORDER BY / LIMIT / OFFSET
        for item in &statement.order_by {
            let key = match self.order_key_from_projection(&builder, &item.expr)? {
                Some(key) => key,
                None => SqlExprVisitor::new(&mut builder, &self.functions, "ORDER BY clause")
                    .allow_aggregates(true)
                    .visit(&item.expr)?,
            };
            builder.add_order_by(key, item.ascending);
        }
        builder.set_limit(statement.limit);
        builder.set_offset(statement.offset);

        let algebra = builder.build()?;
        log::debug!(
            "Compiled statement: {} projection(s), {} pattern element(s)",
            algebra.projections().len(),
            algebra.elements().len()
        );
        Ok(algebra)
    }

    fn add_select_item(
        &self,
        builder: &mut QueryBuilder<'_>,
        item: &SelectItem,
        position: usize,
    ) -> Result<(), CompileError> {
        match item {
            SelectItem::Wildcard => builder.add_all_columns(None)?,
            SelectItem::QualifiedWildcard(name) => {
                let pattern = table_item_name(name)?;
                builder.add_all_columns(Some(&pattern))?;
            }
            SelectItem::Expr { expr, alias } => {
                let compiled = SqlExprVisitor::new(builder, &self.functions, "select list")
                    .allow_aggregates(true)
                    .visit(expr)?;
                match compiled {
                    GraphExpr::Variable(variable) => builder.add_var(&variable, alias.as_deref())?,
                    computed => {
                        let display = alias.clone().unwrap_or_else(|| format!("expr{}", position));
                        builder.add_computed(computed, &display)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// ORDER BY keys that name a select-list alias or position.
    fn order_key_from_projection(
        &self,
        builder: &QueryBuilder<'_>,
        expr: &SqlExpr,
    ) -> Result<Option<GraphExpr>, CompileError> {
        match expr {
            SqlExpr::Column(name) if name.parts().len() == 1 => Ok(builder
                .projection_variable(&name.parts()[0])
                .map(GraphExpr::var)),
            SqlExpr::Literal(SqlLiteral::Integer(position)) => {
                let projections = builder.projections();
                let index = usize::try_from(*position)
                    .ok()
                    .and_then(|p| p.checked_sub(1))
                    .filter(|i| *i < projections.len())
                    .ok_or_else(|| {
                        CompileError::unsupported(format!("ORDER BY position {}", position))
                    })?;
                Ok(Some(GraphExpr::var(&projections[index].variable)))
            }
            _ => Ok(None),
        }
    }
}

fn table_item_name(name: &ObjectName) -> Result<ItemName, CompileError> {
    ItemName::from_table_parts(name.parts())
        .ok_or_else(|| CompileError::unsupported(format!("table name `{}`", name)))
}

/// Bind one FROM item and return its binding id.
fn bind_factor(
    builder: &mut QueryBuilder<'_>,
    factor: &TableFactor,
    optional: bool,
) -> Result<usize, CompileError> {
    match factor {
        TableFactor::Table { name, alias } => {
            let table_name = table_item_name(name)?;
            let binding = builder.add_table(&table_name, alias.as_deref(), optional)?;
            Ok(binding.id())
        }
        TableFactor::Derived { .. } => Err(CompileError::unsupported("derived table in FROM clause")),
    }
}
