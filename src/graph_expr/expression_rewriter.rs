//! Variable remapping for compiled expressions.
//!
//! When a compiled query is reused as a table source (a view), expressions
//! built against the inner query's bindings have to be re-expressed in terms
//! of the outer name. [`ExpressionRewriter`] holds an ordered alias map from
//! inner names to outer names and produces a rewritten copy of an expression
//! tree; the input tree is never modified.

use crate::graph_catalog::item_name::ItemName;

use super::{GraphExpr, Variable};

/// Maps a graph variable back to the catalog column it was registered for.
pub trait ColumnResolver {
    fn column_for(&self, variable: &Variable) -> Option<&ItemName>;
}

#[derive(Debug, Clone, Default)]
pub struct ExpressionRewriter {
    /// `(inner pattern, outer name)`, first match wins.
    aliases: Vec<(ItemName, ItemName)>,
}

impl ExpressionRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every column whose name matches `from` onto `to`. `to` supplies
    /// the catalog, schema and table segments; the column segment is kept.
    pub fn add_alias(&mut self, from: ItemName, to: ItemName) {
        log::debug!("ExpressionRewriter: alias {} -> {}", from, to);
        self.aliases.push((from, to));
    }

    pub fn aliases(&self) -> &[(ItemName, ItemName)] {
        &self.aliases
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Outer name for `column`, if any alias pattern matches it.
    pub fn map_column(&self, column: &ItemName) -> Option<ItemName> {
        self.aliases
            .iter()
            .find(|(from, _)| from.matches(column))
            .map(|(_, to)| {
                let mapped = ItemName::new(to.catalog(), to.schema(), to.table(), column.column());
                log::debug!("ExpressionRewriter: {} rewritten to {}", column, mapped);
                mapped
            })
    }

    pub fn rewrite_variable<R: ColumnResolver + ?Sized>(
        &self,
        resolver: &R,
        variable: &Variable,
    ) -> Variable {
        resolver
            .column_for(variable)
            .and_then(|column| self.map_column(column))
            .map(|mapped| Variable::from_item_name(&mapped))
            .unwrap_or_else(|| variable.clone())
    }

    /// Structural copy of `expr` with matching variables substituted.
    pub fn rewrite<R: ColumnResolver + ?Sized>(&self, resolver: &R, expr: &GraphExpr) -> GraphExpr {
        match expr {
            GraphExpr::Variable(v) => GraphExpr::Variable(self.rewrite_variable(resolver, v)),
            GraphExpr::Bound(v) => GraphExpr::Bound(self.rewrite_variable(resolver, v)),
            GraphExpr::Constant(literal) => GraphExpr::Constant(literal.clone()),
            GraphExpr::Binary { op, left, right } => GraphExpr::Binary {
                op: *op,
                left: Box::new(self.rewrite(resolver, left)),
                right: Box::new(self.rewrite(resolver, right)),
            },
            GraphExpr::Not(inner) => GraphExpr::Not(Box::new(self.rewrite(resolver, inner))),
            GraphExpr::Negate(inner) => GraphExpr::Negate(Box::new(self.rewrite(resolver, inner))),
            GraphExpr::Regex {
                expr,
                pattern,
                flags,
            } => GraphExpr::Regex {
                expr: Box::new(self.rewrite(resolver, expr)),
                pattern: pattern.clone(),
                flags: flags.clone(),
            },
            GraphExpr::In {
                expr,
                list,
                negated,
            } => GraphExpr::In {
                expr: Box::new(self.rewrite(resolver, expr)),
                list: list.iter().map(|e| self.rewrite(resolver, e)).collect(),
                negated: *negated,
            },
            GraphExpr::Function { function, args } => GraphExpr::Function {
                function: *function,
                args: args.iter().map(|e| self.rewrite(resolver, e)).collect(),
            },
            GraphExpr::Aggregate {
                function,
                distinct,
                arg,
            } => GraphExpr::Aggregate {
                function: *function,
                distinct: *distinct,
                arg: arg.as_ref().map(|a| Box::new(self.rewrite(resolver, a))),
            },
        }
    }
}
