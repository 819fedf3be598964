//! The compiler's output: projections plus ordered pattern elements.
//!
//! A [`QueryAlgebra`] is produced by `QueryBuilder::build` and is immutable
//! afterwards. Rendering to query text lives in `sparql_generator`.

use serde::{Deserialize, Serialize};

use crate::graph_catalog::item_name::ItemName;
use crate::graph_expr::expression_rewriter::ColumnResolver;
use crate::graph_expr::{GraphExpr, Triple, Variable};

/// Triples that only bind when all of them match. Nested blocks are
/// themselves optional inside the group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionalGroup {
    pub triples: Vec<Triple>,
    pub nested: Vec<Vec<Triple>>,
    pub filters: Vec<GraphExpr>,
}

impl OptionalGroup {
    pub fn single(triple: Triple) -> Self {
        OptionalGroup {
            triples: vec![triple],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty() && self.nested.is_empty() && self.filters.is_empty()
    }

    /// Every triple in the group, nested ones included.
    pub fn all_triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter().chain(self.nested.iter().flatten())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternElement {
    /// Consecutive required triples share one block; an OPTIONAL group,
    /// BIND or FILTER in between starts a new one. The block count thus
    /// follows column registration order.
    Required(Vec<Triple>),
    Optional(OptionalGroup),
    Filter(GraphExpr),
    Bind { expr: GraphExpr, variable: Variable },
}

impl PatternElement {
    pub fn kind(&self) -> &'static str {
        match self {
            PatternElement::Required(_) => "required",
            PatternElement::Optional(_) => "optional",
            PatternElement::Filter(_) => "filter",
            PatternElement::Bind { .. } => "bind",
        }
    }
}

/// One result column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub variable: Variable,
    pub display_name: String,
    /// Aggregate projected as `(expr AS ?variable)`.
    pub expression: Option<GraphExpr>,
    pub sql_type: Option<String>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCondition {
    pub expr: GraphExpr,
    pub ascending: bool,
}

/// A column reference registered during compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryColumn {
    pub name: ItemName,
    pub variable: Variable,
    pub sql_type: String,
    pub nullable: bool,
    /// Bound inside an OPTIONAL block.
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAlgebra {
    pub(crate) prefixes: Vec<(String, String)>,
    pub(crate) service: Option<String>,
    pub(crate) distinct: bool,
    pub(crate) projections: Vec<Projection>,
    pub(crate) elements: Vec<PatternElement>,
    pub(crate) group_by: Vec<GraphExpr>,
    pub(crate) having: Vec<GraphExpr>,
    pub(crate) order_by: Vec<OrderCondition>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) columns: Vec<QueryColumn>,
}

impl QueryAlgebra {
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Remote endpoint the pattern should be evaluated against, if any.
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn elements(&self) -> &[PatternElement] {
        &self.elements
    }

    pub fn group_by(&self) -> &[GraphExpr] {
        &self.group_by
    }

    pub fn having(&self) -> &[GraphExpr] {
        &self.having
    }

    pub fn order_by(&self) -> &[OrderCondition] {
        &self.order_by
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn columns(&self) -> &[QueryColumn] {
        &self.columns
    }

    pub fn projected_variables(&self) -> impl Iterator<Item = &Variable> {
        self.projections.iter().map(|p| &p.variable)
    }

    pub fn required_blocks(&self) -> impl Iterator<Item = &Vec<Triple>> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Required(triples) => Some(triples),
            _ => None,
        })
    }

    pub fn optional_groups(&self) -> impl Iterator<Item = &OptionalGroup> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Optional(group) => Some(group),
            _ => None,
        })
    }

    pub fn filters(&self) -> impl Iterator<Item = &GraphExpr> {
        self.elements.iter().filter_map(|e| match e {
            PatternElement::Filter(expr) => Some(expr),
            _ => None,
        })
    }

    pub fn column(&self, variable: &Variable) -> Option<&QueryColumn> {
        self.columns.iter().find(|c| &c.variable == variable)
    }
}

impl ColumnResolver for QueryAlgebra {
    fn column_for(&self, variable: &Variable) -> Option<&ItemName> {
        self.column(variable).map(|c| &c.name)
    }
}
