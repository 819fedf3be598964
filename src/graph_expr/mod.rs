//! Graph-query filter expressions.
//!
//! [`GraphExpr`] is the closed set of expression nodes the compiler can emit
//! into FILTER, BIND, HAVING, ORDER BY and aggregate projections.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod expression_rewriter;
pub mod term;

pub use term::{Term, Triple, Variable};

pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// A typed constant. The type comes from the SQL literal's lexical class and
/// is never widened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Integer(i64),
    /// Kept as its lexical form to avoid float rounding.
    Decimal(String),
    Boolean(bool),
    Date(String),
    Time(String),
    Timestamp(String),
}

impl Literal {
    /// XSD datatype local name for typed literals that need an explicit tag.
    pub fn xsd_datatype(&self) -> Option<&'static str> {
        match self {
            Literal::Date(_) => Some("date"),
            Literal::Time(_) => Some("time"),
            Literal::Timestamp(_) => Some("dateTime"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equals => "=",
            BinaryOp::NotEquals => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanOrEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
        }
    }
}

/// SPARQL built-in functions reachable from SQL function calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphFunction {
    Ucase,
    Lcase,
    Strlen,
    Substr,
    Replace,
    Abs,
    Ceil,
    Floor,
    Round,
    Rand,
    Now,
    Year,
    Month,
    Day,
    Hours,
    Minutes,
    Seconds,
    Coalesce,
}

impl GraphFunction {
    pub fn name(&self) -> &'static str {
        match self {
            GraphFunction::Ucase => "UCASE",
            GraphFunction::Lcase => "LCASE",
            GraphFunction::Strlen => "STRLEN",
            GraphFunction::Substr => "SUBSTR",
            GraphFunction::Replace => "REPLACE",
            GraphFunction::Abs => "ABS",
            GraphFunction::Ceil => "CEIL",
            GraphFunction::Floor => "FLOOR",
            GraphFunction::Round => "ROUND",
            GraphFunction::Rand => "RAND",
            GraphFunction::Now => "NOW",
            GraphFunction::Year => "YEAR",
            GraphFunction::Month => "MONTH",
            GraphFunction::Day => "DAY",
            GraphFunction::Hours => "HOURS",
            GraphFunction::Minutes => "MINUTES",
            GraphFunction::Seconds => "SECONDS",
            GraphFunction::Coalesce => "COALESCE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphExpr {
    Variable(Variable),
    Constant(Literal),
    Binary {
        op: BinaryOp,
        left: Box<GraphExpr>,
        right: Box<GraphExpr>,
    },
    Not(Box<GraphExpr>),
    Negate(Box<GraphExpr>),
    /// `REGEX(expr, pattern[, flags])`
    Regex {
        expr: Box<GraphExpr>,
        pattern: String,
        flags: Option<String>,
    },
    In {
        expr: Box<GraphExpr>,
        list: Vec<GraphExpr>,
        negated: bool,
    },
    Bound(Variable),
    Function {
        function: GraphFunction,
        args: Vec<GraphExpr>,
    },
    /// `arg` is `None` for `COUNT(*)`.
    Aggregate {
        function: AggregateFunction,
        distinct: bool,
        arg: Option<Box<GraphExpr>>,
    },
}

impl GraphExpr {
    pub fn var(variable: &Variable) -> Self {
        GraphExpr::Variable(variable.clone())
    }

    pub fn string(value: &str) -> Self {
        GraphExpr::Constant(Literal::String(value.to_string()))
    }

    pub fn binary(op: BinaryOp, left: GraphExpr, right: GraphExpr) -> Self {
        GraphExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: GraphExpr, right: GraphExpr) -> Self {
        GraphExpr::binary(BinaryOp::And, left, right)
    }

    pub fn not(expr: GraphExpr) -> Self {
        GraphExpr::Not(Box::new(expr))
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            GraphExpr::Aggregate { .. } => true,
            GraphExpr::Variable(_) | GraphExpr::Constant(_) | GraphExpr::Bound(_) => false,
            GraphExpr::Binary { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            GraphExpr::Not(inner) | GraphExpr::Negate(inner) => inner.contains_aggregate(),
            GraphExpr::Regex { expr, .. } => expr.contains_aggregate(),
            GraphExpr::In { expr, list, .. } => {
                expr.contains_aggregate() || list.iter().any(GraphExpr::contains_aggregate)
            }
            GraphExpr::Function { args, .. } => args.iter().any(GraphExpr::contains_aggregate),
        }
    }

    /// Every variable referenced by the expression, depth first, with repeats.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables<'a>(&'a self, out: &mut Vec<&'a Variable>) {
        match self {
            GraphExpr::Variable(v) | GraphExpr::Bound(v) => out.push(v),
            GraphExpr::Constant(_) => {}
            GraphExpr::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            GraphExpr::Not(inner) | GraphExpr::Negate(inner) => inner.collect_variables(out),
            GraphExpr::Regex { expr, .. } => expr.collect_variables(out),
            GraphExpr::In { expr, list, .. } => {
                expr.collect_variables(out);
                list.iter().for_each(|e| e.collect_variables(out));
            }
            GraphExpr::Function { args, .. } => args.iter().for_each(|e| e.collect_variables(out)),
            GraphExpr::Aggregate { arg, .. } => {
                if let Some(arg) = arg {
                    arg.collect_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{}", d),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Date(v) | Literal::Time(v) => {
                let datatype = self.xsd_datatype().unwrap_or("string");
                write!(f, "\"{}\"^^<{}{}>", escape_string(v), XSD_NS, datatype)
            }
            // xsd:dateTime separates date and time with `T`, SQL with a space
            Literal::Timestamp(v) => {
                let lexical = v.trim().replacen(' ', "T", 1);
                write!(f, "\"{}\"^^<{}dateTime>", escape_string(&lexical), XSD_NS)
            }
        }
    }
}

/// Escape a value for a double-quoted SPARQL string literal.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
