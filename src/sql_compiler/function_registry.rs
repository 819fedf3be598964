/// SQL to SPARQL function table
///
/// Maps SQL function names to SPARQL built-ins or aggregates, with an arity
/// range and an optional argument transformation.
use std::collections::HashMap;

use crate::graph_expr::{AggregateFunction, GraphExpr, GraphFunction, Literal};

/// What a SQL function becomes in the graph algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionTarget {
    Scalar(GraphFunction),
    Aggregate(AggregateFunction),
}

/// Function mapping entry
#[derive(Debug, Clone)]
pub struct FunctionMapping {
    /// SQL function name as registered (upper case)
    pub sql_name: &'static str,
    pub target: FunctionTarget,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    /// Applied to the compiled arguments before the call is built
    pub arg_transform: Option<fn(Vec<GraphExpr>) -> Vec<GraphExpr>>,
}

impl FunctionMapping {
    pub fn new(sql_name: &'static str, target: FunctionTarget, min_args: usize, max_args: Option<usize>) -> Self {
        FunctionMapping {
            sql_name,
            target,
            min_args,
            max_args,
            arg_transform: None,
        }
    }

    pub fn with_transform(mut self, transform: fn(Vec<GraphExpr>) -> Vec<GraphExpr>) -> Self {
        self.arg_transform = Some(transform);
        self
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map(|max| count <= max).unwrap_or(true)
    }

    /// Human readable arity, for error messages.
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..{}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

fn scalar(sql_name: &'static str, function: GraphFunction, min: usize, max: usize) -> FunctionMapping {
    FunctionMapping::new(sql_name, FunctionTarget::Scalar(function), min, Some(max))
}

fn aggregate(sql_name: &'static str, function: AggregateFunction) -> FunctionMapping {
    FunctionMapping::new(sql_name, FunctionTarget::Aggregate(function), 1, Some(1))
}

fn trim_args(args: Vec<GraphExpr>, pattern: &str) -> Vec<GraphExpr> {
    let mut args = args;
    args.push(GraphExpr::string(pattern));
    args.push(GraphExpr::string(""));
    args
}

// Static function mapping table
lazy_static::lazy_static! {
    static ref STANDARD_FUNCTIONS: Vec<FunctionMapping> = {
        use GraphFunction::*;

        vec![
            // ===== STRING FUNCTIONS =====
            scalar("UPPER", Ucase, 1, 1),
            scalar("UCASE", Ucase, 1, 1),
            scalar("LOWER", Lcase, 1, 1),
            scalar("LCASE", Lcase, 1, 1),
            scalar("LENGTH", Strlen, 1, 1),
            scalar("CHAR_LENGTH", Strlen, 1, 1),
            scalar("CHARACTER_LENGTH", Strlen, 1, 1),
            scalar("SUBSTRING", Substr, 2, 3),
            scalar("SUBSTR", Substr, 2, 3),
            // LEFT(s, n) -> SUBSTR(s, 1, n)
            scalar("LEFT", Substr, 2, 2).with_transform(|args| {
                let mut args = args.into_iter();
                match (args.next(), args.next()) {
                    (Some(s), Some(n)) => vec![s, GraphExpr::Constant(Literal::Integer(1)), n],
                    (s, n) => s.into_iter().chain(n).collect(),
                }
            }),
            // TRIM(s) -> REPLACE(s, "^\\s+|\\s+$", "")
            scalar("TRIM", Replace, 1, 1).with_transform(|args| trim_args(args, "^\\s+|\\s+$")),
            scalar("LTRIM", Replace, 1, 1).with_transform(|args| trim_args(args, "^\\s+")),
            scalar("RTRIM", Replace, 1, 1).with_transform(|args| trim_args(args, "\\s+$")),
            scalar("REPLACE", Replace, 3, 3),

            // ===== NUMERIC FUNCTIONS =====
            scalar("ABS", Abs, 1, 1),
            scalar("CEIL", Ceil, 1, 1),
            scalar("CEILING", Ceil, 1, 1),
            scalar("FLOOR", Floor, 1, 1),
            scalar("ROUND", Round, 1, 1),
            scalar("RAND", Rand, 0, 0),

            // ===== DATETIME FUNCTIONS =====
            scalar("NOW", Now, 0, 0),
            scalar("CURRENT_TIMESTAMP", Now, 0, 0),
            scalar("YEAR", Year, 1, 1),
            scalar("MONTH", Month, 1, 1),
            scalar("DAY", Day, 1, 1),
            scalar("DAYOFMONTH", Day, 1, 1),
            scalar("HOUR", Hours, 1, 1),
            scalar("MINUTE", Minutes, 1, 1),
            scalar("SECOND", Seconds, 1, 1),

            // ===== NULL HANDLING =====
            FunctionMapping::new("COALESCE", FunctionTarget::Scalar(Coalesce), 1, None),
            scalar("IFNULL", Coalesce, 2, 2),

            // ===== AGGREGATES =====
            aggregate("COUNT", AggregateFunction::Count),
            aggregate("SUM", AggregateFunction::Sum),
            aggregate("AVG", AggregateFunction::Avg),
            aggregate("MIN", AggregateFunction::Min),
            aggregate("MAX", AggregateFunction::Max),
        ]
    };
}

/// Name-keyed function table handed to the compiler.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionMapping>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the standard SQL function set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for mapping in STANDARD_FUNCTIONS.iter() {
            registry.register(mapping.clone());
        }
        registry
    }

    /// Add or replace a mapping. Lookup is case-insensitive.
    pub fn register(&mut self, mapping: FunctionMapping) {
        self.functions
            .insert(mapping.sql_name.to_ascii_uppercase(), mapping);
    }

    pub fn get(&self, name: &str) -> Option<&FunctionMapping> {
        self.functions.get(&name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
