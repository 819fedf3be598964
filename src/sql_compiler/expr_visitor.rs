//! SQL expression to graph filter expression transducer.
//!
//! The walk is post-order and driven by an explicit work stack instead of
//! recursion: composite nodes schedule a combine task and then their
//! children, right to left, so children are compiled left to right and their
//! results are waiting on the output stack when the combine task runs.

use crate::graph_catalog::item_name::ItemName;
use crate::graph_expr::{BinaryOp, GraphExpr, Literal};
use crate::query_builder::errors::QueryBuilderError;
use crate::query_builder::QueryBuilder;
use crate::sql_parser::ast::{BinaryOperator, FunctionCall, ObjectName, SqlExpr, SqlLiteral, UnaryOperator};

use super::errors::CompileError;
use super::function_registry::{FunctionMapping, FunctionRegistry, FunctionTarget};
use super::like_pattern::like_filter;

enum Task<'e> {
    Visit(&'e SqlExpr),
    Binary(BinaryOp),
    Not,
    Negate,
    Between { negated: bool },
    InList { negated: bool, len: usize },
    Like { negated: bool },
    IsNull { negated: bool },
    Call {
        mapping: FunctionMapping,
        argc: usize,
        distinct: bool,
    },
}

pub struct SqlExprVisitor<'v, 'c> {
    builder: &'v mut QueryBuilder<'c>,
    functions: &'v FunctionRegistry,
    /// Register newly seen columns as OPTIONAL (outer join context).
    optional_columns: bool,
    allow_aggregates: bool,
    /// Let single-part names fall back to select-list aliases.
    resolve_aliases: bool,
    /// Clause name used in error messages.
    context: &'static str,
}

impl<'v, 'c> SqlExprVisitor<'v, 'c> {
    pub fn new(
        builder: &'v mut QueryBuilder<'c>,
        functions: &'v FunctionRegistry,
        context: &'static str,
    ) -> Self {
        SqlExprVisitor {
            builder,
            functions,
            optional_columns: false,
            allow_aggregates: false,
            resolve_aliases: false,
            context,
        }
    }

    pub fn optional_columns(mut self, optional: bool) -> Self {
        self.optional_columns = optional;
        self
    }

    pub fn allow_aggregates(mut self, allow: bool) -> Self {
        self.allow_aggregates = allow;
        self
    }

    pub fn resolve_aliases(mut self, resolve: bool) -> Self {
        self.resolve_aliases = resolve;
        self
    }

    pub fn visit(&mut self, root: &SqlExpr) -> Result<GraphExpr, CompileError> {
        let mut tasks = vec![Task::Visit(root)];
        let mut output: Vec<GraphExpr> = Vec::new();

        while let Some(task) = tasks.pop() {
            match task {
                Task::Visit(expr) => self.schedule(expr, &mut tasks, &mut output)?,
                Task::Binary(op) => {
                    let right = pop(&mut output)?;
                    let left = pop(&mut output)?;
                    output.push(GraphExpr::binary(op, left, right));
                }
                Task::Not => {
                    let inner = pop(&mut output)?;
                    output.push(GraphExpr::not(inner));
                }
                Task::Negate => {
                    let inner = pop(&mut output)?;
                    output.push(GraphExpr::Negate(Box::new(inner)));
                }
                Task::Between { negated } => {
                    let high = pop(&mut output)?;
                    let low = pop(&mut output)?;
                    let expr = pop(&mut output)?;
                    // one compiled operand shared by both bounds
                    let range = GraphExpr::and(
                        GraphExpr::binary(BinaryOp::GreaterThanOrEqual, expr.clone(), low),
                        GraphExpr::binary(BinaryOp::LessThanOrEqual, expr, high),
                    );
                    output.push(if negated { GraphExpr::not(range) } else { range });
                }
                Task::InList { negated, len } => {
                    let list = pop_n(&mut output, len)?;
                    let expr = pop(&mut output)?;
                    output.push(GraphExpr::In {
                        expr: Box::new(expr),
                        list,
                        negated,
                    });
                }
                Task::Like { negated } => {
                    let pattern = pop(&mut output)?;
                    let expr = pop(&mut output)?;
                    let filter = like_filter(expr, &pattern)?;
                    output.push(if negated { GraphExpr::not(filter) } else { filter });
                }
                Task::IsNull { negated } => {
                    let expr = pop(&mut output)?;
                    let variable = match expr {
                        GraphExpr::Variable(v) => v,
                        _ => {
                            return Err(CompileError::unsupported_with_context(
                                "IS NULL on a computed expression",
                                self.context,
                            ))
                        }
                    };
                    // unbound is how a missing optional value surfaces
                    let bound = GraphExpr::Bound(variable);
                    output.push(if negated { bound } else { GraphExpr::not(bound) });
                }
                Task::Call {
                    mapping,
                    argc,
                    distinct,
                } => {
                    let args = pop_n(&mut output, argc)?;
                    output.push(self.call(&mapping, args, distinct)?);
                }
            }
        }

        let result = pop(&mut output)?;
        if !output.is_empty() {
            return Err(CompileError::EmptyExpression);
        }
        Ok(result)
    }

    fn schedule<'e>(
        &mut self,
        expr: &'e SqlExpr,
        tasks: &mut Vec<Task<'e>>,
        output: &mut Vec<GraphExpr>,
    ) -> Result<(), CompileError> {
        match expr {
            SqlExpr::Column(name) => output.push(self.column(name)?),
            SqlExpr::Literal(literal) => output.push(GraphExpr::Constant(self.literal(literal)?)),
            SqlExpr::Nested(inner) => tasks.push(Task::Visit(inner)),
            SqlExpr::BinaryOp { left, op, right } => {
                tasks.push(Task::Binary(self.binary_op(*op)?));
                tasks.push(Task::Visit(right));
                tasks.push(Task::Visit(left));
            }
            SqlExpr::UnaryOp { op, expr } => {
                match op {
                    UnaryOperator::Not => tasks.push(Task::Not),
                    UnaryOperator::Minus => tasks.push(Task::Negate),
                    UnaryOperator::Plus => {}
                }
                tasks.push(Task::Visit(expr));
            }
            SqlExpr::Like {
                negated,
                expr,
                pattern,
            } => {
                tasks.push(Task::Like { negated: *negated });
                tasks.push(Task::Visit(pattern));
                tasks.push(Task::Visit(expr));
            }
            SqlExpr::Between {
                negated,
                expr,
                low,
                high,
            } => {
                tasks.push(Task::Between { negated: *negated });
                tasks.push(Task::Visit(high));
                tasks.push(Task::Visit(low));
                tasks.push(Task::Visit(expr));
            }
            SqlExpr::InList {
                negated,
                expr,
                list,
            } => {
                tasks.push(Task::InList {
                    negated: *negated,
                    len: list.len(),
                });
                for item in list.iter().rev() {
                    tasks.push(Task::Visit(item));
                }
                tasks.push(Task::Visit(expr));
            }
            SqlExpr::IsNull { negated, expr } => {
                tasks.push(Task::IsNull { negated: *negated });
                tasks.push(Task::Visit(expr));
            }
            SqlExpr::Function(call) => self.schedule_call(call, tasks)?,
            SqlExpr::Parameter => return Err(self.unsupported("parameter placeholder")),
            SqlExpr::InSubquery { .. } => return Err(self.unsupported("IN (subquery)")),
            SqlExpr::Exists(_) => return Err(self.unsupported("EXISTS")),
            SqlExpr::Subquery(_) => return Err(self.unsupported("subquery")),
            SqlExpr::AnyComparison { .. } => return Err(self.unsupported("ANY")),
            SqlExpr::AllComparison { .. } => return Err(self.unsupported("ALL")),
            SqlExpr::Case { .. } => return Err(self.unsupported("CASE")),
        }
        Ok(())
    }

    fn unsupported(&self, construct: &str) -> CompileError {
        CompileError::unsupported_with_context(construct, self.context)
    }

    fn column(&mut self, name: &ObjectName) -> Result<GraphExpr, CompileError> {
        let item = ItemName::from_column_parts(name.parts())
            .ok_or_else(|| self.unsupported(&format!("column name `{}`", name)))?;

        match self.builder.add_column(&item, self.optional_columns) {
            Ok(variable) => Ok(GraphExpr::Variable(variable)),
            Err(err @ QueryBuilderError::UnknownColumn { .. }) if self.resolve_aliases => {
                match self.builder.projection_variable(item.short_name()) {
                    Some(variable) if name.parts().len() == 1 => {
                        log::debug!("{} resolved to select alias {}", name, variable);
                        Ok(GraphExpr::Variable(variable.clone()))
                    }
                    _ => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn literal(&self, literal: &SqlLiteral) -> Result<Literal, CompileError> {
        Ok(match literal {
            SqlLiteral::String(s) => Literal::String(s.clone()),
            SqlLiteral::Integer(i) => Literal::Integer(*i),
            SqlLiteral::Decimal(d) => Literal::Decimal(d.clone()),
            SqlLiteral::Boolean(b) => Literal::Boolean(*b),
            SqlLiteral::Date(d) => Literal::Date(d.clone()),
            SqlLiteral::Time(t) => Literal::Time(t.clone()),
            SqlLiteral::Timestamp(t) => Literal::Timestamp(t.clone()),
            SqlLiteral::Null => return Err(self.unsupported("NULL literal")),
        })
    }

    fn binary_op(&self, op: BinaryOperator) -> Result<BinaryOp, CompileError> {
        Ok(match op {
            BinaryOperator::And => BinaryOp::And,
            BinaryOperator::Or => BinaryOp::Or,
            BinaryOperator::Eq => BinaryOp::Equals,
            BinaryOperator::NotEq => BinaryOp::NotEquals,
            BinaryOperator::Lt => BinaryOp::LessThan,
            BinaryOperator::LtEq => BinaryOp::LessThanOrEqual,
            BinaryOperator::Gt => BinaryOp::GreaterThan,
            BinaryOperator::GtEq => BinaryOp::GreaterThanOrEqual,
            BinaryOperator::Plus => BinaryOp::Add,
            BinaryOperator::Minus => BinaryOp::Subtract,
            BinaryOperator::Multiply => BinaryOp::Multiply,
            BinaryOperator::Divide => BinaryOp::Divide,
            BinaryOperator::Modulo => return Err(self.unsupported("modulo operator")),
            BinaryOperator::BitwiseAnd | BinaryOperator::BitwiseOr | BinaryOperator::BitwiseXor => {
                return Err(self.unsupported(&format!("bitwise operator {}", op.symbol())))
            }
            BinaryOperator::Concat => return Err(self.unsupported("CONCAT")),
            BinaryOperator::Matches => return Err(self.unsupported("MATCHES")),
        })
    }

    fn schedule_call<'e>(&self, call: &'e FunctionCall, tasks: &mut Vec<Task<'e>>) -> Result<(), CompileError> {
        if call.name.eq_ignore_ascii_case("CONCAT") {
            return Err(self.unsupported("CONCAT"));
        }
        let mapping = self
            .functions
            .get(&call.name)
            .ok_or_else(|| CompileError::UnsupportedFunction {
                name: call.name.to_ascii_uppercase(),
            })?;
        log::debug!("Dispatching {}() to {:?}", call.name, mapping.target);

        match mapping.target {
            FunctionTarget::Aggregate(function) => {
                if !self.allow_aggregates {
                    return Err(self.unsupported(&format!("aggregate {}", function.name())));
                }
                if call.star && function != crate::graph_expr::AggregateFunction::Count {
                    return Err(self.unsupported(&format!("{}(*)", function.name())));
                }
            }
            FunctionTarget::Scalar(_) => {
                if call.distinct || call.star {
                    return Err(self.unsupported(&format!("{} with DISTINCT or *", call.name)));
                }
            }
        }

        let argc = call.args.len();
        if !call.star && !mapping.accepts(argc) {
            return Err(CompileError::ArgumentCount {
                function: mapping.sql_name.to_string(),
                expected: mapping.arity(),
                actual: argc,
            });
        }

        tasks.push(Task::Call {
            mapping: mapping.clone(),
            argc,
            distinct: call.distinct,
        });
        for arg in call.args.iter().rev() {
            tasks.push(Task::Visit(arg));
        }
        Ok(())
    }

    fn call(&self, mapping: &FunctionMapping, args: Vec<GraphExpr>, distinct: bool) -> Result<GraphExpr, CompileError> {
        let args = match mapping.arg_transform {
            Some(transform) => transform(args),
            None => args,
        };

        match mapping.target {
            FunctionTarget::Scalar(function) => Ok(GraphExpr::Function { function, args }),
            FunctionTarget::Aggregate(function) => {
                let arg = args.into_iter().next();
                if arg.as_ref().map(GraphExpr::contains_aggregate).unwrap_or(false) {
                    return Err(self.unsupported("nested aggregate"));
                }
                Ok(GraphExpr::Aggregate {
                    function,
                    distinct,
                    arg: arg.map(Box::new),
                })
            }
        }
    }
}

fn pop(output: &mut Vec<GraphExpr>) -> Result<GraphExpr, CompileError> {
    output.pop().ok_or(CompileError::EmptyExpression)
}

fn pop_n(output: &mut Vec<GraphExpr>, count: usize) -> Result<Vec<GraphExpr>, CompileError> {
    if output.len() < count {
        return Err(CompileError::EmptyExpression);
    }
    Ok(output.split_off(output.len() - count))
}
