use std::collections::HashSet;
use std::fmt::Write;

use super::errors::SparqlGeneratorError;
use crate::graph_expr::{escape_string, GraphExpr, Triple, Variable};
use crate::query_builder::algebra::{OptionalGroup, PatternElement, Projection, QueryAlgebra};

const INDENT: &str = "  ";

pub trait ToSparql {
    fn to_sparql(&self) -> Result<String, SparqlGeneratorError>;
}

impl ToSparql for GraphExpr {
    fn to_sparql(&self) -> Result<String, SparqlGeneratorError> {
        let sparql = match self {
            GraphExpr::Variable(v) => v.to_string(),
            GraphExpr::Constant(literal) => literal.to_string(),
            GraphExpr::Binary { op, left, right } => {
                format!("({} {} {})", left.to_sparql()?, op.symbol(), right.to_sparql()?)
            }
            GraphExpr::Not(inner) => format!("!({})", strip_parens(&inner.to_sparql()?)),
            GraphExpr::Negate(inner) => format!("-({})", strip_parens(&inner.to_sparql()?)),
            GraphExpr::Regex {
                expr,
                pattern,
                flags,
            } => match flags {
                Some(flags) => format!(
                    "REGEX({}, \"{}\", \"{}\")",
                    expr.to_sparql()?,
                    escape_string(pattern),
                    escape_string(flags)
                ),
                None => format!("REGEX({}, \"{}\")", expr.to_sparql()?, escape_string(pattern)),
            },
            GraphExpr::In {
                expr,
                list,
                negated,
            } => {
                let items = list
                    .iter()
                    .map(|item| item.to_sparql())
                    .collect::<Result<Vec<_>, _>>()?;
                format!(
                    "({} {} ({}))",
                    expr.to_sparql()?,
                    if *negated { "NOT IN" } else { "IN" },
                    items.join(", ")
                )
            }
            GraphExpr::Bound(v) => format!("BOUND({})", v),
            GraphExpr::Function { function, args } => {
                let args = args
                    .iter()
                    .map(|arg| arg.to_sparql())
                    .collect::<Result<Vec<_>, _>>()?;
                format!("{}({})", function.name(), args.join(", "))
            }
            GraphExpr::Aggregate {
                function,
                distinct,
                arg,
            } => {
                let arg = match arg {
                    Some(arg) => arg.to_sparql()?,
                    None => "*".to_string(),
                };
                let distinct = if *distinct { "DISTINCT " } else { "" };
                format!("{}({}{})", function.name(), distinct, arg)
            }
        };
        Ok(sparql)
    }
}

/// `(a = b)` -> `a = b`, only when the outer pair encloses everything.
fn strip_parens(rendered: &str) -> &str {
    let inner = match rendered
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
    {
        Some(inner) => inner,
        None => return rendered,
    };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for c in inner.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return rendered;
                }
            }
            _ => {}
        }
    }
    inner
}

/// Bracketed form required after FILTER, HAVING, ASC and DESC.
fn bracketed(expr: &GraphExpr) -> Result<String, SparqlGeneratorError> {
    Ok(format!("({})", strip_parens(&expr.to_sparql()?)))
}

impl ToSparql for Projection {
    fn to_sparql(&self) -> Result<String, SparqlGeneratorError> {
        if let Some(expression) = &self.expression {
            return Ok(format!(
                "({} AS {})",
                strip_parens(&expression.to_sparql()?),
                self.variable
            ));
        }
        if self.display_name == self.variable.name() {
            return Ok(self.variable.to_string());
        }
        Ok(format!("({} AS {})", self.variable, Variable::new(&self.display_name)))
    }
}

fn write_triples(out: &mut String, triples: &[Triple], depth: usize) {
    for triple in triples {
        let _ = writeln!(out, "{}{}", INDENT.repeat(depth), triple);
    }
}

fn write_group(out: &mut String, group: &OptionalGroup, depth: usize) -> Result<(), SparqlGeneratorError> {
    if group.is_empty() {
        return Err(SparqlGeneratorError::EmptyOptionalGroup);
    }
    let pad = INDENT.repeat(depth);
    let _ = writeln!(out, "{}OPTIONAL {{", pad);
    write_triples(out, &group.triples, depth + 1);
    for nested in &group.nested {
        let _ = writeln!(out, "{}{}OPTIONAL {{", pad, INDENT);
        write_triples(out, nested, depth + 2);
        let _ = writeln!(out, "{}{}}}", pad, INDENT);
    }
    for filter in &group.filters {
        let _ = writeln!(out, "{}{}FILTER {}", pad, INDENT, bracketed(filter)?);
    }
    let _ = writeln!(out, "{}}}", pad);
    Ok(())
}

fn write_elements(out: &mut String, elements: &[PatternElement], depth: usize) -> Result<(), SparqlGeneratorError> {
    let pad = INDENT.repeat(depth);
    for element in elements {
        match element {
            PatternElement::Required(triples) => write_triples(out, triples, depth),
            PatternElement::Optional(group) => write_group(out, group, depth)?,
            PatternElement::Bind { expr, variable } => {
                let _ = writeln!(
                    out,
                    "{}BIND({} AS {})",
                    pad,
                    strip_parens(&expr.to_sparql()?),
                    variable
                );
            }
            PatternElement::Filter(expr) => {
                let _ = writeln!(out, "{}FILTER {}", pad, bracketed(expr)?);
            }
        }
    }
    Ok(())
}

/// Result names introduced with `AS` must not already be bound by the
/// pattern.
fn check_display_names(algebra: &QueryAlgebra) -> Result<(), SparqlGeneratorError> {
    let pattern_vars: HashSet<&Variable> = algebra.columns().iter().map(|c| &c.variable).collect();
    for projection in algebra.projections() {
        if projection.expression.is_none() && projection.display_name != projection.variable.name() {
            let renamed = Variable::new(&projection.display_name);
            if pattern_vars.contains(&renamed) {
                return Err(SparqlGeneratorError::InvalidDisplayName {
                    name: projection.display_name.clone(),
                });
            }
            if renamed.name() != projection.display_name {
                log::warn!(
                    "Result column `{}` rendered as {}",
                    projection.display_name,
                    renamed
                );
            }
        }
    }
    Ok(())
}

impl ToSparql for QueryAlgebra {
    fn to_sparql(&self) -> Result<String, SparqlGeneratorError> {
        if self.projections().is_empty() {
            return Err(SparqlGeneratorError::EmptyProjection);
        }
        check_display_names(self)?;

        let mut out = String::new();
        for (prefix, namespace) in self.prefixes() {
            let _ = writeln!(out, "PREFIX {}: <{}>", prefix, namespace);
        }

        let projections = self
            .projections()
            .iter()
            .map(|p| p.to_sparql())
            .collect::<Result<Vec<_>, _>>()?;
        let _ = writeln!(
            out,
            "SELECT {}{}",
            if self.is_distinct() { "DISTINCT " } else { "" },
            projections.join(" ")
        );

        out.push_str("WHERE {\n");
        match self.service() {
            Some(endpoint) => {
                let _ = writeln!(out, "{}SERVICE <{}> {{", INDENT, endpoint);
                write_elements(&mut out, self.elements(), 2)?;
                let _ = writeln!(out, "{}}}", INDENT);
            }
            None => write_elements(&mut out, self.elements(), 1)?,
        }
        out.push_str("}\n");

        if !self.group_by().is_empty() {
            let keys = self
                .group_by()
                .iter()
                .map(|key| match key {
                    GraphExpr::Variable(v) => Ok(v.to_string()),
                    other => bracketed(other),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let _ = writeln!(out, "GROUP BY {}", keys.join(" "));
        }
        if !self.having().is_empty() {
            let conditions = self
                .having()
                .iter()
                .map(bracketed)
                .collect::<Result<Vec<_>, _>>()?;
            let _ = writeln!(out, "HAVING {}", conditions.join(" "));
        }
        if !self.order_by().is_empty() {
            let keys = self
                .order_by()
                .iter()
                .map(|o| {
                    Ok(format!(
                        "{}{}",
                        if o.ascending { "ASC" } else { "DESC" },
                        bracketed(&o.expr)?
                    ))
                })
                .collect::<Result<Vec<_>, SparqlGeneratorError>>()?;
            let _ = writeln!(out, "ORDER BY {}", keys.join(" "));
        }
        if let Some(limit) = self.limit() {
            let _ = writeln!(out, "LIMIT {}", limit);
        }
        if let Some(offset) = self.offset() {
            let _ = writeln!(out, "OFFSET {}", offset);
        }

        log::debug!("Generated SPARQL:\n{}", out);
        Ok(out)
    }
}
