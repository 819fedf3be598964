use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, not, opt, peek, value, verify},
    multi::{many1, separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated},
    IResult, Parser,
};

use super::ast::{
    BinaryOperator, FunctionCall, SelectStatement, SqlExpr, SqlLiteral, UnaryOperator,
};
use super::common::{
    is_reserved, keyword, parse_object_name, parse_string_literal, parse_unsigned_number,
    parse_word, ws,
};
use super::select_statement;

pub fn parse_expression(input: &str) -> IResult<&str, SqlExpr> {
    parse_logical_or(input)
}

fn parse_logical_or(input: &str) -> IResult<&str, SqlExpr> {
    let (mut input, mut expr) = parse_logical_and(input)?;

    loop {
        match preceded(keyword("OR"), parse_logical_and).parse(input) {
            Ok((rest, right)) => {
                expr = SqlExpr::binary(expr, BinaryOperator::Or, right);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, expr))
}

fn parse_logical_and(input: &str) -> IResult<&str, SqlExpr> {
    let (mut input, mut expr) = parse_logical_not(input)?;

    loop {
        match preceded(keyword("AND"), parse_logical_not).parse(input) {
            Ok((rest, right)) => {
                expr = SqlExpr::binary(expr, BinaryOperator::And, right);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, expr))
}

fn parse_logical_not(input: &str) -> IResult<&str, SqlExpr> {
    alt((
        map(preceded(keyword("NOT"), parse_logical_not), |expr| {
            SqlExpr::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(expr),
            }
        }),
        parse_predicate,
    ))
    .parse(input)
}

fn parse_comparison_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(alt((
        value(BinaryOperator::LtEq, tag("<=")),
        value(BinaryOperator::GtEq, tag(">=")),
        value(BinaryOperator::NotEq, tag("<>")),
        value(BinaryOperator::NotEq, tag("!=")),
        value(BinaryOperator::Eq, tag("=")),
        value(BinaryOperator::Lt, tag("<")),
        value(BinaryOperator::Gt, tag(">")),
        value(BinaryOperator::Matches, tag("@@")),
    )))
    .parse(input)
}

enum PredicateSuffix {
    Compare(BinaryOperator, SqlExpr),
    Quantified {
        op: BinaryOperator,
        all: bool,
        subquery: SelectStatement,
    },
    Like {
        negated: bool,
        pattern: SqlExpr,
    },
    Between {
        negated: bool,
        low: SqlExpr,
        high: SqlExpr,
    },
    InList {
        negated: bool,
        list: Vec<SqlExpr>,
    },
    InSubquery {
        negated: bool,
        subquery: SelectStatement,
    },
    IsNull {
        negated: bool,
    },
}

pub(super) fn parse_subquery(input: &str) -> IResult<&str, SelectStatement> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, statement) =
        select_statement::parse_select(input).map_err(|e| e.map(nom::error::Error::from))?;
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((input, statement))
}

fn parse_quantified_comparison(input: &str) -> IResult<&str, PredicateSuffix> {
    let (input, op) = parse_comparison_operator(input)?;
    let (input, all) = alt((
        value(true, keyword("ALL")),
        value(false, keyword("ANY")),
        value(false, keyword("SOME")),
    ))
    .parse(input)?;
    let (input, subquery) = parse_subquery(input)?;
    Ok((input, PredicateSuffix::Quantified { op, all, subquery }))
}

fn parse_comparison(input: &str) -> IResult<&str, PredicateSuffix> {
    let (input, op) = parse_comparison_operator(input)?;
    let (input, right) = parse_bitwise(input)?;
    Ok((input, PredicateSuffix::Compare(op, right)))
}

fn parse_is_null(input: &str) -> IResult<&str, PredicateSuffix> {
    let (input, _) = keyword("IS").parse(input)?;
    let (input, negated) = opt(keyword("NOT")).parse(input)?;
    let (input, _) = keyword("NULL").parse(input)?;
    Ok((
        input,
        PredicateSuffix::IsNull {
            negated: negated.is_some(),
        },
    ))
}

fn parse_negatable_predicate(input: &str) -> IResult<&str, PredicateSuffix> {
    let (input, negated) = map(opt(keyword("NOT")), |n| n.is_some()).parse(input)?;

    if let Ok((input, _)) = keyword("LIKE").parse(input) {
        let (input, pattern) = parse_bitwise(input)?;
        return Ok((input, PredicateSuffix::Like { negated, pattern }));
    }

    if let Ok((input, _)) = keyword("BETWEEN").parse(input) {
        let (input, low) = parse_bitwise(input)?;
        let (input, _) = keyword("AND").parse(input)?;
        let (input, high) = parse_bitwise(input)?;
        return Ok((input, PredicateSuffix::Between { negated, low, high }));
    }

    let (input, _) = keyword("IN").parse(input)?;
    if let Ok((input, subquery)) = parse_subquery(input) {
        return Ok((input, PredicateSuffix::InSubquery { negated, subquery }));
    }
    let (input, list) = delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), parse_expression),
        ws(char(')')),
    )
    .parse(input)?;
    Ok((input, PredicateSuffix::InList { negated, list }))
}

fn parse_predicate(input: &str) -> IResult<&str, SqlExpr> {
    let (mut input, mut expr) = parse_bitwise(input)?;

    loop {
        let suffix = alt((
            parse_quantified_comparison,
            parse_comparison,
            parse_is_null,
            parse_negatable_predicate,
        ))
        .parse(input);

        let (rest, suffix) = match suffix {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        };
        input = rest;

        let left = Box::new(expr);
        expr = match suffix {
            PredicateSuffix::Compare(op, right) => SqlExpr::BinaryOp {
                left,
                op,
                right: Box::new(right),
            },
            PredicateSuffix::Quantified { op, all, subquery } => {
                if all {
                    SqlExpr::AllComparison {
                        left,
                        op,
                        subquery: Box::new(subquery),
                    }
                } else {
                    SqlExpr::AnyComparison {
                        left,
                        op,
                        subquery: Box::new(subquery),
                    }
                }
            }
            PredicateSuffix::Like { negated, pattern } => SqlExpr::Like {
                negated,
                expr: left,
                pattern: Box::new(pattern),
            },
            PredicateSuffix::Between { negated, low, high } => SqlExpr::Between {
                negated,
                expr: left,
                low: Box::new(low),
                high: Box::new(high),
            },
            PredicateSuffix::InList { negated, list } => SqlExpr::InList {
                negated,
                expr: left,
                list,
            },
            PredicateSuffix::InSubquery { negated, subquery } => SqlExpr::InSubquery {
                negated,
                expr: left,
                subquery: Box::new(subquery),
            },
            PredicateSuffix::IsNull { negated } => SqlExpr::IsNull { negated, expr: left },
        };
    }

    Ok((input, expr))
}

/// Left-associative chain of `operand (op operand)*`.
fn parse_binary_chain<'a>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, SqlExpr>,
    operator: fn(&'a str) -> IResult<&'a str, BinaryOperator>,
) -> IResult<&'a str, SqlExpr> {
    let (mut input, mut expr) = operand(input)?;

    loop {
        match (operator, operand).parse(input) {
            Ok((rest, (op, right))) => {
                expr = SqlExpr::binary(expr, op, right);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((input, expr))
}

fn parse_bitwise_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(alt((
        value(BinaryOperator::BitwiseAnd, char('&')),
        value(
            BinaryOperator::BitwiseOr,
            terminated(char('|'), not(peek(char('|')))),
        ),
        value(BinaryOperator::BitwiseXor, char('^')),
    )))
    .parse(input)
}

fn parse_additive_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(alt((
        value(BinaryOperator::Concat, tag("||")),
        value(BinaryOperator::Plus, char('+')),
        value(BinaryOperator::Minus, char('-')),
    )))
    .parse(input)
}

fn parse_multiplicative_operator(input: &str) -> IResult<&str, BinaryOperator> {
    ws(alt((
        value(BinaryOperator::Multiply, char('*')),
        value(BinaryOperator::Divide, char('/')),
        value(BinaryOperator::Modulo, char('%')),
    )))
    .parse(input)
}

fn parse_bitwise(input: &str) -> IResult<&str, SqlExpr> {
    parse_binary_chain(input, parse_additive, parse_bitwise_operator)
}

fn parse_additive(input: &str) -> IResult<&str, SqlExpr> {
    parse_binary_chain(input, parse_multiplicative, parse_additive_operator)
}

fn parse_multiplicative(input: &str) -> IResult<&str, SqlExpr> {
    parse_binary_chain(input, parse_unary, parse_multiplicative_operator)
}

fn parse_unary(input: &str) -> IResult<&str, SqlExpr> {
    if let Ok((rest, _)) = ws(char::<&str, nom::error::Error<&str>>('-')).parse(input) {
        let (rest, operand) = parse_unary(rest)?;
        let negated = match operand {
            SqlExpr::Literal(SqlLiteral::Integer(i)) if i != i64::MIN => {
                SqlExpr::Literal(SqlLiteral::Integer(-i))
            }
            SqlExpr::Literal(SqlLiteral::Decimal(d)) => {
                SqlExpr::Literal(SqlLiteral::Decimal(format!("-{}", d)))
            }
            other => SqlExpr::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(other),
            },
        };
        return Ok((rest, negated));
    }
    if let Ok((rest, _)) = ws(char::<&str, nom::error::Error<&str>>('+')).parse(input) {
        let (rest, operand) = parse_unary(rest)?;
        return Ok((
            rest,
            SqlExpr::UnaryOp {
                op: UnaryOperator::Plus,
                expr: Box::new(operand),
            },
        ));
    }
    parse_primary(input)
}

fn parse_primary(input: &str) -> IResult<&str, SqlExpr> {
    alt((
        parse_parenthesized,
        map(ws(char('?')), |_| SqlExpr::Parameter),
        parse_jdbc_escape_literal,
        parse_typed_literal,
        map(parse_string_literal, |s| SqlExpr::Literal(SqlLiteral::String(s))),
        parse_number_literal,
        value(SqlExpr::Literal(SqlLiteral::Boolean(true)), keyword("TRUE")),
        value(SqlExpr::Literal(SqlLiteral::Boolean(false)), keyword("FALSE")),
        value(SqlExpr::Literal(SqlLiteral::Null), keyword("NULL")),
        parse_case_expression,
        map(preceded(keyword("EXISTS"), parse_subquery), |s| {
            SqlExpr::Exists(Box::new(s))
        }),
        parse_function_call,
        map(parse_object_name, SqlExpr::Column),
    ))
    .parse(input)
}

fn parse_parenthesized(input: &str) -> IResult<&str, SqlExpr> {
    if let Ok((rest, subquery)) = parse_subquery(input) {
        return Ok((rest, SqlExpr::Subquery(Box::new(subquery))));
    }
    map(
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
        |e| SqlExpr::Nested(Box::new(e)),
    )
    .parse(input)
}

fn parse_number_literal(input: &str) -> IResult<&str, SqlExpr> {
    let (rest, (text, is_decimal)) = parse_unsigned_number(input)?;
    let literal = if is_decimal {
        SqlLiteral::Decimal(text.to_string())
    } else {
        match text.parse::<i64>() {
            Ok(i) => SqlLiteral::Integer(i),
            Err(_) => SqlLiteral::Decimal(text.to_string()),
        }
    };
    Ok((rest, SqlExpr::Literal(literal)))
}

/// `DATE '2024-01-01'`, `TIME '10:00:00'`, `TIMESTAMP '...'`
fn parse_typed_literal(input: &str) -> IResult<&str, SqlExpr> {
    alt((
        map(preceded(keyword("DATE"), parse_string_literal), |s| {
            SqlExpr::Literal(SqlLiteral::Date(s))
        }),
        map(preceded(keyword("TIMESTAMP"), parse_string_literal), |s| {
            SqlExpr::Literal(SqlLiteral::Timestamp(s))
        }),
        map(preceded(keyword("TIME"), parse_string_literal), |s| {
            SqlExpr::Literal(SqlLiteral::Time(s))
        }),
    ))
    .parse(input)
}

/// JDBC escapes `{d '...'}`, `{t '...'}`, `{ts '...'}`
fn parse_jdbc_escape_literal(input: &str) -> IResult<&str, SqlExpr> {
    delimited(
        ws(char('{')),
        alt((
            map(preceded(keyword("TS"), parse_string_literal), SqlLiteral::Timestamp),
            map(preceded(keyword("D"), parse_string_literal), SqlLiteral::Date),
            map(preceded(keyword("T"), parse_string_literal), SqlLiteral::Time),
        )),
        ws(char('}')),
    )
    .map(SqlExpr::Literal)
    .parse(input)
}

fn parse_case_expression(input: &str) -> IResult<&str, SqlExpr> {
    let (input, _) = keyword("CASE").parse(input)?;
    let (input, operand) = if peek(keyword("WHEN")).parse(input).is_ok() {
        (input, None)
    } else {
        let (input, operand) = parse_expression(input)?;
        (input, Some(Box::new(operand)))
    };
    let (input, conditions) = many1((
        preceded(keyword("WHEN"), parse_expression),
        preceded(keyword("THEN"), parse_expression),
    ))
    .parse(input)?;
    let (input, else_result) = opt(preceded(keyword("ELSE"), parse_expression)).parse(input)?;
    let (input, _) = keyword("END").parse(input)?;
    Ok((
        input,
        SqlExpr::Case {
            operand,
            conditions,
            else_result: else_result.map(Box::new),
        },
    ))
}

/// Function names may shadow a few keywords (`LEFT(s, 2)`).
fn is_function_name(word: &str) -> bool {
    !is_reserved(word) || word.eq_ignore_ascii_case("LEFT") || word.eq_ignore_ascii_case("RIGHT")
}

fn parse_function_call(input: &str) -> IResult<&str, SqlExpr> {
    let (input, name) = ws(verify(parse_word, |w: &str| is_function_name(w))).parse(input)?;
    let (input, _) = ws(char('(')).parse(input)?;

    let (input, star) = opt(ws(char('*'))).parse(input)?;
    let (input, distinct, args) = if star.is_some() {
        (input, false, Vec::new())
    } else {
        let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;
        let (input, args) = separated_list0(ws(char(',')), parse_expression).parse(input)?;
        (input, distinct.is_some(), args)
    };
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        SqlExpr::Function(FunctionCall {
            name: name.to_string(),
            args,
            distinct,
            star: star.is_some(),
        }),
    ))
}
