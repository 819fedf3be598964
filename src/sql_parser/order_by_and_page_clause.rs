use nom::{
    branch::alt,
    character::complete::char,
    combinator::{opt, value},
    multi::separated_list1,
    IResult, Parser,
};

use super::{
    ast::OrderByItem,
    common::{keyword, parse_u64, ws},
    errors::{committed, recoverable, SqlParsingError},
    expression::parse_expression,
};

/// Trailing `ORDER BY`, `LIMIT` and `OFFSET` of a select statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderByAndPageClause {
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// `[ORDER BY item, ...] [LIMIT n] [OFFSET m]`. `OFFSET` may also precede
/// `LIMIT`. Every part is optional, so this never fails on absent clauses.
pub fn parse_order_by_and_page_clause(
    input: &'_ str,
) -> IResult<&'_ str, OrderByAndPageClause, SqlParsingError<'_>> {
    let (input, order_by) = opt(parse_order_by_clause).parse(input)?;
    let (input, limit) = opt(parse_limit_clause).parse(input)?;
    let (input, offset) = opt(parse_offset_clause).parse(input)?;
    let (input, limit) = match limit {
        Some(limit) => (input, Some(limit)),
        None => opt(parse_limit_clause).parse(input)?,
    };

    Ok((
        input,
        OrderByAndPageClause {
            order_by: order_by.unwrap_or_default(),
            limit,
            offset,
        },
    ))
}

fn parse_order_by_clause(input: &'_ str) -> IResult<&'_ str, Vec<OrderByItem>, SqlParsingError<'_>> {
    let (input, _) = (keyword("ORDER"), keyword("BY"))
        .parse(input)
        .map_err(recoverable)?;

    separated_list1(ws(char(',')), parse_order_by_item)
        .parse(input)
        .map_err(committed("Error in order by clause"))
}

fn parse_order_by_item(input: &str) -> IResult<&str, OrderByItem> {
    let (input, expr) = parse_expression(input)?;
    let (input, direction) = opt(alt((
        value(true, keyword("ASC")),
        value(false, keyword("DESC")),
    )))
    .parse(input)?;
    Ok((
        input,
        OrderByItem {
            expr,
            ascending: direction.unwrap_or(true),
        },
    ))
}

fn parse_limit_clause(input: &'_ str) -> IResult<&'_ str, u64, SqlParsingError<'_>> {
    let (input, _) = keyword("LIMIT").parse(input).map_err(recoverable)?;
    parse_u64(input).map_err(committed("Error in limit clause"))
}

fn parse_offset_clause(input: &'_ str) -> IResult<&'_ str, u64, SqlParsingError<'_>> {
    let (input, _) = keyword("OFFSET").parse(input).map_err(recoverable)?;
    parse_u64(input).map_err(committed("Error in offset clause"))
}
