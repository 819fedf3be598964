use nom::{combinator::opt, IResult, Parser};

use super::{
    ast::SelectStatement,
    errors::SqlParsingError,
    from_clause::parse_from_clause,
    group_by_clause::parse_group_by_clause,
    order_by_and_page_clause::parse_order_by_and_page_clause,
    select_clause::parse_select_clause,
    where_clause::{parse_having_clause, parse_where_clause},
};

/// One `SELECT` query block, without the statement terminator.
pub fn parse_select(input: &'_ str) -> IResult<&'_ str, SelectStatement, SqlParsingError<'_>> {
    let (input, (distinct, projection)) = parse_select_clause(input)?;
    let (input, from) = opt(parse_from_clause).parse(input)?;
    let (input, where_clause) = opt(parse_where_clause).parse(input)?;
    let (input, group_by) = opt(parse_group_by_clause).parse(input)?;
    let (input, having) = opt(parse_having_clause).parse(input)?;
    let (input, page) = parse_order_by_and_page_clause(input)?;

    Ok((
        input,
        SelectStatement {
            distinct,
            projection,
            from: from.unwrap_or_default(),
            where_clause,
            group_by: group_by.unwrap_or_default(),
            having,
            order_by: page.order_by,
            limit: page.limit,
            offset: page.offset,
        },
    ))
}
