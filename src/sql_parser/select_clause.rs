use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::terminated,
    IResult, Parser,
};

use super::{
    ast::SelectItem,
    common::{keyword, parse_alias, parse_object_name, ws},
    errors::{committed, recoverable, SqlParsingError},
    expression::parse_expression,
};

/// `SELECT [DISTINCT | ALL] item, ...`, returning the DISTINCT flag and the
/// items.
pub fn parse_select_clause(
    input: &'_ str,
) -> IResult<&'_ str, (bool, Vec<SelectItem>), SqlParsingError<'_>> {
    let (input, _) = keyword("SELECT").parse(input).map_err(recoverable)?;

    let (input, distinct) = opt(alt((
        value(true, keyword("DISTINCT")),
        value(false, keyword("ALL")),
    )))
    .parse(input)
    .map_err(recoverable)?;

    let (input, items) = separated_list1(ws(char(',')), parse_select_item)
        .parse(input)
        .map_err(committed("Error in select clause"))?;

    Ok((input, (distinct.unwrap_or(false), items)))
}

fn parse_select_item(input: &str) -> IResult<&str, SelectItem> {
    alt((
        value(SelectItem::Wildcard, ws(char('*'))),
        map(
            terminated(parse_object_name, (ws(char('.')), ws(char('*')))),
            SelectItem::QualifiedWildcard,
        ),
        map((parse_expression, opt(parse_alias)), |(expr, alias)| {
            SelectItem::Expr { expr, alias }
        }),
    ))
    .parse(input)
}
