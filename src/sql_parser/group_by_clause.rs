use nom::{character::complete::char, multi::separated_list1, IResult, Parser};

use super::{
    ast::SqlExpr,
    common::{keyword, ws},
    errors::{committed, recoverable, SqlParsingError},
    expression::parse_expression,
};

/// `GROUP BY expr, ...`
pub fn parse_group_by_clause(
    input: &'_ str,
) -> IResult<&'_ str, Vec<SqlExpr>, SqlParsingError<'_>> {
    let (input, _) = (keyword("GROUP"), keyword("BY"))
        .parse(input)
        .map_err(recoverable)?;

    separated_list1(ws(char(',')), parse_expression)
        .parse(input)
        .map_err(committed("Error in group by clause"))
}
