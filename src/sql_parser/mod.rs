//! Parser for the SQL `SELECT` dialect accepted by the compiler.

use nom::{
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{cut, eof, opt},
    error::context,
    IResult, Parser,
};

use ast::SelectStatement;
use common::ws;
use errors::SqlParsingError;

pub mod ast;
mod common;
pub mod errors;
mod expression;
mod from_clause;
mod group_by_clause;
mod order_by_and_page_clause;
mod select_clause;
mod select_statement;
mod where_clause;

/// Parse one complete statement: a query block, an optional `;`, then
/// nothing else.
pub fn parse_select_statement(
    input: &'_ str,
) -> IResult<&'_ str, SelectStatement, SqlParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;

    let (input, statement) = select_statement::parse_select(input)?;

    let (input, _) = opt(ws(tag(";"))).parse(input)?;
    let (input, _) = context("Unexpected trailing input", cut(eof)).parse(input)?;

    Ok((input, statement))
}

pub fn parse_statement(input: &str) -> Result<SelectStatement, SqlParsingError<'_>> {
    match parse_select_statement(input) {
        Ok((_, statement)) => Ok(statement),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(err),
        Err(nom::Err::Incomplete(_)) => Err(SqlParsingError::new(input, "Incomplete input")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_parser::ast::{JoinOperator, SelectItem};

    #[test]
    fn test_statement_with_terminator() {
        let statement = parse_statement("  SELECT * FROM foo ;  ").unwrap();
        assert_eq!(statement.projection, vec![SelectItem::Wildcard]);
    }

    #[test]
    fn test_join_statement() {
        let statement = parse_statement(
            "SELECT foo.StringCol, bar.BarStringCol FROM foo LEFT JOIN bar ON foo.IntCol = bar.IntCol",
        )
        .unwrap();
        assert!(matches!(
            statement.from[0].joins[0].operator,
            JoinOperator::LeftOuter(Some(_))
        ));
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse_statement("SELECT * FROM foo UNION SELECT * FROM bar").unwrap_err();
        assert!(err
            .errors
            .iter()
            .any(|(_, ctx)| *ctx == "Unexpected trailing input"));
        assert!(err.to_string().contains("UNION SELECT"));
    }

    #[test]
    fn test_not_a_query() {
        assert!(parse_statement("DELETE FROM foo").is_err());
        assert!(parse_statement("").is_err());
    }
}
