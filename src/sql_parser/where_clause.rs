use nom::{IResult, Parser};

use super::{
    ast::SqlExpr,
    common::keyword,
    errors::{committed, recoverable, SqlParsingError},
    expression::parse_expression,
};

pub fn parse_where_clause(input: &'_ str) -> IResult<&'_ str, SqlExpr, SqlParsingError<'_>> {
    let (input, _) = keyword("WHERE").parse(input).map_err(recoverable)?;

    parse_expression(input).map_err(committed("Error in where clause"))
}

pub fn parse_having_clause(input: &'_ str) -> IResult<&'_ str, SqlExpr, SqlParsingError<'_>> {
    let (input, _) = keyword("HAVING").parse(input).map_err(recoverable)?;

    parse_expression(input).map_err(committed("Error in having clause"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_parser::ast::{BinaryOperator, SqlLiteral};
    use nom::Err;

    #[test]
    fn test_parse_where_clause_valid() {
        let (rest, expr) = parse_where_clause("WHERE StringCol != 'baz' ORDER BY 1").unwrap();
        assert_eq!(rest, "ORDER BY 1");
        assert_eq!(
            expr,
            SqlExpr::binary(
                SqlExpr::column(&["StringCol"]),
                BinaryOperator::NotEq,
                SqlExpr::Literal(SqlLiteral::String("baz".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_where_clause_invalid() {
        match parse_where_clause("WHERE ") {
            Err(Err::Failure(err)) => assert_eq!(err.errors[0].1, "Error in where clause"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_having_clause() {
        let (rest, expr) = parse_having_clause("having count(*) > 1").unwrap();
        assert_eq!(rest, "");
        assert!(matches!(
            expr,
            SqlExpr::BinaryOp {
                op: BinaryOperator::Gt,
                ..
            }
        ));
        assert!(matches!(parse_having_clause("WHERE x"), Err(Err::Error(_))));
    }
}
