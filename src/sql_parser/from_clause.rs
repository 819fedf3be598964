use nom::{
    branch::alt,
    character::complete::char,
    combinator::{map, opt, value},
    multi::{many0, separated_list1},
    sequence::{preceded, terminated},
    IResult, Parser,
};

use super::{
    ast::{Join, JoinOperator, SqlExpr, TableFactor, TableWithJoins},
    common::{keyword, parse_alias, parse_object_name, ws},
    errors::{committed, recoverable, SqlParsingError},
    expression::{parse_expression, parse_subquery},
};

#[derive(Debug, Clone, Copy)]
enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn operator(self, constraint: Option<SqlExpr>) -> JoinOperator {
        match self {
            JoinKind::Inner => JoinOperator::Inner(constraint),
            JoinKind::Left => JoinOperator::LeftOuter(constraint),
            JoinKind::Right => JoinOperator::RightOuter(constraint),
            JoinKind::Full => JoinOperator::FullOuter(constraint),
        }
    }
}

/// `FROM table_ref [, table_ref ...]` where each reference may carry joins.
pub fn parse_from_clause(
    input: &'_ str,
) -> IResult<&'_ str, Vec<TableWithJoins>, SqlParsingError<'_>> {
    let (input, _) = keyword("FROM").parse(input).map_err(recoverable)?;

    separated_list1(ws(char(',')), parse_table_with_joins)
        .parse(input)
        .map_err(committed("Error in from clause"))
}

fn parse_table_with_joins(input: &str) -> IResult<&str, TableWithJoins> {
    let (input, relation) = parse_table_factor(input)?;
    let (input, joins) = many0(parse_join).parse(input)?;
    Ok((input, TableWithJoins { relation, joins }))
}

fn parse_table_factor(input: &str) -> IResult<&str, TableFactor> {
    alt((
        map((parse_subquery, opt(parse_alias)), |(subquery, alias)| {
            TableFactor::Derived {
                subquery: Box::new(subquery),
                alias,
            }
        }),
        map((parse_object_name, opt(parse_alias)), |(name, alias)| {
            TableFactor::Table { name, alias }
        }),
    ))
    .parse(input)
}

fn parse_join(input: &str) -> IResult<&str, Join> {
    if let Ok((input, _)) = (keyword("CROSS"), keyword("JOIN")).parse(input) {
        let (input, relation) = parse_table_factor(input)?;
        return Ok((
            input,
            Join {
                relation,
                operator: JoinOperator::Cross,
            },
        ));
    }

    let (input, kind) = terminated(
        map(
            opt(alt((
                value(JoinKind::Inner, keyword("INNER")),
                value(JoinKind::Left, terminated(keyword("LEFT"), opt(keyword("OUTER")))),
                value(JoinKind::Right, terminated(keyword("RIGHT"), opt(keyword("OUTER")))),
                value(JoinKind::Full, terminated(keyword("FULL"), opt(keyword("OUTER")))),
            ))),
            |kind| kind.unwrap_or(JoinKind::Inner),
        ),
        keyword("JOIN"),
    )
    .parse(input)?;

    let (input, relation) = parse_table_factor(input)?;
    let (input, constraint) = opt(preceded(keyword("ON"), parse_expression)).parse(input)?;

    Ok((
        input,
        Join {
            relation,
            operator: kind.operator(constraint),
        },
    ))
}
