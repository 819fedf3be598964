use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, not, opt, peek, recognize, verify},
    error::{Error, ErrorKind, ParseError},
    multi::separated_list1,
    sequence::{delimited, pair, preceded, terminated},
    IResult, Parser,
};

use super::ast::ObjectName;

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Words that can never be used as bare identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CROSS", "DESC", "DISTINCT",
    "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FROM", "FULL", "GROUP", "HAVING", "IN", "INNER",
    "INTERSECT", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "MINUS", "NOT", "NULL", "OFFSET", "ON",
    "OR", "ORDER", "OUTER", "RIGHT", "SELECT", "SOME", "THEN", "TRUE", "UNION", "WHEN", "WHERE",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.iter().any(|r| r.eq_ignore_ascii_case(word))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Case-insensitive keyword that is not the prefix of a longer word.
pub fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str>> {
    ws(terminated(tag_no_case(kw), not(peek(satisfy(is_ident_char)))))
}

/// Bare word, reserved or not.
pub fn parse_word(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))).parse(input)
}

/// Text between `quote` characters, a doubled quote standing for itself.
pub fn parse_quoted(input: &str, quote: char) -> IResult<&str, String> {
    let mut chars = input.char_indices();
    match chars.next() {
        Some((_, c)) if c == quote => {}
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    }

    let mut value = String::new();
    let mut pending_quote = false;
    for (idx, c) in chars {
        if pending_quote {
            if c == quote {
                value.push(quote);
                pending_quote = false;
                continue;
            }
            return Ok((&input[idx..], value));
        }
        if c == quote {
            pending_quote = true;
        } else {
            value.push(c);
        }
    }

    if pending_quote {
        Ok(("", value))
    } else {
        // unterminated
        Err(nom::Err::Error(Error::new(input, ErrorKind::Char)))
    }
}

fn single_quoted(input: &str) -> IResult<&str, String> {
    parse_quoted(input, '\'')
}

fn double_quoted(input: &str) -> IResult<&str, String> {
    parse_quoted(input, '"')
}

fn backtick_quoted(input: &str) -> IResult<&str, String> {
    parse_quoted(input, '`')
}

pub fn parse_string_literal(input: &str) -> IResult<&str, String> {
    ws(single_quoted).parse(input)
}

/// Unquoted non-reserved identifier, or a `"quoted"` / `` `quoted` `` one.
pub fn parse_identifier(input: &str) -> IResult<&str, String> {
    ws(alt((
        map(verify(parse_word, |w: &str| !is_reserved(w)), str::to_string),
        double_quoted,
        backtick_quoted,
    )))
    .parse(input)
}

pub fn parse_object_name(input: &str) -> IResult<&str, ObjectName> {
    map(separated_list1(char('.'), parse_identifier), ObjectName).parse(input)
}

/// `[AS] alias`
pub fn parse_alias(input: &str) -> IResult<&str, String> {
    preceded(opt(keyword("AS")), parse_identifier).parse(input)
}

/// Unsigned number. Returns the lexical form and whether it has a fraction
/// or exponent.
pub fn parse_unsigned_number(input: &str) -> IResult<&str, (&str, bool)> {
    let (rest, text) = ws(recognize((
        alt((
            recognize(pair(digit1, opt(pair(char('.'), opt(digit1))))),
            recognize(pair(char('.'), digit1)),
        )),
        opt((
            alt((char('e'), char('E'))),
            opt(alt((char('+'), char('-')))),
            digit1,
        )),
    )))
    .parse(input)?;
    let is_decimal = text.contains(['.', 'e', 'E']);
    Ok((rest, (text, is_decimal)))
}

pub fn parse_u64(input: &str) -> IResult<&str, u64> {
    let (rest, digits) = ws(digit1).parse(input)?;
    match digits.parse::<u64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Digit))),
    }
}
