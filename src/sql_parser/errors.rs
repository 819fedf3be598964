use nom::error::{ContextError, ParseError};
use std::fmt;

#[derive(Debug, PartialEq)]
pub struct SqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> SqlParsingError<'a> {
    pub fn new(input: &'a str, context: &'static str) -> Self {
        SqlParsingError {
            errors: vec![(input, context)],
        }
    }
}

impl<'a> ParseError<&'a str> for SqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        SqlParsingError {
            errors: vec![(input, "unknown error")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unknown error (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for SqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for SqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            // keep diagnostics short for long statements
            let snippet: String = input.chars().take(40).collect();
            if snippet.is_empty() {
                writeln!(f, "{}: <end of input>", ctx)?;
            } else {
                writeln!(f, "{}: {}", ctx, snippet)?;
            }
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for SqlParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        SqlParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}

/// Lets clause-level failures surface through the plain nom error type used
/// by the expression parser (subqueries).
impl<'a> From<SqlParsingError<'a>> for nom::error::Error<&'a str> {
    fn from(err: SqlParsingError<'a>) -> Self {
        let input = err.errors.first().map(|(input, _)| *input).unwrap_or("");
        nom::error::Error::new(input, nom::error::ErrorKind::Verify)
    }
}

/// Error mapper for the body of a clause whose keyword has already matched:
/// any error becomes a hard failure tagged with `context`.
pub(crate) fn committed<'a>(
    context: &'static str,
) -> impl Fn(nom::Err<nom::error::Error<&'a str>>) -> nom::Err<SqlParsingError<'a>> {
    move |e| match e {
        nom::Err::Incomplete(needed) => nom::Err::Incomplete(needed),
        nom::Err::Error(err) | nom::Err::Failure(err) => {
            nom::Err::Failure(SqlParsingError::new(err.input, context))
        }
    }
}

/// Keeps an error recoverable while changing its type.
pub(crate) fn recoverable(e: nom::Err<nom::error::Error<&str>>) -> nom::Err<SqlParsingError<'_>> {
    e.map(SqlParsingError::from)
}
