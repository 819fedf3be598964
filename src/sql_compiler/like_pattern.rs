//! Translation of SQL `LIKE` patterns.
//!
//! The pattern is scanned once. `\` escapes a directly following `%` or `_`
//! and is an ordinary character anywhere else. `%` becomes `(.+)`, `_`
//! becomes `.`, and every run of other characters is quoted for the XPath
//! regex dialect used by SPARQL `REGEX`. A pattern without unescaped
//! wildcards is not a regex at all: it compiles to plain equality against
//! the unescaped text.

use crate::graph_expr::{BinaryOp, GraphExpr, Literal};

use super::errors::CompileError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikePattern {
    /// Anchored regular expression.
    Regex(String),
    /// No wildcard: compare for equality with this text.
    Exact(String),
}

const ESCAPE: char = '\\';

/// Characters with a meaning in XPath regular expressions.
const XPATH_META: &[char] = &[
    '\\', '.', '?', '*', '+', '(', ')', '{', '}', '[', ']', '^', '$', '|', '-',
];

/// Quote `text` for `fn:matches`. `#`, `&` and `~` stay bare: XPath does
/// not allow them to be escaped.
fn escape_xpath(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if XPATH_META.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn translate(pattern: &str) -> LikePattern {
    let mut regex = String::from("^");
    let mut exact = String::new();
    let mut literal_run = String::new();
    let mut has_wildcard = false;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.peek() {
                Some(&wildcard @ ('%' | '_')) => {
                    chars.next();
                    literal_run.push(wildcard);
                    exact.push(wildcard);
                }
                // not escaping a wildcard: the backslash is literal
                _ => {
                    literal_run.push(ESCAPE);
                    exact.push(ESCAPE);
                }
            },
            '%' | '_' => {
                has_wildcard = true;
                regex.push_str(&escape_xpath(&literal_run));
                literal_run.clear();
                regex.push_str(if c == '%' { "(.+)" } else { "." });
            }
            other => {
                literal_run.push(other);
                exact.push(other);
            }
        }
    }

    if !has_wildcard {
        return LikePattern::Exact(exact);
    }
    regex.push_str(&escape_xpath(&literal_run));
    regex.push('$');
    LikePattern::Regex(regex)
}

/// Filter expression for `expr LIKE pattern`.
pub fn like_filter(expr: GraphExpr, pattern: &GraphExpr) -> Result<GraphExpr, CompileError> {
    let text = match pattern {
        GraphExpr::Constant(Literal::String(text)) => text,
        _ => return Err(CompileError::unsupported("LIKE with a non-literal pattern")),
    };

    let filter = match translate(text) {
        LikePattern::Exact(value) => {
            log::debug!("LIKE '{}' has no wildcard, using equality", text);
            GraphExpr::binary(BinaryOp::Equals, expr, GraphExpr::string(&value))
        }
        LikePattern::Regex(pattern) => {
            log::debug!("LIKE '{}' translated to regex {}", text, pattern);
            GraphExpr::Regex {
                expr: Box::new(expr),
                pattern,
                flags: None,
            }
        }
    };
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use test_case::test_case;

    fn regex_of(pattern: &str) -> Regex {
        match translate(pattern) {
            LikePattern::Regex(re) => Regex::new(&re).unwrap(),
            LikePattern::Exact(text) => panic!("expected regex, got exact {:?}", text),
        }
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(translate("foo%"), LikePattern::Regex("^foo(.+)$".to_string()));
        let re = regex_of("foo%");
        assert!(re.is_match("foobar"));
        assert!(!re.is_match("foo"));
        assert!(!re.is_match("xfoobar"));
    }

    #[test]
    fn test_no_wildcard_is_exact() {
        assert_eq!(translate("foo"), LikePattern::Exact("foo".to_string()));
        assert_eq!(translate("a.b*c"), LikePattern::Exact("a.b*c".to_string()));
    }

    #[test_case("a_c", "abc", true; "underscore matches one char")]
    #[test_case("a_c", "ac", false; "underscore needs a char")]
    #[test_case("%.txt", "notes.txt", true; "dot is literal")]
    #[test_case("%.txt", "notesXtxt", false; "dot does not match any char")]
    #[test_case("(a)%", "(a)b", true; "parens are literal")]
    #[test_case("a%b%c", "aXbYc", true; "two percents")]
    fn test_regex_semantics(pattern: &str, candidate: &str, expected: bool) {
        assert_eq!(regex_of(pattern).is_match(candidate), expected);
    }

    #[test]
    fn test_escaped_wildcards_are_literal() {
        // only escaped wildcards: exact match on the unescaped text
        assert_eq!(translate("100\\%"), LikePattern::Exact("100%".to_string()));
        assert_eq!(translate("a\\_b"), LikePattern::Exact("a_b".to_string()));

        // escape directly before a live wildcard
        let re = regex_of("50\\%%");
        assert!(re.is_match("50%off"));
        assert!(!re.is_match("50off"));

        // escaped wildcard directly after a live one
        let re = regex_of("%\\_x");
        assert!(re.is_match("ab_x"));
        assert!(!re.is_match("abcx"));
    }

    #[test]
    fn test_backslash_only_escapes_wildcards() {
        assert_eq!(translate("C:\\dir"), LikePattern::Exact("C:\\dir".to_string()));
        assert_eq!(translate("ab\\"), LikePattern::Exact("ab\\".to_string()));
        assert_eq!(translate("a\\\\b"), LikePattern::Exact("a\\\\b".to_string()));
        assert_eq!(
            translate("C:\\dir%"),
            LikePattern::Regex("^C:\\\\dir(.+)$".to_string())
        );
        let re = regex_of("C:\\dir%");
        assert!(re.is_match("C:\\dir\\a.txt"));
        assert!(!re.is_match("C:dira.txt"));

        // the first backslash is literal, the second escapes `%`
        let re = regex_of("%\\\\%");
        assert!(re.is_match("x\\%"));
        assert!(!re.is_match("x\\y"));
    }

    #[test]
    fn test_only_xpath_metacharacters_are_quoted() {
        assert_eq!(
            translate("a&b#c~%"),
            LikePattern::Regex("^a&b#c~(.+)$".to_string())
        );
        assert_eq!(
            translate("[a-b]{2}|x%"),
            LikePattern::Regex("^\\[a\\-b\\]\\{2\\}\\|x(.+)$".to_string())
        );
        assert!(regex_of("a&b#c~%").is_match("a&b#c~d"));
        assert!(regex_of("[a-b]{2}|x%").is_match("[a-b]{2}|xy"));
    }

    #[test]
    fn test_like_filter_shapes() {
        let v = crate::graph_expr::Variable::new("s");
        let filter = like_filter(GraphExpr::var(&v), &GraphExpr::string("foo")).unwrap();
        assert_eq!(
            filter,
            GraphExpr::binary(BinaryOp::Equals, GraphExpr::var(&v), GraphExpr::string("foo"))
        );

        let filter = like_filter(GraphExpr::var(&v), &GraphExpr::string("f_o")).unwrap();
        assert!(matches!(filter, GraphExpr::Regex { ref pattern, .. } if pattern == "^f.o$"));

        assert!(matches!(
            like_filter(GraphExpr::var(&v), &GraphExpr::var(&v)),
            Err(CompileError::UnsupportedConstruct { .. })
        ));
    }
}
