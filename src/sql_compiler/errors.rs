use thiserror::Error;

use crate::query_builder::errors::QueryBuilderError;

/// Everything a compilation can fail with. Nothing here is transient; a
/// failed compilation produces no algebra.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("SQL parse error: {0}")]
    Parse(String),
    #[error("Unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String },
    #[error("Unsupported function: {name}")]
    UnsupportedFunction { name: String },
    #[error("Function {function} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
    #[error("Expression compiled to nothing")]
    EmptyExpression,
    #[error(transparent)]
    Builder(#[from] QueryBuilderError),
}

impl CompileError {
    pub fn unsupported(construct: impl Into<String>) -> Self {
        CompileError::UnsupportedConstruct {
            construct: construct.into(),
        }
    }

    /// UnsupportedConstruct naming where the construct appeared.
    pub fn unsupported_with_context(construct: &str, context: &str) -> Self {
        CompileError::UnsupportedConstruct {
            construct: format!("{} in {}", construct, context),
        }
    }
}
