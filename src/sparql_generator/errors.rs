use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SparqlGeneratorError {
    #[error("Query projects no columns (SELECT list is empty)")]
    EmptyProjection,
    #[error("Result name `{name}` clashes with a pattern variable")]
    InvalidDisplayName { name: String },
    #[error("Optional group has nothing to render")]
    EmptyOptionalGroup,
}
