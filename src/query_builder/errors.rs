use thiserror::Error;

use crate::graph_catalog::errors::CatalogError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryBuilderError {
    #[error("Unknown table `{name}`")]
    UnknownTable { name: String },
    #[error("Unknown column `{name}`")]
    UnknownColumn { name: String },
    #[error("Name `{name}` is ambiguous: {count} candidates match")]
    AmbiguousName { name: String, count: usize },
    #[error("Table alias `{alias}` is already in use")]
    DuplicateAlias { alias: String },
    #[error("Result column `{name}` is already projected")]
    DuplicateProjection { name: String },
    #[error("Malformed pattern template `{template}`: {reason}")]
    MalformedTemplate { template: String, reason: String },
    #[error("Query has no FROM clause tables")]
    EmptyFromClause,
    #[error("No table binding with id {id}")]
    UnknownBinding { id: usize },
    #[error(transparent)]
    Catalog(CatalogError),
}

impl From<CatalogError> for QueryBuilderError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::AmbiguousName { name, count } => {
                QueryBuilderError::AmbiguousName { name, count }
            }
            CatalogError::MalformedTemplate { template, reason } => {
                QueryBuilderError::MalformedTemplate { template, reason }
            }
            other => QueryBuilderError::Catalog(other),
        }
    }
}
