//! # Catalog Error Types
//!
//! Errors raised while resolving names against the catalog, parsing pattern
//! templates and loading catalog definitions.
//!
//! Template errors describe catalog data that is internally inconsistent; they
//! are not user query errors. Use the `*_with_context` helpers so the
//! offending table or column is named in the message.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Name `{name}` is ambiguous: {count} candidates match")]
    AmbiguousName { name: String, count: usize },
    #[error("Malformed pattern template `{template}`: {reason}")]
    MalformedTemplate { template: String, reason: String },
    #[error("Column index {index} out of range for table `{table}` with {count} columns")]
    ColumnIndexOutOfRange {
        table: String,
        index: usize,
        count: usize,
    },
    #[error("Duplicate column `{column}` in table `{table}`")]
    DuplicateColumn { table: String, column: String },
    #[error("Duplicate table `{table}` in schema `{schema}`")]
    DuplicateTable { schema: String, table: String },
    #[error("Duplicate schema `{schema}`")]
    DuplicateSchema { schema: String },
    #[error("Failed to read catalog file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse catalog definition: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid catalog definition: {message}")]
    InvalidConfig { message: String },
}

impl CatalogError {
    pub fn malformed_template(template: &str, reason: impl Into<String>) -> Self {
        CatalogError::MalformedTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }

    /// Malformed template error naming the owner of the template.
    ///
    /// # Example
    ///
    /// ```ignore
    /// CatalogError::malformed_template_with_context(
    ///     "{subject} <p>",
    ///     "does not parse into 3 components",
    ///     "column testSchema.foo.StringCol",
    /// )
    /// ```
    pub fn malformed_template_with_context(
        template: &str,
        reason: impl Into<String>,
        owner: &str,
    ) -> Self {
        CatalogError::MalformedTemplate {
            template: template.to_string(),
            reason: format!("{} (in {})", reason.into(), owner),
        }
    }

    pub fn invalid_config_with_context(message: &str, context: &str) -> Self {
        CatalogError::InvalidConfig {
            message: format!("{}\n  Context: {}", message, context),
        }
    }
}
