use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::catalog::{
    Catalog, CatalogBuilder, ColumnBuilder, SchemaBuilder, TableBuilder, DEFAULT_SQL_TYPE,
};
use super::errors::CatalogError;

/// Top-level YAML catalog definition.
///
/// ```yaml
/// name: testCatalog
/// sparql_endpoint: http://localhost:3030/ds/sparql
/// prefixes:
///   ex: http://example.com/
/// schemas:
///   - name: testSchema
///     tables:
///       - name: foo
///         iri: http://example.com/foo
///         templates:
///           - "{subject} a {object} ."
///         columns:
///           - name: StringCol
///             type: VARCHAR
///             template: "{subject} <http://example.com/zero> {object} ."
///           - name: NullableStringCol
///             nullable: true
///             template: "{subject} <http://example.com/one> {object} ."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    pub name: String,
    #[serde(default)]
    pub sparql_endpoint: Option<String>,
    #[serde(default)]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    /// Value substituted for `{object}` in table-level templates
    #[serde(default)]
    pub iri: Option<String>,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type", default = "default_sql_type")]
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    pub template: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn default_sql_type() -> String {
    DEFAULT_SQL_TYPE.to_string()
}

impl CatalogConfig {
    /// Load a catalog definition from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path).map_err(|e| CatalogError::ConfigReadError {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a catalog definition from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(yaml).map_err(|e| CatalogError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Basic structural checks. Duplicate names are caught by the builder.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidConfig {
                message: "Catalog name cannot be empty".to_string(),
            });
        }
        if self.schemas.is_empty() {
            return Err(CatalogError::InvalidConfig {
                message: "Catalog must contain at least one schema".to_string(),
            });
        }
        for schema in &self.schemas {
            for table in &schema.tables {
                if table.columns.is_empty() {
                    return Err(CatalogError::invalid_config_with_context(
                        &format!("Table `{}.{}` has no columns", schema.name, table.name),
                        "While validating catalog definition",
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn build_catalog(&self) -> Result<Catalog, CatalogError> {
        self.validate()?;

        let mut builder = CatalogBuilder::new(&self.name);
        if let Some(endpoint) = &self.sparql_endpoint {
            builder = builder.sparql_endpoint(endpoint);
        }
        for (prefix, namespace) in &self.prefixes {
            builder = builder.prefix(prefix, namespace);
        }

        for schema_def in &self.schemas {
            let mut schema = SchemaBuilder::new(&schema_def.name);
            for table_def in &schema_def.tables {
                let mut table = TableBuilder::new(&table_def.name);
                if let Some(iri) = &table_def.iri {
                    table = table.iri(iri);
                }
                if let Some(remarks) = &table_def.remarks {
                    table = table.remarks(remarks);
                }
                for template in &table_def.templates {
                    table = table.template(template);
                }
                for column_def in &table_def.columns {
                    let mut column = ColumnBuilder::new(&column_def.name, &column_def.template)
                        .sql_type(&column_def.sql_type)
                        .nullable(column_def.nullable);
                    if let Some(remarks) = &column_def.remarks {
                        column = column.remarks(remarks);
                    }
                    table = table.column(column);
                }
                schema = schema.table(table);
            }
            builder = builder.schema(schema);
        }

        builder.build()
    }
}

/// Load, build and optionally validate a catalog in one step.
pub fn load_catalog<P: AsRef<Path>>(path: P, validate_templates: bool) -> Result<Catalog, CatalogError> {
    let path = path.as_ref();
    log::info!("Loading catalog from {}", path.display());
    let catalog = CatalogConfig::from_yaml_file(path)?.build_catalog()?;
    if validate_templates {
        catalog.validate()?;
    }
    Ok(catalog)
}
