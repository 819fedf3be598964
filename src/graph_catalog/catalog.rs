//! Read-only catalog tree: Catalog → Schema → Table → Column.
//!
//! Catalogs are assembled with [`CatalogBuilder`] and never change after
//! `build()`. Share them between compilations behind an `Arc`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::item_name::ItemName;
use super::pattern_template::PatternTemplate;

pub const DEFAULT_SQL_TYPE: &str = "VARCHAR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableType {
    Table,
    View,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: ItemName,
    sql_type: String,
    nullable: bool,
    template: Option<String>,
    remarks: Option<String>,
}

impl Column {
    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        self.name.short_name()
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    /// Parses the column's template. View columns have none.
    pub fn pattern_template(&self) -> Result<PatternTemplate, CatalogError> {
        let owner = format!("column {}", self.name.db_name());
        let source = self.template.as_deref().ok_or_else(|| {
            CatalogError::malformed_template_with_context("", "column has no pattern template", &owner)
        })?;
        let template = PatternTemplate::parse(source).map_err(|e| match e {
            CatalogError::MalformedTemplate { template, reason } => {
                CatalogError::malformed_template_with_context(&template, reason, &owner)
            }
            other => other,
        })?;
        // the object slot is where the column's value gets bound
        if !template.uses_object() {
            return Err(CatalogError::malformed_template_with_context(
                source,
                "column template does not use {object}",
                &owner,
            ));
        }
        Ok(template)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: ItemName,
    table_type: TableType,
    iri: Option<String>,
    templates: Vec<String>,
    columns: Vec<Column>,
    remarks: Option<String>,
}

impl Table {
    /// Virtual table whose columns describe a compiled query's projections.
    pub(crate) fn view(name: ItemName, columns: Vec<(String, String, bool)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(column, sql_type, nullable)| Column {
                name: name.with_column(&column),
                sql_type,
                nullable,
                template: None,
                remarks: None,
            })
            .collect();
        Table {
            name,
            table_type: TableType::View,
            iri: None,
            templates: Vec::new(),
            columns,
            remarks: None,
        }
    }

    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn table_type(&self) -> TableType {
        self.table_type
    }

    pub fn iri(&self) -> Option<&str> {
        self.iri.as_deref()
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, index: usize) -> Result<&Column, CatalogError> {
        self.columns
            .get(index)
            .ok_or_else(|| CatalogError::ColumnIndexOutOfRange {
                table: self.name.db_name(),
                index,
                count: self.columns.len(),
            })
    }

    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.short_name() == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.short_name() == name)
    }

    pub fn find_columns<'a: 'p, 'p>(
        &'a self,
        pattern: &'p ItemName,
    ) -> impl Iterator<Item = &'a Column> + Clone + 'p {
        self.columns.iter().filter(move |c| pattern.matches(&c.name))
    }

    /// Parses the table-level templates, skipping comment lines.
    pub fn table_templates(&self) -> Result<Vec<PatternTemplate>, CatalogError> {
        let owner = format!("table {}", self.name.db_name());
        let mut parsed = Vec::with_capacity(self.templates.len());
        for source in &self.templates {
            let template = PatternTemplate::parse(source).map_err(|e| match e {
                CatalogError::MalformedTemplate { template, reason } => {
                    CatalogError::malformed_template_with_context(&template, reason, &owner)
                }
                other => other,
            })?;
            if !template.is_comment() {
                parsed.push(template);
            }
        }
        Ok(parsed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: ItemName,
    tables: Vec<Table>,
}

impl Schema {
    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn find_tables<'a: 'p, 'p>(
        &'a self,
        pattern: &'p ItemName,
    ) -> impl Iterator<Item = &'a Table> + Clone + 'p {
        self.tables.iter().filter(move |t| pattern.matches(&t.name))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    name: String,
    sparql_endpoint: Option<String>,
    prefixes: Vec<(String, String)>,
    schemas: Vec<Schema>,
    table_index: HashMap<ItemName, (usize, usize)>,
}

impl Catalog {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sparql_endpoint(&self) -> Option<&str> {
        self.sparql_endpoint.as_deref()
    }

    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn find_schemas<'a: 'p, 'p>(
        &'a self,
        pattern: &'p ItemName,
    ) -> impl Iterator<Item = &'a Schema> + Clone + 'p {
        self.schemas.iter().filter(move |s| pattern.matches(&s.name))
    }

    pub fn find_tables<'a: 'p, 'p>(
        &'a self,
        pattern: &'p ItemName,
    ) -> impl Iterator<Item = &'a Table> + Clone + 'p {
        self.schemas.iter().flat_map(move |s| s.find_tables(pattern))
    }

    pub fn find_columns<'a: 'p, 'p>(
        &'a self,
        pattern: &'p ItemName,
    ) -> impl Iterator<Item = &'a Column> + Clone + 'p {
        self.schemas
            .iter()
            .flat_map(|s| s.tables.iter())
            .flat_map(move |t| t.find_columns(pattern))
    }

    /// Resolve a (possibly partial) table name.
    ///
    /// `Ok(None)` when nothing matches; `AmbiguousName` when more than one
    /// table does.
    pub fn lookup_table(&self, name: &ItemName) -> Result<Option<&Table>, CatalogError> {
        let pattern = name.without_column();
        Ok(pattern
            .find_match(&self.table_index)?
            .and_then(|&(s, t)| self.schemas.get(s).and_then(|schema| schema.tables.get(t))))
    }

    /// Instantiates every template once so malformed catalog data is
    /// reported at load time rather than on first use.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let placeholder = crate::graph_expr::term::Variable::new("placeholder");
        let placeholder_term = crate::graph_expr::term::Term::var(&placeholder);
        for table in self.schemas.iter().flat_map(|s| s.tables.iter()) {
            let table_object = table
                .iri()
                .map(|iri| crate::graph_expr::term::Term::Iri(iri.to_string()));
            for template in table.table_templates()? {
                template.instantiate(&placeholder, table_object.as_ref())?;
            }
            for column in table.columns.iter().filter(|c| c.template.is_some()) {
                column
                    .pattern_template()?
                    .instantiate(&placeholder, Some(&placeholder_term))?;
            }
        }
        log::debug!("Catalog `{}` validated", self.name);
        Ok(())
    }
}

/// Column definition used while assembling a catalog.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    sql_type: String,
    nullable: bool,
    template: String,
    remarks: Option<String>,
}

impl ColumnBuilder {
    pub fn new(name: &str, template: &str) -> Self {
        ColumnBuilder {
            name: name.to_string(),
            sql_type: DEFAULT_SQL_TYPE.to_string(),
            nullable: false,
            template: template.to_string(),
            remarks: None,
        }
    }

    pub fn sql_type(mut self, sql_type: &str) -> Self {
        self.sql_type = sql_type.to_string();
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn remarks(mut self, remarks: &str) -> Self {
        self.remarks = Some(remarks.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    iri: Option<String>,
    templates: Vec<String>,
    columns: Vec<ColumnBuilder>,
    remarks: Option<String>,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        TableBuilder {
            name: name.to_string(),
            iri: None,
            templates: Vec::new(),
            columns: Vec::new(),
            remarks: None,
        }
    }

    pub fn iri(mut self, iri: &str) -> Self {
        self.iri = Some(iri.to_string());
        self
    }

    pub fn template(mut self, template: &str) -> Self {
        self.templates.push(template.to_string());
        self
    }

    pub fn column(mut self, column: ColumnBuilder) -> Self {
        self.columns.push(column);
        self
    }

    pub fn remarks(mut self, remarks: &str) -> Self {
        self.remarks = Some(remarks.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    tables: Vec<TableBuilder>,
}

impl SchemaBuilder {
    pub fn new(name: &str) -> Self {
        SchemaBuilder {
            name: name.to_string(),
            tables: Vec::new(),
        }
    }

    pub fn table(mut self, table: TableBuilder) -> Self {
        self.tables.push(table);
        self
    }
}

#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    name: String,
    sparql_endpoint: Option<String>,
    prefixes: Vec<(String, String)>,
    schemas: Vec<SchemaBuilder>,
}

impl CatalogBuilder {
    pub fn new(name: &str) -> Self {
        CatalogBuilder {
            name: name.to_string(),
            sparql_endpoint: None,
            prefixes: Vec::new(),
            schemas: Vec::new(),
        }
    }

    pub fn sparql_endpoint(mut self, endpoint: &str) -> Self {
        self.sparql_endpoint = Some(endpoint.to_string());
        self
    }

    pub fn prefix(mut self, prefix: &str, namespace: &str) -> Self {
        self.prefixes.push((prefix.to_string(), namespace.to_string()));
        self
    }

    pub fn schema(mut self, schema: SchemaBuilder) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn build(self) -> Result<Catalog, CatalogError> {
        let catalog_name = self.name;
        let mut schemas = Vec::with_capacity(self.schemas.len());
        let mut table_index = HashMap::new();
        let mut seen_schemas = HashSet::new();

        for (schema_idx, schema) in self.schemas.into_iter().enumerate() {
            if !seen_schemas.insert(schema.name.clone()) {
                return Err(CatalogError::DuplicateSchema {
                    schema: schema.name,
                });
            }
            let schema_name = ItemName::schema_name(Some(&catalog_name), &schema.name);
            let mut tables = Vec::with_capacity(schema.tables.len());

            for (table_idx, table) in schema.tables.into_iter().enumerate() {
                let table_name = ItemName::new(
                    Some(&catalog_name),
                    Some(&schema.name),
                    Some(&table.name),
                    None,
                );
                if table_index
                    .insert(table_name.clone(), (schema_idx, table_idx))
                    .is_some()
                {
                    return Err(CatalogError::DuplicateTable {
                        schema: schema.name,
                        table: table.name,
                    });
                }

                let mut seen_columns = HashSet::new();
                let mut columns = Vec::with_capacity(table.columns.len());
                for column in table.columns {
                    if !seen_columns.insert(column.name.clone()) {
                        return Err(CatalogError::DuplicateColumn {
                            table: table_name.db_name(),
                            column: column.name,
                        });
                    }
                    columns.push(Column {
                        name: table_name.with_column(&column.name),
                        sql_type: column.sql_type,
                        nullable: column.nullable,
                        template: Some(column.template),
                        remarks: column.remarks,
                    });
                }

                tables.push(Table {
                    name: table_name,
                    table_type: TableType::Table,
                    iri: table.iri,
                    templates: table.templates,
                    columns,
                    remarks: table.remarks,
                });
            }

            schemas.push(Schema {
                name: schema_name,
                tables,
            });
        }

        log::debug!(
            "Built catalog `{}` with {} schema(s), {} table(s)",
            catalog_name,
            schemas.len(),
            table_index.len()
        );

        Ok(Catalog {
            name: catalog_name,
            sparql_endpoint: self.sparql_endpoint,
            prefixes: self.prefixes,
            schemas,
            table_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_catalog::testing::foo_bar_catalog;

    #[test]
    fn test_column_access_by_index_and_name() {
        let catalog = foo_bar_catalog();
        let foo = catalog
            .lookup_table(&ItemName::table_name(None, "foo"))
            .unwrap()
            .unwrap();

        assert_eq!(foo.column_count(), 4);
        assert_eq!(foo.column(0).unwrap().short_name(), "StringCol");
        assert_eq!(foo.column(3).unwrap().short_name(), "NullableIntCol");
        assert!(foo.column(3).unwrap().is_nullable());
        assert_eq!(foo.column_index("IntCol"), Some(2));
        assert!(foo.column_by_name("Missing").is_none());

        match foo.column(4) {
            Err(CatalogError::ColumnIndexOutOfRange { index, count, .. }) => {
                assert_eq!(index, 4);
                assert_eq!(count, 4);
            }
            other => panic!("expected out-of-range error, got {:?}", other),
        }
    }

    #[test]
    fn test_find_operations_are_restartable() {
        let catalog = foo_bar_catalog();
        let pattern = ItemName::column_name(None, "IntCol");
        let columns = catalog.find_columns(&pattern);
        assert_eq!(columns.clone().count(), 2);
        assert_eq!(columns.count(), 2);

        let all_tables = ItemName::wild();
        assert_eq!(catalog.find_tables(&all_tables).count(), 2);

        let schema = ItemName::schema_name(None, "testSchema");
        assert_eq!(catalog.find_schemas(&schema).count(), 1);

        let missing = ItemName::schema_name(None, "nope");
        assert_eq!(catalog.find_schemas(&missing).count(), 0);
    }

    #[test]
    fn test_lookup_table() {
        let catalog = foo_bar_catalog();
        let found = catalog
            .lookup_table(&ItemName::table_name(Some("testSchema"), "bar"))
            .unwrap();
        assert_eq!(found.map(|t| t.name().short_name()), Some("bar"));

        assert!(catalog
            .lookup_table(&ItemName::table_name(None, "baz"))
            .unwrap()
            .is_none());

        let err = catalog.lookup_table(&ItemName::wild()).unwrap_err();
        assert!(matches!(err, CatalogError::AmbiguousName { count: 2, .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = CatalogBuilder::new("cat")
            .schema(
                SchemaBuilder::new("s").table(
                    TableBuilder::new("t")
                        .column(ColumnBuilder::new("a", "{subject} <p> {object}"))
                        .column(ColumnBuilder::new("a", "{subject} <q> {object}")),
                ),
            )
            .build();
        assert_eq!(
            result.unwrap_err(),
            CatalogError::DuplicateColumn {
                table: "s.t".to_string(),
                column: "a".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let result = CatalogBuilder::new("cat")
            .schema(
                SchemaBuilder::new("s")
                    .table(TableBuilder::new("t"))
                    .table(TableBuilder::new("t")),
            )
            .build();
        assert!(matches!(result, Err(CatalogError::DuplicateTable { .. })));
    }

    #[test]
    fn test_validate_reports_malformed_column_template() {
        let catalog = CatalogBuilder::new("cat")
            .schema(
                SchemaBuilder::new("s").table(
                    TableBuilder::new("t")
                        .template("{subject} a <http://example.com/t> .")
                        .column(ColumnBuilder::new("broken", "{subject} <p>")),
                ),
            )
            .build()
            .unwrap();
        let err = catalog.validate().unwrap_err();
        assert!(err.to_string().contains("s.t.broken"));
        assert!(foo_bar_catalog().validate().is_ok());
    }

    #[test]
    fn test_table_templates_skip_comments() {
        let catalog = CatalogBuilder::new("cat")
            .schema(
                SchemaBuilder::new("s").table(
                    TableBuilder::new("t")
                        .template("# documentation only")
                        .template("{subject} a <http://example.com/t> ."),
                ),
            )
            .build()
            .unwrap();
        let table = catalog.find_tables(&ItemName::wild()).next().unwrap();
        assert_eq!(table.templates().len(), 2);
        assert_eq!(table.table_templates().unwrap().len(), 1);
    }

    #[test]
    fn test_found_items_outlive_pattern() {
        let catalog = foo_bar_catalog();
        let tables: Vec<&Table> = {
            let pattern = ItemName::table_name(None, "foo");
            catalog.find_tables(&pattern).collect()
        };
        let columns: Vec<&Column> = {
            let pattern = ItemName::column_name(None, "IntCol");
            catalog.find_columns(&pattern).collect()
        };
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name().short_name(), "foo");
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_column_template_must_bind_object() {
        let catalog = CatalogBuilder::new("cat")
            .schema(
                SchemaBuilder::new("s").table(
                    TableBuilder::new("t")
                        .column(ColumnBuilder::new("c", "{subject} a <http://x/T> ."))
                        .column(ColumnBuilder::new("note", "# not a triple")),
                ),
            )
            .build()
            .unwrap();
        let table = catalog.find_tables(&ItemName::wild()).next().unwrap();
        for column in table.columns() {
            match column.pattern_template() {
                Err(CatalogError::MalformedTemplate { reason, .. }) => {
                    assert!(reason.contains("{object}"), "{}", reason)
                }
                other => panic!("expected malformed template, got {:?}", other),
            }
        }
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::MalformedTemplate { .. })
        ));
    }
}
