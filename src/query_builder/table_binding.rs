use crate::graph_catalog::{item_name::ItemName, Table};
use crate::graph_expr::Variable;

/// One FROM/JOIN occurrence of a table.
///
/// `name` is the catalog name of the table with its table segment replaced
/// by the alias, so `FROM foo f` binds `cat.schema.f`.
#[derive(Debug, Clone)]
pub struct TableBinding<'a> {
    id: usize,
    name: ItemName,
    table: &'a Table,
    subject: Variable,
    /// Index into the builder's pattern blocks of this binding's OPTIONAL
    /// group, for the right side of a LEFT JOIN.
    optional_group: Option<usize>,
}

impl<'a> TableBinding<'a> {
    pub(crate) fn new(id: usize, name: ItemName, table: &'a Table, optional_group: Option<usize>) -> Self {
        let subject = Variable::from_item_name(&name);
        TableBinding {
            id,
            name,
            table,
            subject,
            optional_group,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &ItemName {
        &self.name
    }

    pub fn alias(&self) -> &str {
        self.name.short_name()
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn subject(&self) -> &Variable {
        &self.subject
    }

    pub fn is_optional(&self) -> bool {
        self.optional_group.is_some()
    }

    pub(crate) fn optional_group(&self) -> Option<usize> {
        self.optional_group
    }

    /// Name under which column `column` of this binding is addressed.
    pub fn column_name(&self, column: &str) -> ItemName {
        self.name.with_column(column)
    }
}
