//! Single-use accumulator that turns resolved SQL names into graph patterns.
//!
//! A [`QueryBuilder`] lives for exactly one compilation. Tables are bound
//! first (`add_table`), columns are registered lazily as expressions
//! reference them (`add_column`), and `build` freezes everything into a
//! [`QueryAlgebra`].
//!
//! Block layout rules:
//! - table-level templates and non-nullable columns go into required
//!   blocks; consecutive required triples share one block
//! - nullable columns, and columns requested as optional, get their own
//!   OPTIONAL block
//! - every triple of a LEFT JOIN binding lives in that binding's OPTIONAL
//!   group, nullable columns nested one level deeper
//! - BIND elements follow the pattern blocks, FILTER elements come last

use std::collections::{HashMap, HashSet};

use crate::graph_catalog::{item_name::ItemName, Catalog, Table};
use crate::graph_expr::expression_rewriter::ColumnResolver;
use crate::graph_expr::{GraphExpr, Term, Triple, Variable};

pub mod algebra;
pub mod errors;
pub mod table_binding;
pub mod view;

use algebra::{OptionalGroup, OrderCondition, PatternElement, Projection, QueryAlgebra, QueryColumn};
use errors::QueryBuilderError;
use table_binding::TableBinding;

pub struct QueryBuilder<'a> {
    catalog: &'a Catalog,
    default_schema: Option<String>,
    use_service: bool,
    bindings: Vec<TableBinding<'a>>,
    columns: Vec<QueryColumn>,
    /// (binding id, column index) -> index into `columns`
    column_index: HashMap<(usize, usize), usize>,
    blocks: Vec<PatternElement>,
    binds: Vec<PatternElement>,
    filters: Vec<GraphExpr>,
    projections: Vec<Projection>,
    display_names: HashSet<String>,
    distinct: bool,
    group_by: Vec<GraphExpr>,
    having: Vec<GraphExpr>,
    order_by: Vec<OrderCondition>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        QueryBuilder {
            catalog,
            default_schema: None,
            use_service: false,
            bindings: Vec::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            blocks: Vec::new(),
            binds: Vec::new(),
            filters: Vec::new(),
            projections: Vec::new(),
            display_names: HashSet::new(),
            distinct: false,
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Schema tried first for table names without a schema segment.
    pub fn with_default_schema(mut self, schema: Option<&str>) -> Self {
        self.default_schema = schema.map(str::to_string);
        self
    }

    /// Evaluate the pattern against the catalog's SPARQL endpoint.
    pub fn with_service(mut self, use_service: bool) -> Self {
        self.use_service = use_service;
        self
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn bindings(&self) -> &[TableBinding<'a>] {
        &self.bindings
    }

    pub fn binding(&self, id: usize) -> Result<&TableBinding<'a>, QueryBuilderError> {
        self.bindings
            .get(id)
            .ok_or(QueryBuilderError::UnknownBinding { id })
    }

    pub fn columns(&self) -> &[QueryColumn] {
        &self.columns
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    fn resolve_table(&self, name: &ItemName) -> Result<&'a Table, QueryBuilderError> {
        if name.schema().is_none() {
            if let Some(schema) = &self.default_schema {
                if let Some(table) = self.catalog.lookup_table(&name.with_schema(schema))? {
                    log::debug!("Resolved {} in default schema {}", name, schema);
                    return Ok(table);
                }
            }
        }
        self.catalog
            .lookup_table(name)?
            .ok_or_else(|| QueryBuilderError::UnknownTable {
                name: name.to_string(),
            })
    }

    /// Bind a catalog table under `alias` (the table name when `None`).
    ///
    /// With `optional` set the binding is the right side of a LEFT JOIN and
    /// all of its triples are collected in one OPTIONAL group.
    pub fn add_table(
        &mut self,
        table_name: &ItemName,
        alias: Option<&str>,
        optional: bool,
    ) -> Result<&TableBinding<'a>, QueryBuilderError> {
        let table = self.resolve_table(table_name)?;
        let alias = alias.unwrap_or_else(|| table.name().short_name());
        let binding_name = ItemName::new(
            table.name().catalog(),
            table.name().schema(),
            Some(alias),
            None,
        );

        // aliases share one namespace regardless of schema
        if self.bindings.iter().any(|b| b.alias() == alias) {
            return Err(QueryBuilderError::DuplicateAlias {
                alias: alias.to_string(),
            });
        }

        let subject = Variable::from_item_name(&binding_name);
        let object = table.iri().map(|iri| Term::Iri(iri.to_string()));
        let mut triples = Vec::new();
        for template in table.table_templates()? {
            if let Some(triple) = template.instantiate(&subject, object.as_ref())? {
                triples.push(triple);
            }
        }

        let optional_group = if optional {
            self.blocks.push(PatternElement::Optional(OptionalGroup {
                triples,
                ..Default::default()
            }));
            Some(self.blocks.len() - 1)
        } else {
            for triple in triples {
                self.push_required(triple);
            }
            None
        };

        let id = self.bindings.len();
        log::debug!(
            "Bound table {} as {} (subject {}, optional: {})",
            table.name(),
            binding_name,
            subject,
            optional
        );
        self.bindings
            .push(TableBinding::new(id, binding_name, table, optional_group));
        self.binding(id)
    }

    /// Appends to the trailing required block, or opens a new one.
    fn push_required(&mut self, triple: Triple) {
        if let Some(PatternElement::Required(triples)) = self.blocks.last_mut() {
            triples.push(triple);
        } else {
            self.blocks.push(PatternElement::Required(vec![triple]));
        }
    }

    fn group_mut(&mut self, group: usize) -> Result<&mut OptionalGroup, QueryBuilderError> {
        match self.blocks.get_mut(group) {
            Some(PatternElement::Optional(g)) => Ok(g),
            _ => Err(QueryBuilderError::UnknownBinding { id: group }),
        }
    }

    /// Resolve a column reference against the current bindings and return
    /// its variable, registering the column's triple the first time.
    pub fn add_column(&mut self, column: &ItemName, optional: bool) -> Result<Variable, QueryBuilderError> {
        let mut candidates = HashMap::new();
        for binding in &self.bindings {
            for (idx, col) in binding.table().columns().iter().enumerate() {
                candidates.insert(binding.column_name(col.short_name()), (binding.id(), idx));
            }
        }

        let (binding_id, column_idx) = *column
            .find_match(&candidates)?
            .ok_or_else(|| QueryBuilderError::UnknownColumn {
                name: column.to_string(),
            })?;

        if let Some(&registered) = self.column_index.get(&(binding_id, column_idx)) {
            return Ok(self.columns[registered].variable.clone());
        }

        let binding = self.binding(binding_id)?;
        let catalog_column = binding.table().column(column_idx)?;
        let name = binding.column_name(catalog_column.short_name());
        let subject = binding.subject().clone();
        let group = binding.optional_group();

        let variable = Variable::from_item_name(&name);
        let template = catalog_column.pattern_template()?;
        let triple = template
            .instantiate(&subject, Some(&Term::var(&variable)))?
            .ok_or_else(|| QueryBuilderError::MalformedTemplate {
                template: template.source().to_string(),
                reason: format!("column {} has a comment template", name.db_name()),
            })?;

        let nullable = catalog_column.is_nullable();
        let in_optional = match group {
            Some(group) => {
                let g = self.group_mut(group)?;
                if nullable {
                    g.nested.push(vec![triple]);
                } else {
                    g.triples.push(triple);
                }
                true
            }
            None if nullable || optional => {
                self.blocks
                    .push(PatternElement::Optional(OptionalGroup::single(triple)));
                true
            }
            None => {
                self.push_required(triple);
                false
            }
        };

        log::debug!("Registered column {} as {} (optional: {})", name, variable, in_optional);
        self.column_index
            .insert((binding_id, column_idx), self.columns.len());
        self.columns.push(QueryColumn {
            name,
            variable: variable.clone(),
            sql_type: catalog_column.sql_type().to_string(),
            nullable,
            optional: in_optional,
        });
        Ok(variable)
    }

    /// Register and project every column of the bindings matching
    /// `pattern` (all bindings for `None`), in binding then column order.
    pub fn add_all_columns(&mut self, pattern: Option<&ItemName>) -> Result<(), QueryBuilderError> {
        let targets: Vec<ItemName> = self
            .bindings
            .iter()
            .filter(|b| pattern.map(|p| p.matches(b.name())).unwrap_or(true))
            .map(|b| b.name().clone())
            .collect();

        if let Some(pattern) = pattern {
            match targets.len() {
                0 => {
                    return Err(QueryBuilderError::UnknownTable {
                        name: pattern.to_string(),
                    })
                }
                1 => {}
                count => {
                    return Err(QueryBuilderError::AmbiguousName {
                        name: pattern.to_string(),
                        count,
                    })
                }
            }
        }

        for binding_name in targets {
            let column_names: Vec<ItemName> = self
                .bindings
                .iter()
                .find(|b| b.name() == &binding_name)
                .map(|b| {
                    b.table()
                        .columns()
                        .iter()
                        .map(|c| b.column_name(c.short_name()))
                        .collect()
                })
                .unwrap_or_default();
            for column in column_names {
                let variable = self.add_column(&column, false)?;
                self.add_var(&variable, None)?;
            }
        }
        Ok(())
    }

    fn derive_display_name(&self, variable: &Variable) -> Result<String, QueryBuilderError> {
        let column = self.columns.iter().find(|c| &c.variable == variable);
        let mut candidates = Vec::new();
        if let Some(column) = column {
            candidates.push(column.name.short_name().to_string());
            candidates.push(
                ItemName::new(None, None, column.name.table(), column.name.column()).sparql_name(),
            );
        }
        candidates.push(variable.name().to_string());

        candidates
            .into_iter()
            .find(|c| !self.display_names.contains(c))
            .ok_or_else(|| QueryBuilderError::DuplicateProjection {
                name: variable.name().to_string(),
            })
    }

    /// Project `variable`. Without a display name one is derived from the
    /// column name, qualified by the binding alias when already taken.
    pub fn add_var(&mut self, variable: &Variable, display_name: Option<&str>) -> Result<(), QueryBuilderError> {
        let display = match display_name {
            Some(name) if self.display_names.contains(name) => {
                return Err(QueryBuilderError::DuplicateProjection {
                    name: name.to_string(),
                })
            }
            Some(name) => name.to_string(),
            None => self.derive_display_name(variable)?,
        };

        let column = self.columns.iter().find(|c| &c.variable == variable);
        let projection = Projection {
            variable: variable.clone(),
            display_name: display.clone(),
            expression: None,
            sql_type: column.map(|c| c.sql_type.clone()),
            nullable: column.map(|c| c.optional).unwrap_or(true),
        };
        self.display_names.insert(display);
        self.projections.push(projection);
        Ok(())
    }

    /// Project a computed expression under `display_name`.
    ///
    /// Aggregates become projection expressions; anything else is bound with
    /// BIND and the bound variable is projected.
    pub fn add_computed(&mut self, expr: GraphExpr, display_name: &str) -> Result<Variable, QueryBuilderError> {
        if self.display_names.contains(display_name) {
            return Err(QueryBuilderError::DuplicateProjection {
                name: display_name.to_string(),
            });
        }
        let variable = Variable::new(display_name);
        let expression = if expr.contains_aggregate() {
            Some(expr)
        } else {
            self.binds.push(PatternElement::Bind {
                expr,
                variable: variable.clone(),
            });
            None
        };
        self.display_names.insert(display_name.to_string());
        self.projections.push(Projection {
            variable: variable.clone(),
            display_name: display_name.to_string(),
            expression,
            sql_type: None,
            nullable: true,
        });
        Ok(variable)
    }

    /// Variable projected under `display_name`, for ORDER BY / HAVING aliases.
    pub fn projection_variable(&self, display_name: &str) -> Option<&Variable> {
        self.projections
            .iter()
            .find(|p| p.display_name == display_name)
            .map(|p| &p.variable)
    }

    pub fn add_filter(&mut self, expr: GraphExpr) {
        self.filters.push(expr);
    }

    /// Attach a filter to a LEFT JOIN binding's OPTIONAL group. Plain
    /// bindings get a top-level filter.
    pub fn add_binding_filter(&mut self, binding_id: usize, expr: GraphExpr) -> Result<(), QueryBuilderError> {
        match self.binding(binding_id)?.optional_group() {
            Some(group) => self.group_mut(group)?.filters.push(expr),
            None => self.filters.push(expr),
        }
        Ok(())
    }

    pub fn add_bind(&mut self, expr: GraphExpr, variable: Variable) {
        self.binds.push(PatternElement::Bind { expr, variable });
    }

    pub fn set_distinct(&mut self, distinct: bool) {
        self.distinct = distinct;
    }

    pub fn add_group_by(&mut self, expr: GraphExpr) {
        self.group_by.push(expr);
    }

    pub fn add_having(&mut self, expr: GraphExpr) {
        self.having.push(expr);
    }

    pub fn add_order_by(&mut self, expr: GraphExpr, ascending: bool) {
        self.order_by.push(OrderCondition { expr, ascending });
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<u64>) {
        self.offset = offset;
    }

    pub fn build(self) -> Result<QueryAlgebra, QueryBuilderError> {
        if self.bindings.is_empty() {
            return Err(QueryBuilderError::EmptyFromClause);
        }

        let mut elements: Vec<PatternElement> = self
            .blocks
            .into_iter()
            .filter(|e| !matches!(e, PatternElement::Optional(g) if g.is_empty()))
            .collect();
        elements.extend(self.binds);
        elements.extend(self.filters.into_iter().map(PatternElement::Filter));

        let service = if self.use_service {
            self.catalog.sparql_endpoint().map(str::to_string)
        } else {
            None
        };

        log::debug!(
            "Built query algebra: {} projection(s), {} element(s)",
            self.projections.len(),
            elements.len()
        );

        Ok(QueryAlgebra {
            prefixes: self.catalog.prefixes().to_vec(),
            service,
            distinct: self.distinct,
            projections: self.projections,
            elements,
            group_by: self.group_by,
            having: self.having,
            order_by: self.order_by,
            limit: self.limit,
            offset: self.offset,
            columns: self.columns,
        })
    }
}

impl ColumnResolver for QueryBuilder<'_> {
    fn column_for(&self, variable: &Variable) -> Option<&ItemName> {
        self.columns
            .iter()
            .find(|c| &c.variable == variable)
            .map(|c| &c.name)
    }
}
