//! Hierarchical catalog identifiers.
//!
//! An [`ItemName`] addresses a catalog, schema, table or column with up to
//! four segments. Absent segments act as wildcards: `matches` only compares
//! the segments the *pattern* carries, so `foo.IntCol` matches
//! `cat.schema.foo.IntCol` but not the other way round.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

/// Separator used when a name is rendered for SQL / diagnostics.
pub const DB_SEPARATOR: &str = ".";

/// Separator used when a name is folded into a graph variable.
/// U+00B7 is a legal SPARQL variable character, unlike `.`.
pub const GRAPH_SEPARATOR: &str = "\u{b7}";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ItemName {
    catalog: Option<String>,
    schema: Option<String>,
    table: Option<String>,
    column: Option<String>,
}

fn segment(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}

impl ItemName {
    /// Builds a name from optional segments. Empty strings are treated as absent.
    pub fn new(
        catalog: Option<&str>,
        schema: Option<&str>,
        table: Option<&str>,
        column: Option<&str>,
    ) -> Self {
        ItemName {
            catalog: segment(catalog),
            schema: segment(schema),
            table: segment(table),
            column: segment(column),
        }
    }

    /// The fully wild name. Matches everything.
    pub fn wild() -> Self {
        ItemName::default()
    }

    pub fn schema_name(catalog: Option<&str>, schema: &str) -> Self {
        ItemName::new(catalog, Some(schema), None, None)
    }

    pub fn table_name(schema: Option<&str>, table: &str) -> Self {
        ItemName::new(None, schema, Some(table), None)
    }

    pub fn column_name(table: Option<&str>, column: &str) -> Self {
        ItemName::new(None, None, table, Some(column))
    }

    /// Builds a name from dotted SQL parts (`col`, `t.col`, `s.t.col`, `c.s.t.col`).
    /// Returns `None` when there are no parts or more than four.
    pub fn from_column_parts(parts: &[String]) -> Option<Self> {
        let p = |i: usize| parts.get(i).map(String::as_str);
        match parts.len() {
            1 => Some(ItemName::new(None, None, None, p(0))),
            2 => Some(ItemName::new(None, None, p(0), p(1))),
            3 => Some(ItemName::new(None, p(0), p(1), p(2))),
            4 => Some(ItemName::new(p(0), p(1), p(2), p(3))),
            _ => None,
        }
    }

    /// Same as [`ItemName::from_column_parts`] but for table references
    /// (`t`, `s.t`, `c.s.t`).
    pub fn from_table_parts(parts: &[String]) -> Option<Self> {
        let p = |i: usize| parts.get(i).map(String::as_str);
        match parts.len() {
            1 => Some(ItemName::new(None, None, p(0), None)),
            2 => Some(ItemName::new(None, p(0), p(1), None)),
            3 => Some(ItemName::new(p(0), p(1), p(2), None)),
            _ => None,
        }
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Copy of this name with the column segment replaced.
    pub fn with_column(&self, column: &str) -> Self {
        ItemName {
            column: segment(Some(column)),
            ..self.clone()
        }
    }

    pub fn with_schema(&self, schema: &str) -> Self {
        ItemName {
            schema: segment(Some(schema)),
            ..self.clone()
        }
    }

    /// Copy of this name with the column segment dropped.
    pub fn without_column(&self) -> Self {
        ItemName {
            column: None,
            ..self.clone()
        }
    }

    fn segments(&self) -> [Option<&str>; 4] {
        [
            self.catalog.as_deref(),
            self.schema.as_deref(),
            self.table.as_deref(),
            self.column.as_deref(),
        ]
    }

    /// All segments absent.
    pub fn is_wild(&self) -> bool {
        self.segments().iter().all(Option::is_none)
    }

    /// At least one segment absent.
    pub fn has_wild(&self) -> bool {
        self.segments().iter().any(Option::is_none)
    }

    /// True when every segment present in `self` equals the same segment of
    /// `other`. Asymmetric.
    pub fn matches(&self, other: &ItemName) -> bool {
        self.segments()
            .iter()
            .zip(other.segments().iter())
            .all(|(mine, theirs)| match mine {
                Some(m) => theirs.as_deref() == Some(*m),
                None => true,
            })
    }

    /// Resolve this name against a keyed collection.
    ///
    /// Fully specified names use an exact lookup. A fully wild name returns
    /// the only entry of a single-entry map. Otherwise every key is tested
    /// with [`ItemName::matches`]; more than one hit is an ambiguity error.
    pub fn find_match<'m, V>(
        &self,
        map: &'m HashMap<ItemName, V>,
    ) -> Result<Option<&'m V>, CatalogError> {
        if !self.has_wild() {
            return Ok(map.get(self));
        }

        if self.is_wild() {
            return match map.len() {
                0 => Ok(None),
                1 => Ok(map.values().next()),
                count => Err(CatalogError::AmbiguousName {
                    name: self.to_string(),
                    count,
                }),
            };
        }

        let mut hits = map.iter().filter(|(key, _)| self.matches(key));
        let first = hits.next();
        let extra = hits.count();
        match (first, extra) {
            (None, _) => Ok(None),
            (Some((_, value)), 0) => Ok(Some(value)),
            (Some(_), extra) => Err(CatalogError::AmbiguousName {
                name: self.to_string(),
                count: extra + 1,
            }),
        }
    }

    /// Every key in `keys` this name matches.
    pub fn list_matches<'k, I>(&self, keys: I) -> HashSet<&'k ItemName>
    where
        I: IntoIterator<Item = &'k ItemName>,
    {
        keys.into_iter().filter(|key| self.matches(key)).collect()
    }

    /// Most specific present segment.
    pub fn short_name(&self) -> &str {
        self.column
            .as_deref()
            .or(self.table.as_deref())
            .or(self.schema.as_deref())
            .or(self.catalog.as_deref())
            .unwrap_or("")
    }

    fn join_from_schema(&self, separator: &str) -> String {
        [self.schema(), self.table(), self.column()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// `schema.table.column` with absent segments skipped.
    pub fn db_name(&self) -> String {
        self.join_from_schema(DB_SEPARATOR)
    }

    /// `schema·table·column`, the form used for graph variable names.
    pub fn sparql_name(&self) -> String {
        self.join_from_schema(GRAPH_SEPARATOR)
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wild() {
            return write!(f, "*");
        }
        let rendered = self
            .segments()
            .iter()
            .map(|s| s.unwrap_or("*"))
            .collect::<Vec<_>>();
        // leading wildcards add nothing to a diagnostic
        let start = self.segments().iter().position(Option::is_some).unwrap_or(0);
        write!(f, "{}", rendered[start..].join(DB_SEPARATOR))
    }
}
