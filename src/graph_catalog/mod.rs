pub mod catalog;
pub mod config;
pub mod errors;
pub mod item_name;
pub mod pattern_template;

#[cfg(test)]
pub mod testing;

pub use catalog::{
    Catalog, CatalogBuilder, Column, ColumnBuilder, Schema, SchemaBuilder, Table, TableBuilder,
    TableType,
};
pub use config::{load_catalog, CatalogConfig};
pub use errors::CatalogError;
pub use item_name::ItemName;
pub use pattern_template::PatternTemplate;
