//! Loading catalog definitions from YAML files.

use std::io::Write;

use sql2sparql::graph_catalog::{load_catalog, CatalogConfig, CatalogError, ItemName};

fn fixture_path() -> String {
    format!("{}/tests/fixtures/test_catalog.yaml", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_load_fixture_catalog() {
    let catalog = load_catalog(fixture_path(), true).expect("fixture catalog should load");

    assert_eq!(catalog.name(), "testCatalog");
    assert_eq!(catalog.sparql_endpoint(), Some("http://localhost:3030/ds/sparql"));
    assert_eq!(
        catalog.prefixes(),
        &[("ex".to_string(), "http://example.com/".to_string())]
    );

    let foo = catalog
        .lookup_table(&ItemName::table_name(None, "foo"))
        .unwrap()
        .expect("foo should resolve");
    assert_eq!(foo.column_count(), 4);
    assert_eq!(foo.iri(), Some("http://example.com/foo"));
    assert_eq!(foo.remarks(), Some("Things with four properties"));
    assert_eq!(foo.column_index("IntCol"), Some(2));
    assert!(foo.column_by_name("NullableIntCol").unwrap().is_nullable());
    assert_eq!(foo.column_by_name("IntCol").unwrap().sql_type(), "INTEGER");
}

#[test]
fn test_find_columns_across_tables() {
    let catalog = load_catalog(fixture_path(), false).unwrap();
    let pattern = ItemName::column_name(None, "IntCol");
    assert_eq!(catalog.find_columns(&pattern).count(), 2);

    let qualified = ItemName::column_name(Some("bar"), "IntCol");
    assert_eq!(catalog.find_columns(&qualified).count(), 1);
}

#[test]
fn test_missing_catalog_file() {
    match load_catalog("/definitely/not/here.yaml", false) {
        Err(CatalogError::ConfigReadError { .. }) => {}
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn test_malformed_template_caught_by_validation() {
    let yaml = r#"
name: broken
schemas:
  - name: s
    tables:
      - name: t
        columns:
          - name: c
            template: "{subject} <http://example.com/p>"
"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    // building does not instantiate templates
    assert!(load_catalog(file.path(), false).is_ok());
    match load_catalog(file.path(), true) {
        Err(CatalogError::MalformedTemplate { template, .. }) => {
            assert_eq!(template, "{subject} <http://example.com/p>");
        }
        other => panic!("expected malformed template, got {:?}", other),
    }
}

#[test]
fn test_table_without_columns_rejected() {
    let yaml = "name: c\nschemas:\n  - name: s\n    tables:\n      - name: empty\n";
    let config = CatalogConfig::from_yaml_str(yaml).unwrap();
    assert!(matches!(
        config.build_catalog(),
        Err(CatalogError::InvalidConfig { .. })
    ));
}

#[test]
fn test_duplicate_table_rejected() {
    let yaml = r#"
name: c
schemas:
  - name: s
    tables:
      - name: t
        columns:
          - name: a
            template: "{subject} <http://example.com/a> {object} ."
      - name: t
        columns:
          - name: b
            template: "{subject} <http://example.com/b> {object} ."
"#;
    let config = CatalogConfig::from_yaml_str(yaml).unwrap();
    assert!(matches!(
        config.build_catalog(),
        Err(CatalogError::DuplicateTable { .. })
    ));
}
