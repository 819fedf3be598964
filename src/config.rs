use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

use crate::sql_compiler::CompileOptions;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Compiler configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Path to the catalog YAML file
    #[validate(length(min = 1, message = "Catalog path cannot be empty"))]
    pub catalog_path: String,

    /// Schema tried first for unqualified table names
    #[validate(length(min = 1, message = "Default schema cannot be empty"))]
    pub default_schema: Option<String>,

    /// Wrap generated patterns in a SERVICE block when the catalog names an endpoint
    pub use_service_clause: bool,

    /// Check every pattern template when the catalog is loaded
    pub validate_catalog: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            catalog_path: "catalog.yaml".to_string(),
            default_schema: None,
            use_service_clause: true,
            validate_catalog: false,
        }
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            catalog_path: env::var("SQL2SPARQL_CATALOG")
                .unwrap_or_else(|_| "catalog.yaml".to_string()),
            default_schema: env::var("SQL2SPARQL_DEFAULT_SCHEMA").ok(),
            use_service_clause: parse_env_var("SQL2SPARQL_USE_SERVICE", "true")?,
            validate_catalog: parse_env_var("SQL2SPARQL_VALIDATE_CATALOG", "false")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Layer the configuration sources: environment first, then the YAML
    /// file named on the command line, then explicit CLI flags.
    pub fn resolve(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = Self::from_env()?;
        if let Some(path) = &cli.config_file {
            log::debug!("Reading compiler configuration from {}", path);
            config.merge(Self::from_yaml_file(path)?);
        }
        config.apply_cli(cli);

        config.validate()?;
        Ok(config)
    }

    /// CLI values override only what was actually given on the command line.
    fn apply_cli(&mut self, cli: CliConfig) {
        if let Some(catalog_path) = cli.catalog_path {
            self.catalog_path = catalog_path;
        }
        if cli.default_schema.is_some() {
            self.default_schema = cli.default_schema;
        }
        if cli.no_service {
            self.use_service_clause = false;
        }
        if cli.validate_catalog {
            self.validate_catalog = true;
        }
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge with another configuration, `other` taking precedence.
    /// An unset default schema in `other` keeps the current one.
    pub fn merge(&mut self, other: Self) {
        self.catalog_path = other.catalog_path;
        if other.default_schema.is_some() {
            self.default_schema = other.default_schema;
        }
        self.use_service_clause = other.use_service_clause;
        self.validate_catalog = other.validate_catalog;
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            default_schema: self.default_schema.clone(),
            use_service: self.use_service_clause,
        }
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub catalog_path: Option<String>,
    pub config_file: Option<String>,
    pub default_schema: Option<String>,
    pub no_service: bool,
    pub validate_catalog: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            "SQL2SPARQL_CATALOG",
            "SQL2SPARQL_DEFAULT_SCHEMA",
            "SQL2SPARQL_USE_SERVICE",
            "SQL2SPARQL_VALIDATE_CATALOG",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = CompilerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.use_service_clause);
        assert!(!config.validate_catalog);
        assert_eq!(config.default_schema, None);
    }

    #[test]
    fn test_empty_catalog_path() {
        let config = CompilerConfig {
            catalog_path: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_default_schema() {
        let config = CompilerConfig {
            default_schema: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        env::set_var("SQL2SPARQL_CATALOG", "/tmp/catalog.yaml");
        env::set_var("SQL2SPARQL_DEFAULT_SCHEMA", "testSchema");
        env::set_var("SQL2SPARQL_USE_SERVICE", "false");

        let config = CompilerConfig::from_env().unwrap();
        assert_eq!(config.catalog_path, "/tmp/catalog.yaml");
        assert_eq!(config.default_schema.as_deref(), Some("testSchema"));
        assert!(!config.use_service_clause);
        assert!(!config.validate_catalog);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_bad_bool() {
        clear_env();
        env::set_var("SQL2SPARQL_VALIDATE_CATALOG", "sometimes");
        match CompilerConfig::from_env() {
            Err(ConfigError::Parse { field, value, .. }) => {
                assert_eq!(field, "SQL2SPARQL_VALIDATE_CATALOG");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
        clear_env();
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "catalog_path: ./catalog.yaml").unwrap();
        writeln!(file, "validate_catalog: true").unwrap();

        let config = CompilerConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.catalog_path, "./catalog.yaml");
        assert!(config.validate_catalog);
        assert!(config.use_service_clause);
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        clear_env();
        env::set_var("SQL2SPARQL_CATALOG", "/etc/env-catalog.yaml");
        env::set_var("SQL2SPARQL_DEFAULT_SCHEMA", "envSchema");
        env::set_var("SQL2SPARQL_VALIDATE_CATALOG", "true");

        let config = CompilerConfig::resolve(CliConfig {
            default_schema: Some("cliSchema".to_string()),
            no_service: true,
            ..Default::default()
        })
        .unwrap();
        // unset CLI values keep the environment's
        assert_eq!(config.catalog_path, "/etc/env-catalog.yaml");
        assert!(config.validate_catalog);
        assert_eq!(config.default_schema.as_deref(), Some("cliSchema"));
        assert!(!config.use_service_clause);

        let config = CompilerConfig::resolve(CliConfig {
            catalog_path: Some("cli.yaml".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.catalog_path, "cli.yaml");
        assert_eq!(config.default_schema.as_deref(), Some("envSchema"));
        assert!(config.use_service_clause);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_yaml_file_between_env_and_cli() {
        clear_env();
        env::set_var("SQL2SPARQL_DEFAULT_SCHEMA", "envSchema");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "catalog_path: from-file.yaml").unwrap();
        writeln!(file, "use_service_clause: false").unwrap();

        let config = CompilerConfig::resolve(CliConfig {
            config_file: Some(file.path().display().to_string()),
            validate_catalog: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.catalog_path, "from-file.yaml");
        assert!(!config.use_service_clause);
        // the file leaves the schema unset, so the environment's survives
        assert_eq!(config.default_schema.as_deref(), Some("envSchema"));
        assert!(config.validate_catalog);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_empty_catalog_path() {
        clear_env();
        assert!(matches!(
            CompilerConfig::resolve(CliConfig {
                catalog_path: Some(String::new()),
                ..Default::default()
            }),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_merge_keeps_schema() {
        let mut base = CompilerConfig {
            default_schema: Some("testSchema".to_string()),
            ..Default::default()
        };
        base.merge(CompilerConfig {
            catalog_path: "other.yaml".to_string(),
            use_service_clause: false,
            ..Default::default()
        });
        assert_eq!(base.catalog_path, "other.yaml");
        assert_eq!(base.default_schema.as_deref(), Some("testSchema"));
        assert_eq!(
            base.compile_options(),
            CompileOptions {
                default_schema: Some("testSchema".to_string()),
                use_service: false,
            }
        );
    }
}
