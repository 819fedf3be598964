use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use sql2sparql::{
    config,
    graph_catalog::load_catalog,
    sparql_generator::generate_sparql,
    sql_compiler::{function_registry::FunctionRegistry, SqlCompiler},
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// SPARQL query text
    Sparql,
    /// Compiled query algebra as JSON
    Json,
}

/// sql2sparql - compile SQL SELECT statements into SPARQL
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog YAML file describing the virtual tables
    /// (defaults to SQL2SPARQL_CATALOG, then catalog.yaml)
    #[arg(long)]
    catalog: Option<String>,

    /// YAML file with compiler settings, applied over the environment
    #[arg(long)]
    config: Option<String>,

    /// Schema tried first for unqualified table names
    #[arg(long)]
    default_schema: Option<String>,

    /// Never wrap the pattern in a SERVICE block
    #[arg(long)]
    no_service: bool,

    /// Check every pattern template when loading the catalog
    #[arg(long)]
    validate_catalog: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Sparql)]
    format: OutputFormat,

    /// SQL statement to compile
    sql: String,
}

impl From<&Cli> for config::CliConfig {
    fn from(cli: &Cli) -> Self {
        config::CliConfig {
            catalog_path: cli.catalog.clone(),
            config_file: cli.config.clone(),
            default_schema: cli.default_schema.clone(),
            no_service: cli.no_service,
            validate_catalog: cli.validate_catalog,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    // Environment, then --config file, then explicit flags
    let config = config::CompilerConfig::resolve((&cli).into()).context("Configuration error")?;

    let catalog = load_catalog(&config.catalog_path, config.validate_catalog)
        .with_context(|| format!("Failed to load catalog {}", config.catalog_path))?;
    log::debug!("Catalog '{}' loaded", catalog.name());

    let compiler = SqlCompiler::new(Arc::new(catalog), Arc::new(FunctionRegistry::standard()))
        .with_options(config.compile_options());
    let algebra = compiler.compile_sql(&cli.sql)?;

    match cli.format {
        OutputFormat::Sparql => println!("{}", generate_sparql(&algebra)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&algebra)?),
    }
    Ok(())
}
