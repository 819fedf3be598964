//! SPARQL 1.1 text generation for compiled queries.

mod errors;
mod to_sparql;

pub use errors::SparqlGeneratorError;
pub use to_sparql::ToSparql;

use crate::query_builder::algebra::QueryAlgebra;

pub fn generate_sparql(algebra: &QueryAlgebra) -> Result<String, SparqlGeneratorError> {
    algebra.to_sparql()
}
