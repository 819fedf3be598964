//! RDF terms and triple patterns produced by the compiler.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph_catalog::item_name::ItemName;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// A graph-query variable, stored without the leading `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable(String);

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\u{b7}'
}

impl Variable {
    /// Creates a variable, replacing characters that are not legal in a
    /// SPARQL variable name with `_`.
    pub fn new(name: &str) -> Self {
        let cleaned: String = name
            .trim_start_matches(['?', '$'])
            .chars()
            .map(|c| if is_var_char(c) { c } else { '_' })
            .collect();
        // SPARQL forbids a leading U+00B7
        if cleaned.starts_with('\u{b7}') || cleaned.is_empty() {
            Variable(format!("_{}", cleaned))
        } else {
            Variable(cleaned)
        }
    }

    /// Deterministic variable for a catalog item (`schema·table·column`).
    pub fn from_item_name(name: &ItemName) -> Self {
        Variable::new(&name.sparql_name())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Iri(String),
    PrefixedName(String),
    /// Literal kept in its lexical SPARQL form, quotes and suffix included.
    Literal(String),
    BlankNode(String),
}

impl Term {
    pub fn var(variable: &Variable) -> Self {
        Term::Variable(variable.clone())
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::PrefixedName(name) => write!(f, "{}", name),
            Term::Literal(lexical) => write!(f, "{}", lexical),
            Term::BlankNode(id) => write!(f, "_:{}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Triple {
            subject,
            predicate,
            object,
        }
    }

    /// Variables mentioned by this triple, in subject/predicate/object order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Term::as_variable)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
