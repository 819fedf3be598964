//! Graph-pattern templates.
//!
//! A template is a single triple written in SPARQL syntax with two
//! placeholders, `{subject}` and `{object}`:
//!
//! ```text
//! {subject} <http://example.com/zero> {object} .
//! {subject} a <http://example.com/foo> .
//! ```
//!
//! Column templates receive the table's subject variable and the column
//! variable. Table templates receive the subject variable and the table IRI.
//! A template whose first non-blank character is `#` is a comment and yields
//! no triple.

use serde::{Deserialize, Serialize};

use crate::graph_expr::term::{Term, Triple, Variable, RDF_TYPE};

use super::errors::CatalogError;

pub const SUBJECT_PLACEHOLDER: &str = "{subject}";
pub const OBJECT_PLACEHOLDER: &str = "{object}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateSlot {
    Subject,
    Object,
    Fixed(Term),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTemplate {
    source: String,
    /// `None` for comment templates.
    slots: Option<[TemplateSlot; 3]>,
}

impl PatternTemplate {
    pub fn parse(source: &str) -> Result<Self, CatalogError> {
        let trimmed = source.trim();
        if trimmed.starts_with('#') {
            return Ok(PatternTemplate {
                source: source.to_string(),
                slots: None,
            });
        }

        let mut tokens = tokenize(trimmed)?;
        strip_terminator(&mut tokens);

        if tokens.len() != 3 {
            return Err(CatalogError::malformed_template(
                source,
                format!("does not parse into 3 components (found {})", tokens.len()),
            ));
        }

        let mut slots = Vec::with_capacity(3);
        for token in &tokens {
            slots.push(parse_slot(source, token)?);
        }
        let slots: [TemplateSlot; 3] = slots
            .try_into()
            .map_err(|_| CatalogError::malformed_template(source, "does not parse into 3 components"))?;

        Ok(PatternTemplate {
            source: source.to_string(),
            slots: Some(slots),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_comment(&self) -> bool {
        self.slots.is_none()
    }

    pub fn uses_object(&self) -> bool {
        self.slots
            .as_ref()
            .map(|slots| slots.iter().any(|s| *s == TemplateSlot::Object))
            .unwrap_or(false)
    }

    /// Substitute the placeholders and return the resulting triple, or `None`
    /// for a comment template.
    pub fn instantiate(
        &self,
        subject: &Variable,
        object: Option<&Term>,
    ) -> Result<Option<Triple>, CatalogError> {
        let Some(slots) = &self.slots else {
            return Ok(None);
        };

        let resolve = |slot: &TemplateSlot| -> Result<Term, CatalogError> {
            match slot {
                TemplateSlot::Subject => Ok(Term::var(subject)),
                TemplateSlot::Object => object.cloned().ok_or_else(|| {
                    CatalogError::malformed_template(
                        &self.source,
                        "uses {object} but no object value is available",
                    )
                }),
                TemplateSlot::Fixed(term) => Ok(term.clone()),
            }
        };

        let triple = Triple::new(resolve(&slots[0])?, resolve(&slots[1])?, resolve(&slots[2])?);

        if matches!(triple.subject, Term::Literal(_)) {
            return Err(CatalogError::malformed_template(
                &self.source,
                "subject position holds a literal",
            ));
        }
        if matches!(triple.predicate, Term::Literal(_) | Term::BlankNode(_)) {
            return Err(CatalogError::malformed_template(
                &self.source,
                "predicate position must be an IRI or variable",
            ));
        }
        Ok(Some(triple))
    }
}

fn tokenize(source: &str) -> Result<Vec<String>, CatalogError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_iri = false;
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if in_iri {
            current.push(c);
            if c == '>' {
                in_iri = false;
            }
            continue;
        }
        match c {
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '<' => {
                in_iri = true;
                current.push(c);
            }
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            _ => current.push(c),
        }
    }

    if quote.is_some() {
        return Err(CatalogError::malformed_template(source, "unterminated literal"));
    }
    if in_iri {
        return Err(CatalogError::malformed_template(source, "unterminated IRI"));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn strip_terminator(tokens: &mut Vec<String>) {
    if tokens.last().map(String::as_str) == Some(".") {
        tokens.pop();
        return;
    }
    if let Some(last) = tokens.last_mut() {
        let glued = last.len() > 1
            && last.ends_with('.')
            && last.parse::<f64>().is_err()
            && !last.ends_with("..");
        if glued {
            last.pop();
        }
    }
}

fn parse_slot(source: &str, token: &str) -> Result<TemplateSlot, CatalogError> {
    match token {
        SUBJECT_PLACEHOLDER => return Ok(TemplateSlot::Subject),
        OBJECT_PLACEHOLDER => return Ok(TemplateSlot::Object),
        "a" => return Ok(TemplateSlot::Fixed(Term::Iri(RDF_TYPE.to_string()))),
        "true" | "false" => return Ok(TemplateSlot::Fixed(Term::Literal(token.to_string()))),
        _ => {}
    }

    let term = if let Some(inner) = token.strip_prefix('<') {
        let iri = inner.strip_suffix('>').ok_or_else(|| {
            CatalogError::malformed_template(source, format!("bad IRI `{}`", token))
        })?;
        Term::Iri(iri.to_string())
    } else if token.starts_with('"') || token.starts_with('\'') {
        Term::Literal(token.to_string())
    } else if let Some(name) = token.strip_prefix('?').or_else(|| token.strip_prefix('$')) {
        Term::Variable(Variable::new(name))
    } else if let Some(id) = token.strip_prefix("_:") {
        Term::BlankNode(id.to_string())
    } else if token.parse::<f64>().is_ok() {
        Term::Literal(token.to_string())
    } else if token.contains(':') && !token.contains('{') {
        Term::PrefixedName(token.to_string())
    } else {
        return Err(CatalogError::malformed_template(
            source,
            format!("unrecognised term `{}`", token),
        ));
    };
    Ok(TemplateSlot::Fixed(term))
}
