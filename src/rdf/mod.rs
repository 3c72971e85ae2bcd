//! RDF Terms and Triples
//!
//! A minimal RDF model: IRIs, blank nodes, literals and the triples built from
//! them. Equality is structural; every type is totally ordered so graphs can be
//! kept in sorted sets and serialize deterministically.

pub mod graph;

pub use graph::{BlankNodeArena, Dataset, Graph, GraphName, ScopeSource};

use crate::error::LdpError;
use crate::vocab::{rdf, xsd};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute IRI
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Iri(String);

impl Iri {
    /// Wrap a string known to be an absolute IRI (vocabulary constants, stored data).
    pub fn new(iri: impl Into<String>) -> Self {
        Iri(iri.into())
    }

    /// Parse client input, rejecting strings without a scheme or with whitespace.
    pub fn parse(iri: &str) -> Result<Self, LdpError> {
        let scheme_end = iri
            .find(':')
            .ok_or_else(|| LdpError::MalformedInput(format!("IRI has no scheme: {}", iri)))?;
        let scheme = &iri[..scheme_end];
        let valid_scheme = !scheme.is_empty()
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
        if !valid_scheme {
            return Err(LdpError::MalformedInput(format!(
                "IRI has an invalid scheme: {}",
                iri
            )));
        }
        if iri.chars().any(|c| c.is_whitespace() || c == '<' || c == '>' || c == '"') {
            return Err(LdpError::MalformedInput(format!(
                "IRI contains illegal characters: {}",
                iri
            )));
        }
        Ok(Iri(iri.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The IRI with any fragment removed.
    pub fn without_fragment(&self) -> Iri {
        match self.0.split_once('#') {
            Some((base, _)) => Iri(base.to_string()),
            None => self.clone(),
        }
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Iri {
    fn from(value: &str) -> Self {
        Iri::new(value)
    }
}

impl PartialEq<str> for Iri {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Iri {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Blank node handle.
///
/// Identity is local: `scope` names the [`BlankNodeArena`] that allocated the
/// handle, so nodes from unrelated operations never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankNode {
    scope: u64,
    index: u32,
}

impl BlankNode {
    pub(crate) fn new(scope: u64, index: u32) -> Self {
        BlankNode { scope, index }
    }

    pub fn scope(&self) -> u64 {
        self.scope
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:b{}x{}", self.scope, self.index)
    }
}

/// RDF literal: lexical form, datatype and optional language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    datatype: Iri,
    language: Option<String>,
}

impl Literal {
    /// Plain `xsd:string` literal
    pub fn simple(lexical: impl Into<String>) -> Self {
        Literal {
            lexical: lexical.into(),
            datatype: Iri::new(xsd::STRING),
            language: None,
        }
    }

    /// Language-tagged literal (`rdf:langString`); tags compare lowercase.
    pub fn lang(lexical: impl Into<String>, language: &str) -> Self {
        Literal {
            lexical: lexical.into(),
            datatype: Iri::new(rdf::LANG_STRING),
            language: Some(language.to_ascii_lowercase()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Literal {
            lexical: lexical.into(),
            datatype,
            language: None,
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.lexical.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                other => write!(f, "{}", other)?,
            }
        }
        f.write_str("\"")?;
        match &self.language {
            Some(tag) => write!(f, "@{}", tag),
            None if self.datatype == xsd::STRING => Ok(()),
            None => write!(f, "^^<{}>", self.datatype),
        }
    }
}

/// Any RDF term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(node) => write!(f, "{}", node),
            Term::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

impl From<Iri> for Term {
    fn from(value: Iri) -> Self {
        Term::Iri(value)
    }
}

impl From<BlankNode> for Term {
    fn from(value: BlankNode) -> Self {
        Term::BlankNode(value)
    }
}

impl From<Literal> for Term {
    fn from(value: Literal) -> Self {
        Term::Literal(value)
    }
}

impl From<Subject> for Term {
    fn from(value: Subject) -> Self {
        match value {
            Subject::Iri(iri) => Term::Iri(iri),
            Subject::BlankNode(node) => Term::BlankNode(node),
        }
    }
}

/// Subject position term: IRI or blank node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Iri(Iri),
    BlankNode(BlankNode),
}

impl Subject {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Subject::Iri(iri) => Some(iri),
            Subject::BlankNode(_) => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(iri) => write!(f, "<{}>", iri),
            Subject::BlankNode(node) => write!(f, "{}", node),
        }
    }
}

impl From<Iri> for Subject {
    fn from(value: Iri) -> Self {
        Subject::Iri(value)
    }
}

impl From<BlankNode> for Subject {
    fn from(value: BlankNode) -> Self {
        Subject::BlankNode(value)
    }
}

/// Immutable (subject, predicate, object) statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Subject>, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Triple {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// N-Triples line without the trailing newline.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}
