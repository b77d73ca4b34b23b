/**
 * model.rs
 * Raw triples (may reference blank nodes) and canonical statements
 */

use serde::Serialize;
use std::fmt;

use crate::errors::{KnError, Result};
use crate::term::{Term, TermResolver};

/// Run-scoped identifier of an RDF blank node
///
/// Has no meaning outside the parse that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlankNodeId(String);

impl BlankNodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// Subject or object position of a raw triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Node {
    Iri(String),
    Blank(BlankNodeId),
    Literal(String),
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Node::Blank(BlankNodeId::new(id))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal(value.into())
    }

    pub fn as_blank(&self) -> Option<&BlankNodeId> {
        match self {
            Node::Blank(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    /// Short shape name used in triple-type counts
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Iri(_) => "iri",
            Node::Blank(_) => "blank",
            Node::Literal(_) => "literal",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => write!(f, "<{}>", iri),
            Node::Blank(id) => write!(f, "{}", id),
            Node::Literal(value) => write!(f, "\"{}\"", value),
        }
    }
}

/// RDF statement as parsed, before blank-node resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: String,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: impl Into<String>, object: Node) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }

    /// Neither endpoint is a blank node
    pub fn is_filled(&self) -> bool {
        !self.subject.is_blank() && !self.object.is_blank()
    }

    /// Shape key such as `iri-iri-literal`
    pub fn shape(&self) -> String {
        format!("{}-iri-{}", self.subject.kind(), self.object.kind())
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate, self.object)
    }
}

/// Object of a canonical statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Object {
    Term(Term),
    Literal(String),
}

impl Object {
    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Object::Term(term) => Some(term),
            Object::Literal(_) => None,
        }
    }
}

/// Blank-free, term-resolved triple ready for the property-graph loader
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Object,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Object) -> Self {
        Self { subject, predicate, object }
    }

    /// Resolve a raw triple into a statement
    ///
    /// A triple that still references a blank node is an error, never a
    /// silent drop.
    pub fn from_triple(triple: &Triple, resolver: &TermResolver) -> Result<Self> {
        let subject = match &triple.subject {
            Node::Iri(iri) => resolver.resolve(iri),
            Node::Blank(id) => return Err(KnError::UnresolvedBlankNode(id.to_string())),
            Node::Literal(value) => {
                return Err(KnError::ValidationError(format!(
                    "Literal in subject position: \"{}\"",
                    value
                )))
            }
        };

        let object = match &triple.object {
            Node::Iri(iri) => Object::Term(resolver.resolve(iri)),
            Node::Literal(value) => Object::Literal(value.clone()),
            Node::Blank(id) => return Err(KnError::UnresolvedBlankNode(id.to_string())),
        };

        Ok(Self {
            subject,
            predicate: resolver.resolve(&triple.predicate),
            object,
        })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Object::Term(o) => write!(f, "({}, {}, {})", self.subject.id, self.predicate.id, o.id),
            Object::Literal(v) => write!(f, "({}, {}, \"{}\")", self.subject.id, self.predicate.id, v),
        }
    }
}
