//! Blank-node resolution
//!
//! Rewrites the composite OWL expressions encoded through blank nodes into
//! direct statements between concrete terms:
//!
//! ```text
//! S subClassOf _:r        _:r a Restriction ; onProperty P ; someValuesFrom V
//!   => (S, P, V)
//!
//! S equivalentClass _:c   _:c a Class ; intersectionOf (A B _:r)
//!   => (S, equivalentClass, A) (S, equivalentClass, B) (S, P_r, V_r)
//! ```
//!
//! Every blank node that does not end up consumed by a successful rewrite is
//! reported as unresolved together with the reason.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

use crate::term::{vocab, TermResolver};
use crate::triples::collector::{BlankNodeContext, BlankNodeTripleSets};
use crate::triples::model::{BlankNodeId, Node, Statement, Triple};

/// Longest `rdf:first`/`rdf:rest` chain walked before a list is declared malformed
pub const MAX_LIST_LENGTH: usize = 1024;

/// Why a blank node could not be rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum UnresolvedReason {
    /// No known pattern among the node's predicates
    UnrecognizedPattern,
    /// Markers of more than one pattern (e.g. `someValuesFrom` and `intersectionOf`)
    ConflictingPattern,
    /// Recognized pattern but no concrete term refers to it
    NoReferrer,
    /// Restriction value or list member is a blank expression we do not inline
    NestedExpression,
    /// List not terminated by `rdf:nil`, cyclic, too long, or with malformed cells
    MalformedList,
    /// Only referenced by blank nodes whose own resolution did not consume it
    Orphaned,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnresolvedReason::UnrecognizedPattern => "unrecognized pattern",
            UnresolvedReason::ConflictingPattern => "conflicting pattern",
            UnresolvedReason::NoReferrer => "no concrete referrer",
            UnresolvedReason::NestedExpression => "nested expression",
            UnresolvedReason::MalformedList => "malformed list",
            UnresolvedReason::Orphaned => "orphaned",
        };
        write!(f, "{}", s)
    }
}

/// Recognized composite pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PatternKind {
    Restriction,
    ClassExpression,
    List,
}

#[derive(Debug)]
enum Pattern<'a> {
    Restriction { property: &'a str, value: &'a Node },
    ClassExpression { list: &'a Node },
    List,
}

impl Pattern<'_> {
    fn kind(&self) -> PatternKind {
        match self {
            Pattern::Restriction { .. } => PatternKind::Restriction,
            Pattern::ClassExpression { .. } => PatternKind::ClassExpression,
            Pattern::List => PatternKind::List,
        }
    }
}

/// One resolved list member
#[derive(Debug, Clone)]
enum Member {
    /// Concrete term or literal, linked with the referrer's predicate
    Value(Node),
    /// Inlined restriction, linked with the restriction's own property
    Restriction { property: String, value: Node },
}

/// Resolver output
#[derive(Debug, Clone, Default, Serialize)]
pub struct Resolution {
    pub statements: BTreeSet<Statement>,
    pub unresolved: BTreeMap<BlankNodeId, UnresolvedReason>,
    pub resolved: BTreeMap<PatternKind, usize>,
}

impl Resolution {
    pub fn is_unresolved(&self, id: &BlankNodeId) -> bool {
        self.unresolved.contains_key(id)
    }

    pub fn unresolved_ids(&self) -> BTreeSet<&BlankNodeId> {
        self.unresolved.keys().collect()
    }

    /// Unresolved count per reason
    pub fn unresolved_by_reason(&self) -> BTreeMap<UnresolvedReason, usize> {
        let mut counts = BTreeMap::new();
        for reason in self.unresolved.values() {
            *counts.entry(*reason).or_insert(0) += 1;
        }
        counts
    }
}

/// Rewrites blank-node triple sets into canonical statements
pub struct BlankNodeResolver<'a> {
    sets: &'a BlankNodeTripleSets,
    terms: &'a TermResolver,
}

impl<'a> BlankNodeResolver<'a> {
    pub fn new(sets: &'a BlankNodeTripleSets, terms: &'a TermResolver) -> Self {
        Self { sets, terms }
    }

    /// Resolve every blank node in the sets
    ///
    /// Pure function of the input: iteration is over ordered maps and output
    /// collections are ordered, so repeated runs give identical results.
    pub fn resolve(&self) -> Resolution {
        let mut resolution = Resolution::default();
        let mut consumed: BTreeSet<&BlankNodeId> = BTreeSet::new();

        for (id, ctx) in self.sets.iter() {
            if !Self::is_root(ctx) {
                continue;
            }

            match self.resolve_root(ctx) {
                Ok((kind, statements, nested)) => {
                    debug!("[BlankNodeResolver] {} resolved as {:?} ({} statements)", id, kind, statements.len());
                    *resolution.resolved.entry(kind).or_insert(0) += 1;
                    resolution.statements.extend(statements);
                    consumed.insert(id);
                    consumed.extend(nested);
                }
                Err(reason) => {
                    debug!("[BlankNodeResolver] {} unresolved: {}", id, reason);
                    resolution.unresolved.insert(id.clone(), reason);
                }
            }
        }

        for id in self.sets.ids() {
            if !consumed.contains(id) && !resolution.unresolved.contains_key(id) {
                resolution.unresolved.insert(id.clone(), UnresolvedReason::Orphaned);
            }
        }

        if !resolution.unresolved.is_empty() {
            warn!(
                "[BlankNodeResolver] {} of {} blank nodes unresolved",
                resolution.unresolved.len(),
                self.sets.len()
            );
        }

        resolution
    }

    /// Entry points: referenced by a concrete term, or not referenced at all.
    /// Nodes referenced only from other blank nodes belong to their parent.
    fn is_root(ctx: &BlankNodeContext) -> bool {
        ctx.concrete_referrers().next().is_some() || !ctx.has_blank_referrer()
    }

    #[allow(clippy::type_complexity)]
    fn resolve_root(
        &self,
        ctx: &'a BlankNodeContext,
    ) -> Result<(PatternKind, Vec<Statement>, BTreeSet<&'a BlankNodeId>), UnresolvedReason> {
        let pattern = classify(ctx)?;
        let kind = pattern.kind();

        let referrers: Vec<(&str, &str)> = ctx.concrete_referrers().collect();
        if referrers.is_empty() {
            return Err(UnresolvedReason::NoReferrer);
        }

        let mut nested = BTreeSet::new();
        let mut triples = Vec::new();

        match pattern {
            Pattern::Restriction { property, value } => {
                for (subject, _) in &referrers {
                    triples.push(Triple::new(Node::iri(*subject), property, value.clone()));
                }
            }
            Pattern::ClassExpression { list } => {
                let members = self.walk_list(list, &mut nested)?;
                emit_members(&referrers, &members, &mut triples);
            }
            Pattern::List => {
                let head = ctx
                    .as_object
                    .first()
                    .map(|t| &t.object)
                    .ok_or(UnresolvedReason::NoReferrer)?;
                let members = self.walk_list(head, &mut nested)?;
                emit_members(&referrers, &members, &mut triples);
            }
        }

        let mut statements = Vec::with_capacity(triples.len());
        for triple in &triples {
            let statement =
                Statement::from_triple(triple, self.terms).map_err(|_| UnresolvedReason::NestedExpression)?;
            statements.push(statement);
        }

        Ok((kind, statements, nested))
    }

    /// Walk an `rdf:first`/`rdf:rest` chain with an explicit bound
    fn walk_list(
        &self,
        head: &'a Node,
        visited: &mut BTreeSet<&'a BlankNodeId>,
    ) -> Result<Vec<Member>, UnresolvedReason> {
        let mut members = Vec::new();
        let mut cells: BTreeSet<&BlankNodeId> = BTreeSet::new();
        let mut current = head;

        for _ in 0..=MAX_LIST_LENGTH {
            let id = match current {
                Node::Iri(iri) if iri == vocab::RDF_NIL => {
                    if members.is_empty() {
                        return Err(UnresolvedReason::MalformedList);
                    }
                    return Ok(members);
                }
                Node::Blank(id) => id,
                _ => return Err(UnresolvedReason::MalformedList),
            };

            if !cells.insert(id) {
                return Err(UnresolvedReason::MalformedList);
            }

            let cell = self.sets.get(id).ok_or(UnresolvedReason::MalformedList)?;
            let (first, rest) = list_cell(cell).ok_or(UnresolvedReason::MalformedList)?;
            visited.insert(id);

            let member = match first {
                Node::Blank(inner) => {
                    let inner_ctx = self.sets.get(inner).ok_or(UnresolvedReason::MalformedList)?;
                    match classify(inner_ctx)? {
                        Pattern::Restriction { property, value } => {
                            visited.insert(inner);
                            Member::Restriction {
                                property: property.to_string(),
                                value: value.clone(),
                            }
                        }
                        _ => return Err(UnresolvedReason::NestedExpression),
                    }
                }
                other => Member::Value(other.clone()),
            };

            members.push(member);
            current = rest;
        }

        Err(UnresolvedReason::MalformedList)
    }
}

/// Convenience wrapper over [`BlankNodeResolver`]
pub fn resolve_blank_nodes(sets: &BlankNodeTripleSets, terms: &TermResolver) -> Resolution {
    BlankNodeResolver::new(sets, terms).resolve()
}

fn emit_members(referrers: &[(&str, &str)], members: &[Member], out: &mut Vec<Triple>) {
    for (subject, predicate) in referrers {
        for member in members {
            match member {
                Member::Value(value) => out.push(Triple::new(Node::iri(*subject), *predicate, value.clone())),
                Member::Restriction { property, value } => {
                    out.push(Triple::new(Node::iri(*subject), property.as_str(), value.clone()))
                }
            }
        }
    }
}

/// Exactly one `rdf:first` and one `rdf:rest`, and no other structural keys
fn list_cell(ctx: &BlankNodeContext) -> Option<(&Node, &Node)> {
    let markers = Markers::of(ctx);
    if markers.restriction() || markers.class_expression() {
        return None;
    }

    match (markers.firsts.as_slice(), markers.rests.as_slice()) {
        ([first], [rest]) => Some((*first, *rest)),
        _ => None,
    }
}

/// Structural predicates of one blank node
#[derive(Default)]
struct Markers<'a> {
    types: Vec<&'a Node>,
    on_property: Vec<&'a Node>,
    quantifiers: Vec<&'a Node>,
    set_operations: Vec<&'a Node>,
    firsts: Vec<&'a Node>,
    rests: Vec<&'a Node>,
}

impl<'a> Markers<'a> {
    fn of(ctx: &'a BlankNodeContext) -> Self {
        let mut markers = Markers::default();
        for triple in &ctx.as_subject {
            let object = &triple.object;
            match triple.predicate.as_str() {
                vocab::RDF_TYPE => markers.types.push(object),
                vocab::OWL_ON_PROPERTY => markers.on_property.push(object),
                vocab::OWL_SOME_VALUES_FROM | vocab::OWL_ALL_VALUES_FROM | vocab::OWL_HAS_VALUE => {
                    markers.quantifiers.push(object)
                }
                vocab::OWL_INTERSECTION_OF | vocab::OWL_UNION_OF => markers.set_operations.push(object),
                vocab::RDF_FIRST => markers.firsts.push(object),
                vocab::RDF_REST => markers.rests.push(object),
                _ => {}
            }
        }
        markers
    }

    fn typed(&self, class: &str) -> bool {
        self.types.iter().any(|t| t.as_iri() == Some(class))
    }

    fn restriction(&self) -> bool {
        self.typed(vocab::OWL_RESTRICTION) || !self.on_property.is_empty() || !self.quantifiers.is_empty()
    }

    fn class_expression(&self) -> bool {
        self.typed(vocab::OWL_CLASS) || !self.set_operations.is_empty()
    }

    fn list(&self) -> bool {
        !self.firsts.is_empty() || !self.rests.is_empty()
    }
}

/// Classify a blank node by its own triples
///
/// A node carrying markers of more than one pattern is never guessed at.
fn classify(ctx: &BlankNodeContext) -> Result<Pattern<'_>, UnresolvedReason> {
    let markers = Markers::of(ctx);
    let groups = [markers.restriction(), markers.class_expression(), markers.list()]
        .iter()
        .filter(|m| **m)
        .count();

    match groups {
        0 => return Err(UnresolvedReason::UnrecognizedPattern),
        1 => {}
        _ => return Err(UnresolvedReason::ConflictingPattern),
    }

    if markers.restriction() {
        if !markers.typed(vocab::OWL_RESTRICTION) {
            return Err(UnresolvedReason::UnrecognizedPattern);
        }
        let (property, value) = match (markers.on_property.as_slice(), markers.quantifiers.as_slice()) {
            ([Node::Iri(property)], [value]) => (property.as_str(), *value),
            _ => return Err(UnresolvedReason::UnrecognizedPattern),
        };
        if value.is_blank() {
            return Err(UnresolvedReason::NestedExpression);
        }
        return Ok(Pattern::Restriction { property, value });
    }

    if markers.class_expression() {
        if !markers.typed(vocab::OWL_CLASS) {
            return Err(UnresolvedReason::UnrecognizedPattern);
        }
        return match markers.set_operations.as_slice() {
            [list] => Ok(Pattern::ClassExpression { list: *list }),
            _ => Err(UnresolvedReason::UnrecognizedPattern),
        };
    }

    match (markers.firsts.len(), markers.rests.len()) {
        (1, 1) => Ok(Pattern::List),
        _ => Err(UnresolvedReason::MalformedList),
    }
}
