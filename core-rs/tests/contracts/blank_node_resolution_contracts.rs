// Blank-Node Resolution Contract Tests
//
// These tests pin down how OWL blank-node patterns are rewritten into canonical
// statements. The loader trusts the resolver output completely: a blank node
// that leaks through becomes a vertex nobody can address.
//
// **Problem**: "small" changes to pattern matching silently drop or invent edges
// **Solution**: Contract tests over the exact statements emitted

use cellkn_core::term::{vocab, TermResolver};
use cellkn_core::triples::{
    resolve_blank_nodes, BlankNodeId, BlankNodeTripleSets, Node, Resolution, Triple, TripleCollector,
    UnresolvedReason, MAX_LIST_LENGTH,
};

const OBO: &str = "http://purl.obolibrary.org/obo/";

fn obo(local: &str) -> Node {
    Node::iri(format!("{}{}", OBO, local))
}

fn resolve(triples: Vec<Triple>) -> Resolution {
    let collection = TripleCollector::collect(triples, "contract");
    resolve_blank_nodes(&collection.blank_sets, &TermResolver::default())
}

fn rendered(resolution: &Resolution) -> Vec<String> {
    resolution.statements.iter().map(|s| s.to_string()).collect()
}

fn mentions_blank(resolution: &Resolution) -> bool {
    rendered(resolution).iter().any(|s| s.contains("_:"))
}

/// Ontology fragment exercising every pattern at once
fn mixed_fragment() -> Vec<Triple> {
    vec![
        // CL:0000001 subClassOf (RO:0002202 some CL:0000000)
        Triple::new(Node::blank("r1"), vocab::RDF_TYPE, Node::iri(vocab::OWL_RESTRICTION)),
        Triple::new(Node::blank("r1"), vocab::OWL_ON_PROPERTY, obo("RO_0002202")),
        Triple::new(Node::blank("r1"), vocab::OWL_SOME_VALUES_FROM, obo("CL_0000000")),
        Triple::new(obo("CL_0000001"), vocab::RDFS_SUBCLASS_OF, Node::blank("r1")),
        // CL:0000002 equivalentClass (CL:0000003 and CL:0000004)
        Triple::new(Node::blank("c1"), vocab::RDF_TYPE, Node::iri(vocab::OWL_CLASS)),
        Triple::new(Node::blank("c1"), vocab::OWL_INTERSECTION_OF, Node::blank("l0")),
        Triple::new(Node::blank("l0"), vocab::RDF_FIRST, obo("CL_0000003")),
        Triple::new(Node::blank("l0"), vocab::RDF_REST, Node::blank("l1")),
        Triple::new(Node::blank("l1"), vocab::RDF_FIRST, obo("CL_0000004")),
        Triple::new(Node::blank("l1"), vocab::RDF_REST, Node::iri(vocab::RDF_NIL)),
        Triple::new(obo("CL_0000002"), vocab::OWL_EQUIVALENT_CLASS, Node::blank("c1")),
        // Annotation-only blank node
        Triple::new(Node::blank("x"), vocab::RDFS_COMMENT, Node::literal("x")),
    ]
}

/// WHY: Resolution output must not depend on input order
/// REASON: Loads are compared run-to-run; reordering must not churn the graph
/// BREAKS: Reproducible builds of the knowledge graph, diff-based review of loads
#[test]
fn resolution_is_deterministic_across_input_orders() {
    let forward = mixed_fragment();
    let mut reversed = mixed_fragment();
    reversed.reverse();

    let a = resolve(forward);
    let b = resolve(reversed);
    let c = resolve(mixed_fragment());

    let a_json = serde_json::to_string(&a.statements).unwrap();
    let b_json = serde_json::to_string(&b.statements).unwrap();
    let c_json = serde_json::to_string(&c.statements).unwrap();
    assert_eq!(a_json, b_json, "Reversed input must give byte-identical statements");
    assert_eq!(a_json, c_json, "Repeated resolution must give byte-identical statements");
    assert_eq!(a.unresolved, b.unresolved);
}

/// WHY: Blank-node sets built from any map iteration order resolve identically
/// REASON: Callers may assemble BlankNodeTripleSets themselves
/// BREAKS: Determinism when the collector is bypassed
#[test]
fn resolution_is_independent_of_blank_set_construction_order() {
    let collection = TripleCollector::collect(mixed_fragment(), "contract");
    let entries: Vec<_> = collection
        .blank_sets
        .iter()
        .map(|(id, ctx)| (id.clone(), ctx.clone()))
        .collect();

    let forward: BlankNodeTripleSets = entries.clone().into_iter().collect();
    let backward: BlankNodeTripleSets = entries.into_iter().rev().collect();

    let terms = TermResolver::default();
    let a = resolve_blank_nodes(&forward, &terms);
    let b = resolve_blank_nodes(&backward, &terms);
    assert_eq!(rendered(&a), rendered(&b));
}

/// WHY: A someValuesFrom restriction is exactly one edge (S, P, V)
/// REASON: This is how OBO encodes relationships like part_of and develops_from
/// BREAKS: Every relationship edge in the graph
#[test]
fn restriction_round_trip_emits_exactly_one_statement() {
    let triples = vec![
        Triple::new(Node::blank("b1"), vocab::RDF_TYPE, Node::iri(vocab::OWL_RESTRICTION)),
        Triple::new(Node::blank("b1"), vocab::OWL_ON_PROPERTY, obo("BFO_0000050")),
        Triple::new(Node::blank("b1"), vocab::OWL_SOME_VALUES_FROM, obo("UBERON_0002048")),
        Triple::new(obo("CL_0000000"), vocab::RDFS_SUBCLASS_OF, Node::blank("b1")),
    ];

    let resolution = resolve(triples);

    assert_eq!(rendered(&resolution), vec!["(CL:0000000, BFO:0000050, UBERON:0002048)"]);
    assert!(!mentions_blank(&resolution), "No statement may reference _:b1");
    assert!(resolution.unresolved.is_empty());
}

/// WHY: A list of three members referenced by S gives three statements with the referrer's predicate
/// REASON: intersectionOf/unionOf members are each a superclass of S
/// BREAKS: Class hierarchy edges for defined classes
#[test]
fn list_chain_of_three_emits_three_statements() {
    let triples = vec![
        Triple::new(Node::blank("i0"), vocab::RDF_FIRST, obo("CL_0000001")),
        Triple::new(Node::blank("i0"), vocab::RDF_REST, Node::blank("i1")),
        Triple::new(Node::blank("i1"), vocab::RDF_FIRST, obo("CL_0000002")),
        Triple::new(Node::blank("i1"), vocab::RDF_REST, Node::blank("i2")),
        Triple::new(Node::blank("i2"), vocab::RDF_FIRST, obo("CL_0000003")),
        Triple::new(Node::blank("i2"), vocab::RDF_REST, Node::iri(vocab::RDF_NIL)),
        Triple::new(obo("CL_0000000"), vocab::RDFS_SUBCLASS_OF, Node::blank("i0")),
    ];

    let resolution = resolve(triples);

    assert_eq!(
        rendered(&resolution),
        vec![
            "(CL:0000000, rdfs:subClassOf, CL:0000001)",
            "(CL:0000000, rdfs:subClassOf, CL:0000002)",
            "(CL:0000000, rdfs:subClassOf, CL:0000003)",
        ]
    );
    assert!(resolution.unresolved.is_empty(), "List cells are consumed by the head");
}

/// WHY: Intersection members that are restrictions are inlined with their own property
/// REASON: `A and (part_of some B)` means subClassOf A plus part_of B
/// BREAKS: Relationship edges hidden inside equivalentClass axioms
#[test]
fn intersection_with_restriction_member_inlines_it() {
    let triples = vec![
        Triple::new(Node::blank("c"), vocab::RDF_TYPE, Node::iri(vocab::OWL_CLASS)),
        Triple::new(Node::blank("c"), vocab::OWL_INTERSECTION_OF, Node::blank("l0")),
        Triple::new(Node::blank("l0"), vocab::RDF_FIRST, obo("CL_0000000")),
        Triple::new(Node::blank("l0"), vocab::RDF_REST, Node::blank("l1")),
        Triple::new(Node::blank("l1"), vocab::RDF_FIRST, Node::blank("r")),
        Triple::new(Node::blank("l1"), vocab::RDF_REST, Node::iri(vocab::RDF_NIL)),
        Triple::new(Node::blank("r"), vocab::RDF_TYPE, Node::iri(vocab::OWL_RESTRICTION)),
        Triple::new(Node::blank("r"), vocab::OWL_ON_PROPERTY, obo("BFO_0000050")),
        Triple::new(Node::blank("r"), vocab::OWL_SOME_VALUES_FROM, obo("UBERON_0002048")),
        Triple::new(obo("CL_0000010"), vocab::OWL_EQUIVALENT_CLASS, Node::blank("c")),
    ];

    let resolution = resolve(triples);

    assert_eq!(
        rendered(&resolution),
        vec![
            "(CL:0000010, BFO:0000050, UBERON:0002048)",
            "(CL:0000010, owl:equivalentClass, CL:0000000)",
        ]
    );
    assert!(resolution.unresolved.is_empty());
}

/// WHY: Unknown patterns are reported, never guessed
/// REASON: Silent drops hide coverage gaps in the converter
/// BREAKS: The unresolved report operators use to extend pattern support
#[test]
fn unrecognized_blank_node_is_reported_not_emitted() {
    let triples = vec![
        Triple::new(Node::blank("x"), vocab::RDFS_COMMENT, Node::literal("x")),
        Triple::new(obo("CL_0000000"), "http://www.w3.org/2000/01/rdf-schema#seeAlso", Node::blank("x")),
    ];

    let resolution = resolve(triples);

    assert!(resolution.statements.is_empty());
    assert_eq!(
        resolution.unresolved.get(&BlankNodeId::new("x")),
        Some(&UnresolvedReason::UnrecognizedPattern)
    );
}

/// WHY: A node with markers of two patterns is unresolved, not resolved by precedence
/// REASON: Picking one pattern would assert edges the ontology never stated
/// BREAKS: Trust in every emitted statement
#[test]
fn conflicting_patterns_are_unresolved() {
    let mut triples = vec![
        Triple::new(Node::blank("b"), vocab::RDF_TYPE, Node::iri(vocab::OWL_RESTRICTION)),
        Triple::new(Node::blank("b"), vocab::OWL_ON_PROPERTY, obo("BFO_0000050")),
        Triple::new(Node::blank("b"), vocab::OWL_SOME_VALUES_FROM, obo("UBERON_0002048")),
        Triple::new(Node::blank("b"), vocab::OWL_INTERSECTION_OF, Node::blank("l")),
        Triple::new(Node::blank("l"), vocab::RDF_FIRST, obo("CL_0000001")),
        Triple::new(Node::blank("l"), vocab::RDF_REST, Node::iri(vocab::RDF_NIL)),
    ];
    triples.push(Triple::new(obo("CL_0000000"), vocab::RDFS_SUBCLASS_OF, Node::blank("b")));

    let resolution = resolve(triples);

    assert!(resolution.statements.is_empty());
    assert_eq!(
        resolution.unresolved.get(&BlankNodeId::new("b")),
        Some(&UnresolvedReason::ConflictingPattern)
    );
    assert!(resolution.is_unresolved(&BlankNodeId::new("l")), "Children of an unresolved node are reported too");
}

/// WHY: Cyclic lists terminate with a malformed-list report
/// REASON: Walks are bounded; a cycle must never hang or overflow the stack
/// BREAKS: Pipeline liveness on corrupt ontology files
#[test]
fn cyclic_list_is_malformed() {
    let triples = vec![
        Triple::new(Node::blank("l0"), vocab::RDF_FIRST, obo("CL_0000001")),
        Triple::new(Node::blank("l0"), vocab::RDF_REST, Node::blank("l1")),
        Triple::new(Node::blank("l1"), vocab::RDF_FIRST, obo("CL_0000002")),
        Triple::new(Node::blank("l1"), vocab::RDF_REST, Node::blank("l0")),
        Triple::new(obo("CL_0000000"), vocab::RDFS_SUBCLASS_OF, Node::blank("l0")),
    ];

    let resolution = resolve(triples);

    assert!(resolution.statements.is_empty());
    assert_eq!(
        resolution.unresolved.get(&BlankNodeId::new("l0")),
        Some(&UnresolvedReason::MalformedList)
    );
}

/// Chain of `cells` list cells with distinct members, referenced by CL:0000000
fn list_chain(cells: usize) -> Vec<Triple> {
    let mut triples = Vec::with_capacity(cells * 2 + 1);
    for i in 0..cells {
        let cell = Node::blank(format!("l{}", i));
        let rest = if i + 1 == cells {
            Node::iri(vocab::RDF_NIL)
        } else {
            Node::blank(format!("l{}", i + 1))
        };
        triples.push(Triple::new(cell.clone(), vocab::RDF_FIRST, obo(&format!("CL_{:07}", i + 1))));
        triples.push(Triple::new(cell, vocab::RDF_REST, rest));
    }
    triples.push(Triple::new(obo("CL_0000000"), vocab::RDFS_SUBCLASS_OF, Node::blank("l0")));
    triples
}

/// WHY: A list of exactly MAX_LIST_LENGTH cells resolves; one more cell is malformed
/// REASON: The list walk is bounded so oversized or corrupt chains cannot run away
/// BREAKS: Long unionOf axioms silently truncated, or unbounded walks on corrupt input
#[test]
fn list_walk_is_bounded_at_max_list_length() {
    let at_bound = resolve(list_chain(MAX_LIST_LENGTH));
    assert_eq!(at_bound.statements.len(), MAX_LIST_LENGTH);
    assert!(at_bound.unresolved.is_empty());
    assert!(!mentions_blank(&at_bound));

    let over_bound = resolve(list_chain(MAX_LIST_LENGTH + 1));
    assert!(over_bound.statements.is_empty());
    assert_eq!(
        over_bound.unresolved.get(&BlankNodeId::new("l0")),
        Some(&UnresolvedReason::MalformedList)
    );
}
