// Schema Triple Builder Contract Tests
//
// These tests verify how curated schema rows become statements. Label
// statements come before the relationship they describe, and rows that cannot
// be fully mapped produce nothing.
//
// **Problem**: half-mapped rows produce labeled vertices with no edges, or
// edges whose endpoints were never labeled
// **Solution**: Contract tests over statement order and row skipping

use cellkn_core::schema::{RelationRow, RelationTable, SchemaRow, SchemaTripleBuilder};
use cellkn_core::term::{Source, TermResolver};
use cellkn_core::triples::Object;

fn relations() -> RelationTable {
    RelationTable::from_rows(&[
        RelationRow::new("cell_class", "cell", "CL:0000000"),
        RelationRow::new("biological_process_class", "biological process", "GO:0008150"),
        RelationRow::new("participates_in", "participates in", "RO:0000056"),
        RelationRow::new("is_a", "is a", "rdfs:subClassOf"),
    ])
}

/// WHY: A row yields (subject label, object label, row statement) in that order
/// REASON: The loader creates labeled vertices before the edge that joins them
/// BREAKS: Vertex labels for schema-only classes
#[test]
fn label_statements_precede_row_statement() {
    let table = relations();
    let terms = TermResolver::default();
    let rows = vec![SchemaRow::new("cell_class", "participates_in", "biological_process_class")];

    let built = SchemaTripleBuilder::new(&table, &terms).build(&rows);
    let rendered: Vec<String> = built.statements.iter().map(|s| s.to_string()).collect();

    assert_eq!(
        rendered,
        vec![
            "(CL:0000000, rdfs:label, \"cell\")",
            "(GO:0008150, rdfs:label, \"biological process\")",
            "(CL:0000000, RO:0000056, GO:0008150)",
        ]
    );

    let label_pos = rendered.iter().position(|s| s == "(CL:0000000, rdfs:label, \"cell\")");
    let row_pos = rendered.iter().position(|s| s == "(CL:0000000, RO:0000056, GO:0008150)");
    assert!(label_pos < row_pos, "Subject label must come before the row statement");
}

/// WHY: Schema statements carry the schema source tag and schema label
/// REASON: Schema-introduced classes are distinguishable from ontology classes
/// BREAKS: Provenance of schema-only vertices
#[test]
fn schema_terms_are_tagged_with_schema_source() {
    let table = relations();
    let terms = TermResolver::default();
    let rows = vec![SchemaRow::new("cell", "is_a", "cell")];

    let built = SchemaTripleBuilder::new(&table, &terms).build(&rows);
    let row = built.statements.last().unwrap();

    assert_eq!(row.subject.source, Source::Schema);
    assert_eq!(row.subject.label.as_deref(), Some("cell"));
    assert_eq!(row.predicate.id, "rdfs:subClassOf");
    assert_eq!(row.object, Object::Term(row.subject.clone()));
}

/// WHY: A row with an unmapped name emits no statements at all
/// REASON: Partial rows would create label-only vertices
/// BREAKS: Clean skip reporting for curators
#[test]
fn unmapped_row_emits_nothing() {
    let table = relations();
    let terms = TermResolver::default();
    let rows = vec![SchemaRow::new("cell_class", "has_marker", "gene_class")];

    let built = SchemaTripleBuilder::new(&table, &terms).build(&rows);

    assert!(built.statements.is_empty());
    assert!(built.referenced_namespaces.is_empty());
    assert_eq!(built.skipped.len(), 1);
    assert_eq!(built.skipped[0].missing, vec!["has_marker".to_string(), "gene_class".to_string()]);
}

/// WHY: Referenced namespaces cover the subject and object of every built row, never the predicate
/// REASON: The pipeline extends the vertex allow-list with them; predicates are edges, not vertices
/// BREAKS: Schema vertices filtered out by the loader, or rdf/rdfs turned into vertex collections
#[test]
fn referenced_namespaces_cover_built_rows() {
    let table = relations();
    let terms = TermResolver::default();
    let rows = vec![
        SchemaRow::new("cell_class", "participates_in", "biological_process_class"),
        SchemaRow::new("cell_class", "is_a", "cell_class"),
    ];

    let built = SchemaTripleBuilder::new(&table, &terms).build(&rows);

    let namespaces: Vec<&str> = built.referenced_namespaces.iter().map(|s| s.as_str()).collect();
    assert_eq!(namespaces, vec!["CL", "GO"]);
}
