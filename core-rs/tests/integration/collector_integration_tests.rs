//! Integration tests for ontology file collection and resolution
//!
//! Tests real serializations end to end:
//! - RDF/XML with nested restrictions and collections
//! - Turtle and N-Triples
//! - Format and parse failures

use cellkn_core::pipeline::convert_collection;
use cellkn_core::term::{default_prefixes, LabelIndex};
use cellkn_core::triples::{OntologyFormat, PatternKind, TripleCollector};
use cellkn_core::KnError;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CL_OWL: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:obo="http://purl.obolibrary.org/obo/"
     xmlns:owl="http://www.w3.org/2002/07/owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000000">
        <rdfs:label>cell</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000540">
        <rdfs:subClassOf rdf:resource="http://purl.obolibrary.org/obo/CL_0000000"/>
        <rdfs:subClassOf>
            <owl:Restriction>
                <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/BFO_0000050"/>
                <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/UBERON_0001016"/>
            </owl:Restriction>
        </rdfs:subClassOf>
        <rdfs:label>neuron</rdfs:label>
    </owl:Class>
    <owl:Class rdf:about="http://purl.obolibrary.org/obo/CL_0000101">
        <owl:equivalentClass>
            <owl:Class>
                <owl:intersectionOf rdf:parseType="Collection">
                    <rdf:Description rdf:about="http://purl.obolibrary.org/obo/CL_0000540"/>
                    <owl:Restriction>
                        <owl:onProperty rdf:resource="http://purl.obolibrary.org/obo/RO_0002215"/>
                        <owl:someValuesFrom rdf:resource="http://purl.obolibrary.org/obo/GO_0019230"/>
                    </owl:Restriction>
                </owl:intersectionOf>
            </owl:Class>
        </owl:equivalentClass>
        <rdfs:label>sensory neuron</rdfs:label>
    </owl:Class>
</rdf:RDF>
"#;

const UNION_TTL: &str = r#"
@prefix obo: <http://purl.obolibrary.org/obo/> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

obo:UBERON_0000061 rdfs:label "anatomical structure" .
obo:UBERON_0000062 rdfs:label "organ" ;
    owl:equivalentClass [ a owl:Class ;
        owl:unionOf ( obo:UBERON_0002048 obo:UBERON_0002107 obo:UBERON_0000948 ) ] .
obo:UBERON_0000063 rdfs:comment [ rdfs:comment "annotation on an annotation" ] .
"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_rdf_xml_restrictions_and_collections_resolve() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir, "cl.owl", CL_OWL);

    let collection = TripleCollector::collect_file(&path).unwrap();
    assert_eq!(collection.blank_sets.len(), 5, "two restrictions, one class, two list cells");
    assert_eq!(collection.counts.by_shape.get("iri-iri-literal"), Some(&3));

    let (statements, resolution) = convert_collection(&collection, &default_prefixes(), &LabelIndex::new());
    let rendered: Vec<String> = statements.iter().map(|s| s.to_string()).collect();

    assert!(rendered.contains(&"(CL:0000540, BFO:0000050, UBERON:0001016)".to_string()));
    assert!(rendered.contains(&"(CL:0000101, owl:equivalentClass, CL:0000540)".to_string()));
    assert!(rendered.contains(&"(CL:0000101, RO:0002215, GO:0019230)".to_string()));
    assert!(rendered.contains(&"(CL:0000540, rdfs:subClassOf, CL:0000000)".to_string()));
    assert!(rendered.iter().all(|s| !s.contains("_:")));

    assert!(resolution.unresolved.is_empty(), "unresolved: {:?}", resolution.unresolved);
    assert_eq!(resolution.resolved.get(&PatternKind::Restriction), Some(&1));
    assert_eq!(resolution.resolved.get(&PatternKind::ClassExpression), Some(&1));

    let neuron = statements.iter().find(|s| s.subject.id == "CL:0000540").unwrap();
    assert_eq!(neuron.subject.label.as_deref(), Some("neuron"), "labels come from the same file");
}

#[test]
fn test_turtle_union_and_unresolved_annotation() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir, "uberon.ttl", UNION_TTL);

    let collection = TripleCollector::collect_file(&path).unwrap();
    let (statements, resolution) = convert_collection(&collection, &default_prefixes(), &LabelIndex::new());
    let rendered: Vec<String> = statements.iter().map(|s| s.to_string()).collect();

    for member in ["UBERON:0002048", "UBERON:0002107", "UBERON:0000948"] {
        let expected = format!("(UBERON:0000062, owl:equivalentClass, {})", member);
        assert!(rendered.contains(&expected), "missing {}", expected);
    }

    assert_eq!(resolution.unresolved.len(), 1);
    assert!(rendered.iter().all(|s| !s.contains("annotation on an annotation")));
}

#[test]
fn test_ntriples_file() {
    let temp_dir = TempDir::new().unwrap();
    let nt = "<http://purl.obolibrary.org/obo/GO_0008150> <http://www.w3.org/2000/01/rdf-schema#label> \"biological_process\" .\n\
              <http://purl.obolibrary.org/obo/GO_0008150> <http://www.w3.org/2000/01/rdf-schema#label> \"biological_process\" .\n";
    let path = write_fixture(&temp_dir, "go.nt", nt);

    let collection = TripleCollector::collect_file(&path).unwrap();
    assert_eq!(collection.counts.total, 1, "duplicate triples are collected once");
    assert!(collection.blank_sets.is_empty());
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir, "cl.obo", "format-version: 1.2\n");

    assert!(matches!(
        TripleCollector::collect_file(&path),
        Err(KnError::UnsupportedFormat(_))
    ));
    assert!(OntologyFormat::from_path(&path).is_err());
}

#[test]
fn test_malformed_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_fixture(&temp_dir, "broken.ttl", "@prefix obo: <http://purl.obolibrary.org/obo/> .\nobo:CL_0000000 rdfs:label");

    match TripleCollector::collect_file(&path) {
        Err(KnError::OntologyParse { path: reported, .. }) => assert!(reported.ends_with("broken.ttl")),
        other => panic!("Expected OntologyParse, got {:?}", other.map(|c| c.counts.total)),
    }
}
