/**
 * term module
 *
 * - model: Term value (canonical id, label, namespace, source)
 * - resolver: URI/CURIE → Term with prefix table, label index and cache
 * - vocab: RDF/RDFS/OWL IRIs
 */

pub mod model;
pub mod resolver;
pub mod vocab;

pub use model::{Source, Term, UNKNOWN_NAMESPACE};
pub use resolver::{canonical_id, default_prefixes, LabelIndex, PrefixMapping, TermResolver};
