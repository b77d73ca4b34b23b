/**
 * schema module
 *
 * - reader: typed CSV rows for the schema and relations sheets
 * - builder: schema rows → statements, label statements, referenced namespaces
 */

pub mod builder;
pub mod reader;

pub use builder::{curie_to_uri, normalize_name, RelationEntry, RelationTable, SchemaTripleBuilder, SchemaTriples, SkippedRow};
pub use reader::{read_relation_rows, read_schema_rows, RelationRow, SchemaRow, CLASS_CLASS};
