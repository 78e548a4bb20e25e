//! Schema object model and insert-order evaluator for XSD-backed metadata entry forms.
//!
//! [`read_schema`] parses XSD text into an immutable [`Schema`] plus its component table. From
//! there, [`InsertOrderTree`] derives a per-session view of one element's content model, and
//! [`insertion_points`]/[`can_insert`] answer where a new child element may legally go given
//! the siblings a live document already has.

pub mod attribute_decl;
pub mod builtins;
pub mod complex_type_def;
pub mod components;
pub mod element_decl;
pub mod error;
pub mod import;
pub mod insert_order;
pub mod insertion;
pub mod model_group;
pub mod model_group_def;
pub mod particle;
pub mod schema;
pub mod shared;
pub mod simple_type_def;
pub mod values;
pub mod xstypes;

mod mapping_context;

pub use attribute_decl::AttributeDeclaration;
pub use complex_type_def::ComplexTypeDefinition;
pub use components::{Component, Ref, SchemaComponentTable};
pub use element_decl::{ElementDeclaration, Scope, TypeReference};
pub use error::SchemaError;
pub use import::ImportResolver;
pub use insert_order::{InsertOrderId, InsertOrderKind, InsertOrderNode, InsertOrderTree};
pub use insertion::{can_insert, insertion_points, InsertDenied};
pub use model_group::{Compositor, ModelGroup};
pub use model_group_def::ModelGroupDefinition;
pub use particle::{MaxOccurs, Particle};
pub use schema::Schema;
pub use shared::{Term, TypeDefinition};
pub use simple_type_def::SimpleTypeDefinition;

use mapping_context::MappingContext;

/// Parses a schema document, resolving `include`/`import` through the given resolvers.
///
/// Construction either yields a complete schema or fails with the first [`SchemaError`]; no
/// partial schema is ever returned. The result is immutable and may be shared freely across
/// concurrent evaluation sessions.
pub fn read_schema(
    document: &roxmltree::Document,
    import_resolvers: &[Box<dyn ImportResolver>],
) -> Result<(Schema, SchemaComponentTable), SchemaError> {
    let root = document.root_element();
    let included_texts = import::resolve_transitive(root, import_resolvers)?;
    let included_documents = included_texts
        .iter()
        .map(|text| roxmltree::Document::parse(text))
        .collect::<Result<Vec<_>, _>>()?;

    let mut roots = vec![root];
    roots.extend(included_documents.iter().map(|included| included.root_element()));

    let mut context = MappingContext::new();
    let schema = Schema::map_from_xml(&mut context, &roots)?;
    Ok((schema, context.into_components()))
}

/// Convenience wrapper over [`read_schema`] for callers holding the XSD as text.
pub fn read_schema_text(
    text: &str,
    import_resolvers: &[Box<dyn ImportResolver>],
) -> Result<(Schema, SchemaComponentTable), SchemaError> {
    let document = roxmltree::Document::parse(text)?;
    read_schema(&document, import_resolvers)
}
