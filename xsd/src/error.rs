use thiserror::Error;

use crate::xstypes::QName;

/// Errors raised while constructing a [`Schema`](crate::Schema) from an XSD document.
///
/// All of these are fatal: no partial schema is ever returned.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("malformed schema document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected document root element <schema>, found <{0}>")]
    NotASchema(String),

    #[error("element <{element}> is missing the required attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid value {value:?}, expected {expected}")]
    InvalidValue {
        value: String,
        expected: &'static str,
    },

    #[error("minOccurs {min} is greater than maxOccurs {max}")]
    InvalidOccurs { min: u64, max: u64 },

    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),

    #[error("reference to undefined type {0}")]
    UnresolvedTypeReference(QName),

    #[error("reference to undefined top-level element {0}")]
    UnresolvedElementReference(QName),

    #[error("reference to undefined model group {0}")]
    UnresolvedGroupReference(QName),

    #[error("definition of {0} is cyclic without an intervening element declaration")]
    CyclicTypeDefinition(QName),

    #[error("could not resolve schema location {0:?}")]
    UnresolvedImport(String),
}
