use std::collections::HashSet;

use lazy_static::lazy_static;

use crate::xstypes::QName;

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

lazy_static! {
    /// Local names of the builtin simple types (§3.16.7) plus xs:anyType/xs:anySimpleType.
    ///
    /// The insert-order model only needs to know that a reference to one of these is a leaf, so
    /// no facet or value-space information is kept.
    static ref BUILTIN_TYPE_NAMES: HashSet<&'static str> = [
        "anyType",
        "anySimpleType",
        "anyAtomicType",
        "string",
        "boolean",
        "decimal",
        "float",
        "double",
        "duration",
        "dateTime",
        "time",
        "date",
        "gYearMonth",
        "gYear",
        "gMonthDay",
        "gDay",
        "gMonth",
        "hexBinary",
        "base64Binary",
        "anyURI",
        "QName",
        "NOTATION",
        "normalizedString",
        "token",
        "language",
        "NMTOKEN",
        "NMTOKENS",
        "Name",
        "NCName",
        "ID",
        "IDREF",
        "IDREFS",
        "ENTITY",
        "ENTITIES",
        "integer",
        "nonPositiveInteger",
        "negativeInteger",
        "long",
        "int",
        "short",
        "byte",
        "nonNegativeInteger",
        "unsignedLong",
        "unsignedInt",
        "unsignedShort",
        "unsignedByte",
        "positiveInteger",
        "yearMonthDuration",
        "dayTimeDuration",
        "dateTimeStamp",
    ]
    .into_iter()
    .collect();
}

pub fn is_builtin(name: &QName) -> bool {
    name.namespace_name.as_deref() == Some(XS_NAMESPACE)
        && BUILTIN_TYPE_NAMES.contains(name.local_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_builtin_types_in_the_xsd_namespace() {
        assert!(is_builtin(&QName::with_namespace(XS_NAMESPACE, "string")));
        assert!(is_builtin(&QName::with_namespace(XS_NAMESPACE, "anyType")));
        assert!(!is_builtin(&QName::with_namespace(XS_NAMESPACE, "widget")));
        assert!(!is_builtin(&QName::with_optional_namespace(
            None::<&str>,
            "string"
        )));
    }
}
