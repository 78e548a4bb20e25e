use roxmltree::Node;

use crate::error::SchemaError;
use crate::xstypes::QName;

/// Conversion from an attribute's character data to its typed value, in the sense of the XSD
/// ·actual value· of an attribute information item.
///
/// Conversions are fallible; a value outside the expected lexical space is reported as a
/// [`SchemaError`], never clamped.
pub trait ActualValue<'a>: Sized {
    fn convert(src: &'a str, parent: Node) -> Result<Self, SchemaError>;
}

impl<'a> ActualValue<'a> for &'a str {
    fn convert(src: &'a str, _parent: Node) -> Result<Self, SchemaError> {
        Ok(src)
    }
}

impl ActualValue<'_> for String {
    fn convert(src: &'_ str, _parent: Node) -> Result<Self, SchemaError> {
        Ok(src.to_string())
    }
}

impl ActualValue<'_> for QName {
    fn convert(src: &'_ str, parent: Node) -> Result<Self, SchemaError> {
        QName::parse(src, parent)
    }
}

impl ActualValue<'_> for u64 {
    fn convert(src: &str, _parent: Node) -> Result<Self, SchemaError> {
        src.parse().map_err(|_| SchemaError::InvalidValue {
            value: src.to_string(),
            expected: "a non-negative integer",
        })
    }
}

pub fn actual_value<'a, T: ActualValue<'a>>(x: &'a str, parent: Node) -> Result<T, SchemaError> {
    T::convert(x, parent)
}
