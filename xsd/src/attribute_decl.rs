use roxmltree::Node;

use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::values::actual_value;
use crate::xstypes::QName;
use crate::Ref;

/// Schema Component: Attribute Declaration (§3.2).
///
/// Only what the form editor needs to render attribute inputs survives the mapping: the name,
/// the referenced simple type and whether `use="required"`.
#[derive(Clone, Debug)]
pub struct AttributeDeclaration {
    pub name: QName,
    pub type_name: Option<QName>,
    pub required: bool,
}

impl AttributeDeclaration {
    pub(crate) fn map_from_xml(
        context: &mut MappingContext,
        attribute: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let name = if let Some(name) = attribute.attribute("name") {
            QName::with_optional_namespace(None::<&str>, name)
        } else if let Some(reference) = attribute.attribute("ref") {
            actual_value::<QName>(reference, attribute)?
        } else {
            return Err(SchemaError::MissingAttribute {
                element: "attribute",
                attribute: "name",
            });
        };

        let type_name = attribute
            .attribute("type")
            .map(|value| actual_value(value, attribute))
            .transpose()?;
        let required = attribute.attribute("use") == Some("required");

        Ok(context.components.create(Self {
            name,
            type_name,
            required,
        }))
    }
}
