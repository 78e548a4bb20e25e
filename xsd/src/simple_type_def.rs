use roxmltree::Node;

use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::xstypes::QName;
use crate::Ref;

/// Schema Component: Simple Type Definition (§3.16).
///
/// Simple types cannot carry element content, so for insert-order purposes a bare name is all
/// that is kept; facets and value spaces play no part in structural editing.
#[derive(Clone, Debug)]
pub struct SimpleTypeDefinition {
    pub name: Option<QName>,
}

impl SimpleTypeDefinition {
    pub(crate) fn map_from_xml(
        context: &mut MappingContext,
        _simple_type: Node,
        name: Option<QName>,
    ) -> Result<Ref<Self>, SchemaError> {
        Ok(context.components.create(Self { name }))
    }
}
