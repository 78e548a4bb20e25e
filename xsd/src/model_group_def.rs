use roxmltree::Node;

use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::model_group::ModelGroup;
use crate::values::actual_value;
use crate::xstypes::QName;
use crate::Ref;

/// Named model group definitions, <group name="..."> (§3.7).
///
/// Definitions are kept as source nodes and expanded afresh at every reference site. The
/// expansion stack in the mapping context catches a definition that reaches itself again without
/// crossing an element declaration; element declarations terminate the recursion because their
/// content models are resolved lazily through the type table.
pub struct ModelGroupDefinition;

impl ModelGroupDefinition {
    pub(crate) fn expand_reference(
        context: &mut MappingContext,
        group: Node,
    ) -> Result<Ref<ModelGroup>, SchemaError> {
        let reference = group.attribute("ref").ok_or(SchemaError::MissingAttribute {
            element: "group",
            attribute: "ref",
        })?;
        let name: QName = actual_value(reference, group)?;

        let definition = context
            .group_definition(&name)
            .ok_or_else(|| SchemaError::UnresolvedGroupReference(name.clone()))?;
        let inner = definition
            .children()
            .find(|child| matches!(child.tag_name().name(), "all" | "choice" | "sequence"))
            .ok_or_else(|| SchemaError::InvalidValue {
                value: name.to_string(),
                expected: "a group definition containing all, choice or sequence",
            })?;

        context.push_group(name)?;
        let model_group = ModelGroup::map_from_xml(context, inner);
        context.pop_group();
        model_group
    }
}
