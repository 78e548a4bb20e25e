use roxmltree::Node;

use crate::attribute_decl::AttributeDeclaration;
use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::particle::Particle;
use crate::xstypes::{QName, Sequence};
use crate::Ref;

/// Schema Component: Complex Type Definition (§3.4)
#[derive(Clone, Debug)]
pub struct ComplexTypeDefinition {
    /// None for anonymous definitions inlined in an element declaration.
    pub name: Option<QName>,
    pub content_model: Option<Ref<Particle>>,
    pub attribute_declarations: Sequence<Ref<AttributeDeclaration>>,
}

impl ComplexTypeDefinition {
    pub(crate) fn map_from_xml(
        context: &mut MappingContext,
        complex_type: Node,
        name: Option<QName>,
    ) -> Result<Ref<Self>, SchemaError> {
        let mut content_model = None;
        let mut attribute_declarations = Sequence::new();
        Self::map_content(
            context,
            complex_type,
            &mut content_model,
            &mut attribute_declarations,
        )?;

        Ok(context.components.create(Self {
            name,
            content_model,
            attribute_declarations,
        }))
    }

    fn map_content(
        context: &mut MappingContext,
        parent: Node,
        content_model: &mut Option<Ref<Particle>>,
        attribute_declarations: &mut Sequence<Ref<AttributeDeclaration>>,
    ) -> Result<(), SchemaError> {
        for child in parent.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "all" | "choice" | "sequence" => {
                    *content_model = Some(Particle::map_from_xml_model_group(context, child)?);
                }
                "group" => {
                    *content_model = Some(Particle::map_from_xml_group_reference(context, child)?);
                }
                "attribute" => {
                    attribute_declarations.push(AttributeDeclaration::map_from_xml(context, child)?);
                }
                // Derived content: the derivation's own particle and attributes are mapped; the
                // base type's contribution is not merged in.
                "complexContent" => {
                    for derivation in child
                        .children()
                        .filter(|c| matches!(c.tag_name().name(), "extension" | "restriction"))
                    {
                        Self::map_content(
                            context,
                            derivation,
                            content_model,
                            attribute_declarations,
                        )?;
                    }
                }
                // simpleContent has character data only, no element content to order.
                _ => {}
            }
        }
        Ok(())
    }
}
