use roxmltree::Node;

use crate::complex_type_def::ComplexTypeDefinition;
use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::simple_type_def::SimpleTypeDefinition;
use crate::values::actual_value;
use crate::xstypes::QName;
use crate::Ref;

/// Schema Component: Element Declaration, a kind of Term (§3.3)
#[derive(Clone, Debug)]
pub struct ElementDeclaration {
    pub name: QName,
    pub scope: Scope,
    pub type_definition: Option<TypeReference>,
    pub substitution_group_affiliation: Option<QName>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Local,
    /// A `ref="..."` particle; `name` is the referenced top-level declaration's name and the
    /// content model is that declaration's.
    TopLevelReference,
}

/// How an element points at its type: by name, resolved lazily through the schema's type table
/// (which is what lets elements recurse into their own type), or by an inline anonymous
/// definition mapped in place.
#[derive(Clone, Debug)]
pub enum TypeReference {
    Named(QName),
    Complex(Ref<ComplexTypeDefinition>),
    Simple(Ref<SimpleTypeDefinition>),
}

impl ElementDeclaration {
    pub(crate) fn map_from_xml_top_level(
        context: &mut MappingContext,
        element: Node,
        schema: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let name = element.attribute("name").ok_or(SchemaError::MissingAttribute {
            element: "element",
            attribute: "name",
        })?;
        let name = QName::with_optional_namespace(schema.attribute("targetNamespace"), name);

        let type_definition = Self::map_type(context, element)?;
        let substitution_group_affiliation = element
            .attribute("substitutionGroup")
            .map(|value| actual_value::<QName>(value, element))
            .transpose()?;

        Ok(context.components.create(Self {
            name,
            scope: Scope::Global,
            type_definition,
            substitution_group_affiliation,
        }))
    }

    pub(crate) fn map_from_xml_local(
        context: &mut MappingContext,
        element: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        if let Some(reference) = element.attribute("ref") {
            let name: QName = actual_value(reference, element)?;
            return Ok(context.components.create(Self {
                name,
                scope: Scope::TopLevelReference,
                type_definition: None,
                substitution_group_affiliation: None,
            }));
        }

        let name = element.attribute("name").ok_or(SchemaError::MissingAttribute {
            element: "element",
            attribute: "name",
        })?;
        // Local declarations are unqualified under the default elementFormDefault; the form
        // editor addresses children by local name either way.
        let name = QName::with_optional_namespace(None::<&str>, name);

        let type_definition = Self::map_type(context, element)?;

        Ok(context.components.create(Self {
            name,
            scope: Scope::Local,
            type_definition,
            substitution_group_affiliation: None,
        }))
    }

    fn map_type(
        context: &mut MappingContext,
        element: Node,
    ) -> Result<Option<TypeReference>, SchemaError> {
        if let Some(type_name) = element.attribute("type") {
            return Ok(Some(TypeReference::Named(actual_value(type_name, element)?)));
        }
        for child in element.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "complexType" => {
                    let definition = ComplexTypeDefinition::map_from_xml(context, child, None)?;
                    return Ok(Some(TypeReference::Complex(definition)));
                }
                "simpleType" => {
                    let definition = SimpleTypeDefinition::map_from_xml(context, child, None)?;
                    return Ok(Some(TypeReference::Simple(definition)));
                }
                _ => {}
            }
        }
        // Neither a type attribute nor an inline definition: xs:anyType, which constrains
        // nothing and therefore offers no insertion points.
        Ok(None)
    }
}
