use std::collections::HashMap;

use roxmltree::Node;

use crate::attribute_decl::AttributeDeclaration;
use crate::builtins;
use crate::complex_type_def::ComplexTypeDefinition;
use crate::components::SchemaComponentTable;
use crate::element_decl::{ElementDeclaration, Scope, TypeReference};
use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::particle::Particle;
use crate::shared::TypeDefinition;
use crate::simple_type_def::SimpleTypeDefinition;
use crate::xstypes::{AnyURI, QName, Sequence};
use crate::Ref;

/// Schema Component: Schema (§3.17).
///
/// The root entity: constructed once per XSD source, immutable afterwards, and safely shared
/// read-only by any number of concurrent evaluation sessions.
#[derive(Debug)]
pub struct Schema {
    pub target_namespace: Option<AnyURI>,
    pub element_declarations: Sequence<Ref<ElementDeclaration>>,
    pub type_definitions: HashMap<QName, TypeDefinition>,
    pub model_group_definitions: Sequence<QName>,
    /// Head element name to the names of its substitution group members.
    pub substitution_groups: HashMap<QName, Sequence<QName>>,
}

impl Schema {
    pub(crate) fn map_from_xml<'a, 'input: 'a>(
        context: &mut MappingContext<'a, 'input>,
        roots: &[Node<'a, 'input>],
    ) -> Result<Self, SchemaError> {
        for root in roots {
            if root.tag_name().name() != "schema" {
                return Err(SchemaError::NotASchema(root.tag_name().name().to_string()));
            }
        }
        for &root in roots {
            context.register_top_level(root)?;
        }

        let target_namespace = roots[0].attribute("targetNamespace").map(String::from);

        // Named types are mapped from the registration tables, not document order, so forward
        // references and mutually recursive complex types need no special handling: element
        // declarations keep their type by name and the lookup happens after this loop is done.
        let mut type_definitions = HashMap::new();
        for (name, node) in context.named_simple_types() {
            let definition = SimpleTypeDefinition::map_from_xml(context, node, Some(name.clone()))?;
            type_definitions.insert(name, TypeDefinition::Simple(definition));
        }
        for (name, node) in context.named_complex_types() {
            let definition =
                ComplexTypeDefinition::map_from_xml(context, node, Some(name.clone()))?;
            type_definitions.insert(name, TypeDefinition::Complex(definition));
        }

        let mut element_declarations = Sequence::new();
        let mut substitution_groups: HashMap<QName, Sequence<QName>> = HashMap::new();
        for (name, node) in context.top_level_elements() {
            let schema_node = node.document().root_element();
            let declaration =
                ElementDeclaration::map_from_xml_top_level(context, node, schema_node)?;
            let affiliation = declaration
                .get(&context.components)
                .substitution_group_affiliation
                .clone();
            if let Some(head) = affiliation {
                substitution_groups.entry(head).or_default().push(name);
            }
            element_declarations.push(declaration);
        }

        let schema = Self {
            target_namespace,
            element_declarations,
            type_definitions,
            model_group_definitions: context.group_definition_names(),
            substitution_groups,
        };
        schema.verify_references(context)?;
        Ok(schema)
    }

    /// Every named reference must resolve to exactly one definition; a dangling one fails the
    /// whole construction, leaving no partial schema behind.
    fn verify_references(&self, context: &MappingContext) -> Result<(), SchemaError> {
        for declaration in context.components.all::<ElementDeclaration>() {
            if let Some(TypeReference::Named(name)) = &declaration.type_definition {
                if !self.type_definitions.contains_key(name) && !builtins::is_builtin(name) {
                    return Err(SchemaError::UnresolvedTypeReference(name.clone()));
                }
            }
            if declaration.scope == Scope::TopLevelReference
                && !context.has_top_level_element(&declaration.name)
            {
                return Err(SchemaError::UnresolvedElementReference(
                    declaration.name.clone(),
                ));
            }
            if let Some(head) = &declaration.substitution_group_affiliation {
                if !context.has_top_level_element(head) {
                    return Err(SchemaError::UnresolvedElementReference(head.clone()));
                }
            }
        }
        for declaration in context.components.all::<AttributeDeclaration>() {
            if let Some(name) = &declaration.type_name {
                if !self.type_definitions.contains_key(name) && !builtins::is_builtin(name) {
                    return Err(SchemaError::UnresolvedTypeReference(name.clone()));
                }
            }
        }
        Ok(())
    }

    /// The top-level declaration with the given name, if any.
    pub fn top_level_element(
        &self,
        components: &SchemaComponentTable,
        name: &QName,
    ) -> Option<Ref<ElementDeclaration>> {
        self.element_declarations
            .iter()
            .copied()
            .find(|declaration| &declaration.get(components).name == name)
    }

    /// Finds an element declaration by local name: top-level declarations first, then local
    /// declarations anywhere in the component table. Convenient for callers that address the
    /// document by tag name alone, as the form editor does.
    pub fn find_element(
        &self,
        components: &SchemaComponentTable,
        local_name: &str,
    ) -> Option<Ref<ElementDeclaration>> {
        self.element_declarations
            .iter()
            .copied()
            .find(|declaration| declaration.get(components).name.local_name == local_name)
            .or_else(|| {
                components
                    .iter_refs::<ElementDeclaration>()
                    .find(|(_, declaration)| {
                        declaration.name.local_name == local_name
                            && declaration.scope != Scope::TopLevelReference
                    })
                    .map(|(declaration, _)| declaration)
            })
    }

    pub fn type_definition(&self, name: &QName) -> Option<TypeDefinition> {
        self.type_definitions.get(name).copied()
    }

    /// The content model particle governing the children of `element`, following `ref=` and
    /// `type=` indirection. None for simple, builtin and unconstrained (anyType) content.
    pub fn content_model(
        &self,
        components: &SchemaComponentTable,
        element: Ref<ElementDeclaration>,
    ) -> Option<Ref<Particle>> {
        let declaration = element.get(components);
        if declaration.scope == Scope::TopLevelReference {
            let target = self.top_level_element(components, &declaration.name)?;
            return self.content_model(components, target);
        }
        match declaration.type_definition.as_ref()? {
            TypeReference::Complex(definition) => definition.get(components).content_model,
            TypeReference::Simple(_) => None,
            TypeReference::Named(name) => match self.type_definitions.get(name)? {
                TypeDefinition::Complex(definition) => definition.get(components).content_model,
                TypeDefinition::Simple(_) => None,
            },
        }
    }

    /// Names of the substitution group members declared for `head`.
    pub fn substitution_members(&self, head: &QName) -> &[QName] {
        self.substitution_groups
            .get(head)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
