use std::collections::HashMap;

use roxmltree::Node;

use crate::components::SchemaComponentTable;
use crate::error::SchemaError;
use crate::xstypes::QName;

/// Construction-time state for mapping one or more schema documents into components.
///
/// The first registration pass records every named top-level declaration as a source node, so
/// the second pass can resolve forward references and mutually recursive complex types without
/// caring about document order. The group expansion stack detects model group definitions that
/// require themselves without an intervening element declaration.
pub(crate) struct MappingContext<'a, 'input> {
    pub components: SchemaComponentTable,
    complex_type_nodes: HashMap<QName, Node<'a, 'input>>,
    simple_type_nodes: HashMap<QName, Node<'a, 'input>>,
    element_nodes: HashMap<QName, Node<'a, 'input>>,
    group_definition_nodes: HashMap<QName, Node<'a, 'input>>,
    group_expansion_stack: Vec<QName>,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    pub(crate) fn new() -> Self {
        Self {
            components: SchemaComponentTable::default(),
            complex_type_nodes: HashMap::new(),
            simple_type_nodes: HashMap::new(),
            element_nodes: HashMap::new(),
            group_definition_nodes: HashMap::new(),
            group_expansion_stack: Vec::new(),
        }
    }

    /// First pass: record the named top-level declarations of one schema document.
    pub(crate) fn register_top_level(
        &mut self,
        schema: Node<'a, 'input>,
    ) -> Result<(), SchemaError> {
        let target_namespace = schema.attribute("targetNamespace");
        for child in schema.children().filter(|child| child.is_element()) {
            let table = match child.tag_name().name() {
                "complexType" => &mut self.complex_type_nodes,
                "simpleType" => &mut self.simple_type_nodes,
                "element" => &mut self.element_nodes,
                "group" => &mut self.group_definition_nodes,
                _ => continue,
            };
            let name = child.attribute("name").ok_or(SchemaError::MissingAttribute {
                element: "top-level declaration",
                attribute: "name",
            })?;
            let name = QName::with_optional_namespace(target_namespace, name);
            // Re-registration (e.g. the same document included twice) keeps the first node.
            table.entry(name).or_insert(child);
        }
        Ok(())
    }

    pub(crate) fn named_complex_types(&self) -> Vec<(QName, Node<'a, 'input>)> {
        Self::sorted(&self.complex_type_nodes)
    }

    pub(crate) fn named_simple_types(&self) -> Vec<(QName, Node<'a, 'input>)> {
        Self::sorted(&self.simple_type_nodes)
    }

    pub(crate) fn top_level_elements(&self) -> Vec<(QName, Node<'a, 'input>)> {
        Self::sorted(&self.element_nodes)
    }

    pub(crate) fn group_definition_names(&self) -> Vec<QName> {
        Self::sorted(&self.group_definition_nodes)
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    pub(crate) fn group_definition(&self, name: &QName) -> Option<Node<'a, 'input>> {
        self.group_definition_nodes.get(name).copied()
    }

    pub(crate) fn has_top_level_element(&self, name: &QName) -> bool {
        self.element_nodes.contains_key(name)
    }

    pub(crate) fn push_group(&mut self, name: QName) -> Result<(), SchemaError> {
        if self.group_expansion_stack.contains(&name) {
            return Err(SchemaError::CyclicTypeDefinition(name));
        }
        self.group_expansion_stack.push(name);
        Ok(())
    }

    pub(crate) fn pop_group(&mut self) {
        self.group_expansion_stack.pop();
    }

    pub(crate) fn into_components(self) -> SchemaComponentTable {
        self.components
    }

    // HashMap iteration order is arbitrary; mapping in name order keeps component creation
    // deterministic across runs.
    fn sorted(table: &HashMap<QName, Node<'a, 'input>>) -> Vec<(QName, Node<'a, 'input>)> {
        let mut entries: Vec<_> = table
            .iter()
            .map(|(name, node)| (name.clone(), *node))
            .collect();
        entries.sort_by(|(a, _), (b, _)| {
            (a.namespace_name.as_deref(), a.local_name.as_str())
                .cmp(&(b.namespace_name.as_deref(), b.local_name.as_str()))
        });
        entries
    }
}
