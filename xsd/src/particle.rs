use roxmltree::Node;

use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::model_group::ModelGroup;
use crate::model_group_def::ModelGroupDefinition;
use crate::shared::Term;
use crate::values::actual_value;
use crate::{ElementDeclaration, Ref};

/// Schema Component: Particle, a kind of Component (§3.9)
#[derive(Clone, Debug)]
pub struct Particle {
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
    pub term: Term,
}

/// The upper occurrence bound of a particle. `unbounded` gets its own variant rather than a
/// finite sentinel value so that comparisons against real counts cannot overflow or collide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Count(u64),
    Unbounded,
}

impl MaxOccurs {
    /// Whether one more occurrence fits on top of `count`.
    pub fn allows(self, count: u64) -> bool {
        match self {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Count(max) => count < max,
        }
    }

    /// Bound for a particle nested inside another: occurrences per document are limited by the
    /// product of the bounds along the chain. A prohibited particle (maxOccurs="0") anywhere in
    /// the chain prohibits the whole subtree.
    pub fn combined_with(self, outer: MaxOccurs) -> MaxOccurs {
        match (self, outer) {
            (MaxOccurs::Count(0), _) | (_, MaxOccurs::Count(0)) => MaxOccurs::Count(0),
            (MaxOccurs::Count(a), MaxOccurs::Count(b)) => MaxOccurs::Count(a.saturating_mul(b)),
            _ => MaxOccurs::Unbounded,
        }
    }
}

/// Parses the occurrence range of a particle-bearing element.
///
/// minOccurs defaults to 1; maxOccurs defaults to 1 and admits the literal `unbounded` (§3.9.3).
/// minOccurs > maxOccurs fails construction outright, it is never clamped.
pub(crate) fn occurrence_range(node: Node) -> Result<(u64, MaxOccurs), SchemaError> {
    let min_occurs = node
        .attribute("minOccurs")
        .map(|value| actual_value::<u64>(value, node))
        .transpose()?
        .unwrap_or(1);

    let max_occurs = match node.attribute("maxOccurs") {
        Some("unbounded") => MaxOccurs::Unbounded,
        Some(value) => MaxOccurs::Count(actual_value::<u64>(value, node)?),
        None => MaxOccurs::Count(1),
    };

    if let MaxOccurs::Count(max) = max_occurs {
        if min_occurs > max {
            return Err(SchemaError::InvalidOccurs {
                min: min_occurs,
                max,
            });
        }
    }

    Ok((min_occurs, max_occurs))
}

impl Particle {
    /// Mapper for model groups <all>, <choice> and <sequence> (§3.8.2).
    pub(crate) fn map_from_xml_model_group(
        context: &mut MappingContext,
        group: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let (min_occurs, max_occurs) = occurrence_range(group)?;
        let model_group = ModelGroup::map_from_xml(context, group)?;
        Ok(context.components.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::ModelGroup(model_group),
        }))
    }

    /// Mapper for local element declarations and element references (§3.3.2).
    pub(crate) fn map_from_xml_local_element(
        context: &mut MappingContext,
        element: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let (min_occurs, max_occurs) = occurrence_range(element)?;
        let declaration = ElementDeclaration::map_from_xml_local(context, element)?;
        Ok(context.components.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::ElementDeclaration(declaration),
        }))
    }

    /// Mapper for model group references <group ref="..."> (§3.7.2). The reference's own
    /// occurrence range applies to the expanded group.
    pub(crate) fn map_from_xml_group_reference(
        context: &mut MappingContext,
        group: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let (min_occurs, max_occurs) = occurrence_range(group)?;
        let model_group = ModelGroupDefinition::expand_reference(context, group)?;
        Ok(context.components.create(Particle {
            min_occurs,
            max_occurs,
            term: Term::ModelGroup(model_group),
        }))
    }
}
