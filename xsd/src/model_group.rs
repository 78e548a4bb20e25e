use roxmltree::Node;

use crate::error::SchemaError;
use crate::mapping_context::MappingContext;
use crate::particle::Particle;
use crate::xstypes::Sequence;
use crate::Ref;

/// Schema Component: Model Group, a kind of Term (§3.8)
#[derive(Clone, Debug)]
pub struct ModelGroup {
    pub compositor: Compositor,
    pub particles: Sequence<Ref<Particle>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compositor {
    All,
    Choice,
    Sequence,
}

impl ModelGroup {
    /// Maps an <all>, <choice> or <sequence> element to a model group. Child particles are kept
    /// in declared order for every compositor — <all> permits any document order, but the
    /// declared order still decides the default ordering offered by the editor.
    pub(crate) fn map_from_xml(
        context: &mut MappingContext,
        group: Node,
    ) -> Result<Ref<Self>, SchemaError> {
        let compositor = match group.tag_name().name() {
            "all" => Compositor::All,
            "choice" => Compositor::Choice,
            "sequence" => Compositor::Sequence,
            other => {
                return Err(SchemaError::InvalidValue {
                    value: other.to_string(),
                    expected: "one of all, choice, sequence",
                })
            }
        };

        let mut particles = Sequence::new();
        for child in group.children().filter(|child| child.is_element()) {
            match child.tag_name().name() {
                "all" | "choice" | "sequence" => {
                    particles.push(Particle::map_from_xml_model_group(context, child)?);
                }
                "element" => {
                    particles.push(Particle::map_from_xml_local_element(context, child)?);
                }
                "group" => {
                    particles.push(Particle::map_from_xml_group_reference(context, child)?);
                }
                // Wildcards and annotations carry no insertable element names.
                _ => {}
            }
        }

        Ok(context.components.create(ModelGroup {
            compositor,
            particles,
        }))
    }
}
