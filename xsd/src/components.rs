use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroU32;

use crate::{
    AttributeDeclaration, ComplexTypeDefinition, ElementDeclaration, ModelGroup, Particle,
    SimpleTypeDefinition,
};

/// Trait implemented by all concrete schema components.
pub trait Component: Sized {
    const DISPLAY_NAME: &'static str;

    fn container(table: &SchemaComponentTable) -> &Vec<Self>;
    fn container_mut(table: &mut SchemaComponentTable) -> &mut Vec<Self>;
}

/// A typed reference to a [`Component`] stored in a [`SchemaComponentTable`].
///
/// References are plain arena indices; components refer to each other exclusively through them,
/// so the table owns every node and no component holds a lifetime on another.
pub struct Ref<R: Component>(NonZeroU32, PhantomData<R>);

impl<R: Component> Ref<R> {
    pub(crate) fn from_index(index: usize) -> Self {
        let inner = u32::try_from(index + 1)
            .ok()
            .and_then(NonZeroU32::new)
            .expect("component table exceeded u32::MAX entries");
        Self(inner, PhantomData)
    }

    fn index(self) -> usize {
        u32::from(self.0) as usize - 1
    }

    pub fn get(self, table: &SchemaComponentTable) -> &R {
        table.get(self)
    }
}

// derive(...) does not work if R itself does not derive the trait, even though it is only "used"
// in the PhantomData; hence we have to manually implement the required traits for Ref.

impl<R: Component> Copy for Ref<R> {}

impl<R: Component> Clone for Ref<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Component> fmt::Debug for Ref<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{} #{}>", R::DISPLAY_NAME, self.0)
    }
}

impl<R: Component> PartialEq for Ref<R> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<R: Component> Eq for Ref<R> {}

impl<R: Component> Hash for Ref<R> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Arena-like container owning every component built during schema mapping.
///
/// The table is append-only: components are created bottom-up and never mutated afterwards, which
/// is what makes a finished schema safely shareable across concurrent evaluation sessions.
#[derive(Default, Debug)]
pub struct SchemaComponentTable {
    particles: Vec<Particle>,
    model_groups: Vec<ModelGroup>,
    element_declarations: Vec<ElementDeclaration>,
    attribute_declarations: Vec<AttributeDeclaration>,
    simple_type_definitions: Vec<SimpleTypeDefinition>,
    complex_type_definitions: Vec<ComplexTypeDefinition>,
}

impl SchemaComponentTable {
    pub(crate) fn create<R: Component>(&mut self, value: R) -> Ref<R> {
        let container = R::container_mut(self);
        container.push(value);
        Ref::from_index(container.len() - 1)
    }

    pub fn get<R: Component>(&self, ref_: Ref<R>) -> &R {
        &R::container(self)[ref_.index()]
    }

    /// All components of one kind, in creation order.
    pub fn all<R: Component>(&self) -> &[R] {
        R::container(self)
    }

    // The explicit bound keeps R out of the opaque iterator's captured &self lifetime.
    pub fn iter_refs<'a, R: Component + 'a>(&'a self) -> impl Iterator<Item = (Ref<R>, &'a R)> {
        R::container(self)
            .iter()
            .enumerate()
            .map(|(index, value)| (Ref::from_index(index), value))
    }
}

macro_rules! impl_component {
    ($component:ty => $container:ident, $display_name:literal) => {
        impl Component for $component {
            const DISPLAY_NAME: &'static str = $display_name;

            fn container(table: &SchemaComponentTable) -> &Vec<Self> {
                &table.$container
            }

            fn container_mut(table: &mut SchemaComponentTable) -> &mut Vec<Self> {
                &mut table.$container
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xstypes::QName;

    #[test]
    fn iter_refs_pairs_each_component_with_a_resolving_reference() {
        let mut table = SchemaComponentTable::default();
        let first = table.create(SimpleTypeDefinition { name: None });
        let second = table.create(SimpleTypeDefinition {
            name: Some(QName::with_optional_namespace(None::<&str>, "token")),
        });

        let collected: Vec<_> = table.iter_refs::<SimpleTypeDefinition>().collect();
        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].0, first);
        assert_eq!(collected[1].0, second);
        assert_eq!(
            collected[1].1.name.as_ref().map(|name| name.local_name.as_str()),
            Some("token")
        );
    }
}

impl_component!(Particle => particles, "Particle");
impl_component!(ModelGroup => model_groups, "Model Group");
impl_component!(ElementDeclaration => element_declarations, "Element Declaration");
impl_component!(AttributeDeclaration => attribute_declarations, "Attribute Declaration");
impl_component!(SimpleTypeDefinition => simple_type_definitions, "Simple Type Definition");
impl_component!(ComplexTypeDefinition => complex_type_definitions, "Complex Type Definition");
