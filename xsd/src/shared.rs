use crate::{ComplexTypeDefinition, ElementDeclaration, ModelGroup, Ref, SimpleTypeDefinition};

/// The term of a [`Particle`](crate::Particle) (§3.9): either a single element declaration or a
/// nested model group.
///
/// Wildcards (`<xs:any>`) are not part of the form-editing model; a schema using them still
/// parses, the wildcard particles are simply skipped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Term {
    ElementDeclaration(Ref<ElementDeclaration>),
    ModelGroup(Ref<ModelGroup>),
}

/// A named or anonymous type definition (§2.2.1).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TypeDefinition {
    Simple(Ref<SimpleTypeDefinition>),
    Complex(Ref<ComplexTypeDefinition>),
}
