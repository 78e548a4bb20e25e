use crate::components::SchemaComponentTable;
use crate::model_group::Compositor;
use crate::particle::{MaxOccurs, Particle};
use crate::schema::Schema;
use crate::shared::Term;
use crate::xstypes::NCName;
use crate::Ref;

/// Index of a node in an [`InsertOrderTree`]'s arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InsertOrderId(u32);

impl InsertOrderId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the insert-order view of a content model.
#[derive(Clone, Debug)]
pub struct InsertOrderNode {
    pub kind: InsertOrderKind,
    pub min_occurs: u64,
    pub max_occurs: MaxOccurs,
    /// Arena index of the enclosing group, used to walk upward when evaluating sibling-level
    /// constraints. None only at the root.
    pub parent: Option<InsertOrderId>,
    pub children: Vec<InsertOrderId>,
}

#[derive(Clone, Debug)]
pub enum InsertOrderKind {
    /// Any document order, each child at most as often as its own bounds permit.
    All,
    /// Strict declared order.
    Sequence,
    /// Exactly one alternative per group occurrence.
    Choice,
    Element {
        name: NCName,
        /// Local names of substitution group members that may stand in for this element.
        alternatives: Vec<NCName>,
    },
}

impl InsertOrderNode {
    pub fn element_name(&self) -> Option<&str> {
        match &self.kind {
            InsertOrderKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A derived, disposable view pairing a content model with a live document's occurrence data.
///
/// One tree is built per edit/validation session from the shared immutable schema and discarded
/// afterwards. The tree itself holds no counters; those live in the evaluation session, which is
/// what lets many sessions build trees from one schema concurrently without interference.
pub struct InsertOrderTree {
    nodes: Vec<InsertOrderNode>,
    root: InsertOrderId,
}

impl InsertOrderTree {
    /// Builds the tree for the content model of the element declaration named `local_name`.
    ///
    /// Elements without element content (simple, builtin or anyType) get an empty sequence
    /// root: structurally valid, with no insertion points to offer.
    pub fn for_element(
        schema: &Schema,
        components: &SchemaComponentTable,
        local_name: &str,
    ) -> Option<Self> {
        let declaration = schema.find_element(components, local_name)?;
        match schema.content_model(components, declaration) {
            Some(particle) => Some(Self::from_particle(schema, components, particle)),
            None => Some(Self::empty()),
        }
    }

    /// Builds a tree from any particle subtree root. This is the unit of composition mirrored
    /// from the schema side: every nested group converts independently, in declared order.
    pub fn from_particle(
        schema: &Schema,
        components: &SchemaComponentTable,
        particle: Ref<Particle>,
    ) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: InsertOrderId(0),
        };
        tree.root = tree.append(schema, components, particle, None);
        tree
    }

    fn empty() -> Self {
        Self {
            nodes: vec![InsertOrderNode {
                kind: InsertOrderKind::Sequence,
                min_occurs: 1,
                max_occurs: MaxOccurs::Count(1),
                parent: None,
                children: Vec::new(),
            }],
            root: InsertOrderId(0),
        }
    }

    fn append(
        &mut self,
        schema: &Schema,
        components: &SchemaComponentTable,
        particle: Ref<Particle>,
        parent: Option<InsertOrderId>,
    ) -> InsertOrderId {
        let source = particle.get(components);
        match source.term {
            Term::ModelGroup(group) => {
                let group = group.get(components);
                let kind = match group.compositor {
                    Compositor::All => InsertOrderKind::All,
                    Compositor::Choice => InsertOrderKind::Choice,
                    Compositor::Sequence => InsertOrderKind::Sequence,
                };
                let id = self.push(InsertOrderNode {
                    kind,
                    min_occurs: source.min_occurs,
                    max_occurs: source.max_occurs,
                    parent,
                    children: Vec::new(),
                });
                // Children are appended in declared order for every compositor; <all> ignores
                // the order during evaluation but the editor's default layout keeps it.
                for &child in &group.particles {
                    let built = self.append(schema, components, child, Some(id));
                    self.nodes[id.index()].children.push(built);
                }
                id
            }
            Term::ElementDeclaration(declaration) => {
                let declaration = declaration.get(components);
                let alternatives = schema
                    .substitution_members(&declaration.name)
                    .iter()
                    .map(|member| member.local_name.clone())
                    .collect();
                self.push(InsertOrderNode {
                    kind: InsertOrderKind::Element {
                        name: declaration.name.local_name.clone(),
                        alternatives,
                    },
                    min_occurs: source.min_occurs,
                    max_occurs: source.max_occurs,
                    parent,
                    children: Vec::new(),
                })
            }
        }
    }

    fn push(&mut self, node: InsertOrderNode) -> InsertOrderId {
        let id = InsertOrderId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> InsertOrderId {
        self.root
    }

    pub fn node(&self, id: InsertOrderId) -> &InsertOrderNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Element leaves in declared (preorder) order.
    pub fn element_leaves(&self) -> Vec<InsertOrderId> {
        let mut leaves = Vec::new();
        self.collect_leaves(self.root, &mut leaves);
        leaves
    }

    fn collect_leaves(&self, id: InsertOrderId, leaves: &mut Vec<InsertOrderId>) {
        let node = self.node(id);
        if matches!(node.kind, InsertOrderKind::Element { .. }) {
            leaves.push(id);
        }
        for &child in &node.children {
            self.collect_leaves(child, leaves);
        }
    }

    /// Walks from `id` towards the root, yielding ancestors nearest-first.
    pub fn ancestors(&self, id: InsertOrderId) -> impl Iterator<Item = InsertOrderId> + '_ {
        std::iter::successors(self.node(id).parent, move |&current| self.node(current).parent)
    }
}
