use std::collections::BTreeSet;

use thiserror::Error;

use crate::insert_order::{InsertOrderId, InsertOrderKind, InsertOrderTree};
use crate::particle::MaxOccurs;

/// Why an insertion was refused.
///
/// These are recoverable, structured outcomes: the caller decides whether to disable an "add"
/// control or surface the conflict to the user. Nothing here aborts a session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InsertDenied {
    #[error("element {name:?} is not declared in this content model")]
    UnknownElement { name: String },

    #[error("another occurrence of {name:?} would exceed its occurrence bounds")]
    OccursBoundsExceeded { name: String },

    #[error("inserting {name:?} conflicts with an already chosen alternative of the enclosing choice")]
    ChoiceExhausted { name: String },

    #[error("{name:?} cannot be placed without violating the declared sequence order")]
    SequenceOrderViolation { name: String },

    #[error("index {position} is outside the sibling range 0..={limit}")]
    PositionOutOfRange { position: usize, limit: usize },
}

/// Computes every index in `0..=siblings.len()` at which an element named `name` may legally be
/// inserted, given the sibling names already present at the target position.
///
/// The full set is returned rather than a single position so the editor can offer all valid
/// spots. When no position is legal the denial explains why. Counters are seeded from
/// `siblings` inside this one pass; calling again with the same arguments returns the same
/// answer.
pub fn insertion_points(
    tree: &InsertOrderTree,
    siblings: &[&str],
    name: &str,
) -> Result<Vec<usize>, InsertDenied> {
    Session::new(tree, siblings).insertion_points(name)
}

/// Membership test over [`insertion_points`]: may `name` go exactly at `position`?
pub fn can_insert(
    tree: &InsertOrderTree,
    siblings: &[&str],
    name: &str,
    position: usize,
) -> Result<(), InsertDenied> {
    let points = insertion_points(tree, siblings, name)?;
    if points.contains(&position) {
        Ok(())
    } else if position > siblings.len() {
        Err(InsertDenied::PositionOutOfRange {
            position,
            limit: siblings.len(),
        })
    } else {
        // In-range positions are only ever excluded by the sequence-order filter; cardinality
        // does not depend on position.
        Err(InsertDenied::SequenceOrderViolation {
            name: name.to_string(),
        })
    }
}

/// One evaluation pass over one insert-order tree.
///
/// Construction attributes every existing sibling to an element leaf and counts it; the
/// counters die with the session, never with the tree.
struct Session<'a> {
    tree: &'a InsertOrderTree,
    leaves: Vec<InsertOrderId>,
    sequences: Vec<InsertOrderId>,
    counts: Vec<u64>,
    assignments: Vec<Option<InsertOrderId>>,
}

impl<'a> Session<'a> {
    fn new(tree: &'a InsertOrderTree, siblings: &[&str]) -> Self {
        let mut session = Session {
            tree,
            leaves: tree.element_leaves(),
            sequences: sequence_groups(tree),
            counts: vec![0; tree.len()],
            assignments: Vec::with_capacity(siblings.len()),
        };
        for sibling in siblings {
            let assigned = session.assign(sibling);
            session.assignments.push(assigned);
        }
        session
    }

    /// Attributes one existing occurrence of `name` to a leaf: the first declared leaf with
    /// spare capacity, or failing that the first matching leaf at all, so that an already
    /// invalid document still seeds saturation. A name matching no leaf stays unassigned; the
    /// document predates this edit and is not what the query is about.
    fn assign(&mut self, name: &str) -> Option<InsertOrderId> {
        let mut fallback = None;
        let mut chosen = None;
        for &leaf in &self.leaves {
            if !self.matches(leaf, name) {
                continue;
            }
            if fallback.is_none() {
                fallback = Some(leaf);
            }
            if self.effective_max(leaf).allows(self.counts[leaf.index()]) {
                chosen = Some(leaf);
                break;
            }
        }
        let chosen = chosen.or(fallback)?;
        self.counts[chosen.index()] += 1;
        Some(chosen)
    }

    fn insertion_points(&self, name: &str) -> Result<Vec<usize>, InsertDenied> {
        let candidates: Vec<InsertOrderId> = self
            .leaves
            .iter()
            .copied()
            .filter(|&leaf| self.matches(leaf, name))
            .collect();
        if candidates.is_empty() {
            return Err(InsertDenied::UnknownElement {
                name: name.to_string(),
            });
        }

        // An element may be declared in several places; any leaf that admits it contributes its
        // positions, and the first denial is kept in case none does.
        let mut positions = BTreeSet::new();
        let mut denial = None;
        for leaf in candidates {
            match self.check_leaf(leaf, name) {
                Ok(()) => positions.extend(self.positions_for(leaf)),
                Err(refused) => {
                    denial.get_or_insert(refused);
                }
            }
        }

        if positions.is_empty() {
            Err(denial.unwrap_or(InsertDenied::SequenceOrderViolation {
                name: name.to_string(),
            }))
        } else {
            Ok(positions.into_iter().collect())
        }
    }

    fn matches(&self, leaf: InsertOrderId, name: &str) -> bool {
        match &self.tree.node(leaf).kind {
            InsertOrderKind::Element { name: declared, alternatives } => {
                declared == name || alternatives.iter().any(|alternative| alternative == name)
            }
            _ => false,
        }
    }

    /// How often this node may occur in the whole sibling list: its own bound multiplied up the
    /// ancestor chain. Inside <all> a child occurs only as often as its own bound permits, no
    /// matter how often the group nominally repeats.
    fn effective_max(&self, id: InsertOrderId) -> MaxOccurs {
        self.max_toward_root(id, None)
    }

    /// Same product, stopped below `stop`: with `stop` the enclosing group, the result is how
    /// often the node may occur within a single occurrence of that group.
    fn max_toward_root(&self, id: InsertOrderId, stop: Option<InsertOrderId>) -> MaxOccurs {
        let mut bound = self.tree.node(id).max_occurs;
        for ancestor in self.tree.ancestors(id) {
            if Some(ancestor) == stop {
                break;
            }
            let node = self.tree.node(ancestor);
            let factor = match node.kind {
                InsertOrderKind::All => MaxOccurs::Count(1),
                _ => node.max_occurs,
            };
            bound = bound.combined_with(factor);
        }
        bound
    }

    fn subtree_count(&self, id: InsertOrderId) -> u64 {
        self.subtree_count_in(id, &self.counts)
    }

    fn subtree_count_in(&self, id: InsertOrderId, counts: &[u64]) -> u64 {
        let node = self.tree.node(id);
        match node.kind {
            InsertOrderKind::Element { .. } => counts[id.index()],
            _ => node
                .children
                .iter()
                .map(|&child| self.subtree_count_in(child, counts))
                .sum(),
        }
    }

    /// Cardinality checks for one candidate leaf, from the leaf's own bound outward through
    /// every enclosing group.
    fn check_leaf(&self, leaf: InsertOrderId, name: &str) -> Result<(), InsertDenied> {
        // Own bound first: a spent element reports bounds exhaustion even when the enclosing
        // choice happens to be saturated as well.
        if !self.effective_max(leaf).allows(self.counts[leaf.index()]) {
            return Err(InsertDenied::OccursBoundsExceeded {
                name: name.to_string(),
            });
        }

        let mut current = leaf;
        while let Some(ancestor) = self.tree.node(current).parent {
            match self.tree.node(ancestor).kind {
                InsertOrderKind::Choice => self.check_choice(ancestor, current, name)?,
                InsertOrderKind::Sequence => {
                    self.check_sequence_predecessors(ancestor, current, name)?
                }
                _ => {}
            }
            current = ancestor;
        }
        Ok(())
    }

    /// A choice admits the candidate while it has unspent occurrences. Continuing the already
    /// chosen branch consumes no new occurrence as long as that branch can absorb another
    /// element within its own per-occurrence bound.
    fn check_choice(
        &self,
        choice: InsertOrderId,
        branch: InsertOrderId,
        name: &str,
    ) -> Result<(), InsertDenied> {
        let node = self.tree.node(choice);
        let capacity = match node.max_occurs {
            MaxOccurs::Unbounded => return Ok(()),
            MaxOccurs::Count(capacity) => capacity,
        };
        let consumed: u64 = node
            .children
            .iter()
            .map(|&alternative| self.occurrences_consumed(alternative))
            .sum();
        let needs_new_occurrence = !self.branch_has_spare(branch);
        if consumed + u64::from(needs_new_occurrence) > capacity {
            return Err(InsertDenied::ChoiceExhausted {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// How many occurrences of the enclosing choice this branch has used up, counting one full
    /// branch particle per occurrence.
    fn occurrences_consumed(&self, branch: InsertOrderId) -> u64 {
        let count = self.subtree_count(branch);
        if count == 0 {
            return 0;
        }
        match self.tree.node(branch).max_occurs {
            MaxOccurs::Unbounded => 1,
            // A prohibited branch should not occur at all; every occurrence is excess.
            MaxOccurs::Count(0) => count,
            MaxOccurs::Count(per_occurrence) => count.div_ceil(per_occurrence),
        }
    }

    fn branch_has_spare(&self, branch: InsertOrderId) -> bool {
        let count = self.subtree_count(branch);
        if count == 0 {
            return false;
        }
        match self.tree.node(branch).max_occurs {
            MaxOccurs::Unbounded => true,
            MaxOccurs::Count(0) => false,
            MaxOccurs::Count(per_occurrence) => count % per_occurrence != 0,
        }
    }

    /// Every particle declared before `branch` in a sequence must have satisfied its minOccurs
    /// before anything from `branch` onwards may be inserted.
    fn check_sequence_predecessors(
        &self,
        sequence: InsertOrderId,
        branch: InsertOrderId,
        name: &str,
    ) -> Result<(), InsertDenied> {
        for &child in &self.tree.node(sequence).children {
            if child == branch {
                break;
            }
            if !self.satisfied_in(child, &self.counts) {
                return Err(InsertDenied::SequenceOrderViolation {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a subtree meets its minimum occurrence requirements under the given counters; an
    /// absent optional subtree counts as satisfied.
    fn satisfied_in(&self, id: InsertOrderId, counts: &[u64]) -> bool {
        let node = self.tree.node(id);
        match node.kind {
            InsertOrderKind::Element { .. } => counts[id.index()] >= node.min_occurs,
            _ if node.min_occurs == 0 && self.subtree_count_in(id, counts) == 0 => true,
            InsertOrderKind::Sequence | InsertOrderKind::All => node
                .children
                .iter()
                .all(|&child| self.satisfied_in(child, counts)),
            InsertOrderKind::Choice => node
                .children
                .iter()
                .any(|&child| self.satisfied_in(child, counts)),
        }
    }

    /// Position filter: the candidate leaf is tried at every slot, and a slot is legal when the
    /// resulting document order is still consistent with every sequence group in the tree.
    fn positions_for(&self, leaf: InsertOrderId) -> Vec<usize> {
        let total = self.assignments.len();
        let mut positions = Vec::new();
        for position in 0..=total {
            let mut ordered = Vec::with_capacity(total + 1);
            for (index, assigned) in self.assignments.iter().enumerate() {
                if index == position {
                    ordered.push(leaf);
                }
                if let Some(sibling) = *assigned {
                    ordered.push(sibling);
                }
            }
            if position == total {
                ordered.push(leaf);
            }
            if self.ordering_consistent(&ordered) {
                positions.push(position);
            }
        }
        positions
    }

    fn ordering_consistent(&self, ordered: &[InsertOrderId]) -> bool {
        self.sequences
            .iter()
            .all(|&sequence| self.sequence_admits(sequence, ordered))
    }

    /// Replays the document order projected onto one sequence group, splitting it greedily into
    /// group occurrences: a step backwards in declared order, or a leaf already at its bound
    /// within the running occurrence, starts the next one. An occurrence may only be left
    /// behind complete, and the number of occurrences is capped by the group's own bounds.
    /// This is what keeps a repeating sequence from interleaving half-finished repetitions.
    fn sequence_admits(&self, sequence: InsertOrderId, ordered: &[InsertOrderId]) -> bool {
        let children = &self.tree.node(sequence).children;
        let mut occurrence_counts = vec![0u64; self.tree.len()];
        let mut occurrences: u64 = 1;
        let mut seen_any = false;
        let mut last_branch = 0usize;

        for &leaf in ordered {
            let Some(branch) = self.branch_index_under(sequence, leaf) else {
                continue;
            };
            let wraps = if seen_any && branch < last_branch {
                true
            } else {
                !self
                    .max_toward_root(leaf, Some(sequence))
                    .allows(occurrence_counts[leaf.index()])
            };
            if wraps {
                if !children
                    .iter()
                    .all(|&child| self.satisfied_in(child, &occurrence_counts))
                {
                    return false;
                }
                occurrences += 1;
                occurrence_counts.fill(0);
            }
            occurrence_counts[leaf.index()] += 1;
            seen_any = true;
            last_branch = branch;
        }

        // occurrences <= effective bound; the trailing occurrence may still be incomplete.
        self.effective_max(sequence).allows(occurrences - 1)
    }

    /// The index of the child branch of `group` through which `leaf` hangs, if any.
    fn branch_index_under(&self, group: InsertOrderId, leaf: InsertOrderId) -> Option<usize> {
        let mut current = leaf;
        while let Some(parent) = self.tree.node(current).parent {
            if parent == group {
                return self
                    .tree
                    .node(group)
                    .children
                    .iter()
                    .position(|&child| child == current);
            }
            current = parent;
        }
        None
    }
}

fn sequence_groups(tree: &InsertOrderTree) -> Vec<InsertOrderId> {
    let mut groups = Vec::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        if matches!(node.kind, InsertOrderKind::Sequence) && !node.children.is_empty() {
            groups.push(id);
        }
        stack.extend(node.children.iter().copied());
    }
    groups
}
