//! Dependency graph over the direct subviews of one superview.
//!
//! A subview depends on a peer when an expression anywhere in its subtree
//! reads a frame inside that peer's subtree. Both ends are represented at
//! the subview level, since a subview's whole subtree is laid out right
//! after the subview itself.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tessera_core::{Axis, LayoutError, ViewId};

use crate::references::{self, ReferenceKind};
use crate::tree::ViewTree;

/// Members of each align group, keyed by axis and group id, in subview order.
pub type AlignGroups = IndexMap<(Axis, i32), SmallVec<[ViewId; 4]>>;

/// Ordering constraints among one superview's subviews.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Each subview and the subviews it must wait for
    dependencies: IndexMap<ViewId, IndexSet<ViewId>>,
}

impl DependencyGraph {
    /// Build the graph for `superview`'s direct subviews.
    ///
    /// Fails on references that can never be satisfied: a descendant of the
    /// referencing view, a detached view, or a destroyed one.
    pub fn build(
        tree: &ViewTree,
        superview: ViewId,
        reachable: &IndexSet<ViewId>,
    ) -> Result<Self, LayoutError> {
        let groups = align_groups(tree, superview);
        let mut dependencies = IndexMap::new();

        for &node in tree.subviews(superview) {
            let mut deps = IndexSet::new();

            for reader in tree.reachable_from(node) {
                for target in references::view_references(tree.view(reader)?) {
                    match references::check(tree, reachable, reader, target)? {
                        ReferenceKind::Peer => {}
                        _ => continue,
                    }
                    // Targets above this superview were resolved by an outer level
                    let Some(sibling) = sibling_level(tree, superview, target) else {
                        continue;
                    };
                    if sibling == node {
                        continue;
                    }
                    deps.insert(sibling);
                    for members in groups.values().filter(|m| m.contains(&sibling)) {
                        deps.extend(members.iter().copied());
                    }
                }
            }

            deps.shift_remove(&node);
            dependencies.insert(node, deps);
        }

        Ok(Self { dependencies })
    }

    /// The nodes, in subview order.
    pub fn nodes(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.dependencies.keys().copied()
    }

    /// What `node` must wait for.
    pub fn dependencies(&self, node: ViewId) -> impl Iterator<Item = ViewId> + '_ {
        self.dependencies
            .get(&node)
            .into_iter()
            .flat_map(|deps| deps.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// A safe evaluation order, computed with Kahn's algorithm.
    ///
    /// Ties are broken by subview order, so a graph without edges yields
    /// the subviews as they were added.
    pub fn order(&self) -> Result<Vec<ViewId>, LayoutError> {
        let mut in_degree: IndexMap<ViewId, usize> = IndexMap::new();
        let mut dependents: IndexMap<ViewId, SmallVec<[ViewId; 4]>> = IndexMap::new();

        for (&node, deps) in &self.dependencies {
            in_degree.insert(node, deps.len());
            for &dep in deps {
                dependents.entry(dep).or_default().push(node);
            }
        }

        let mut queue: VecDeque<ViewId> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&node, _)| node)
            .collect();
        let mut result = Vec::with_capacity(in_degree.len());

        while let Some(node) = queue.pop_front() {
            result.push(node);
            let Some(waiting) = dependents.get(&node) else {
                continue;
            };
            for dependent in waiting {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }

        if result.len() < in_degree.len() {
            let remaining: Vec<ViewId> = in_degree
                .iter()
                .filter(|(_, &degree)| degree > 0)
                .map(|(&node, _)| node)
                .collect();
            return Err(LayoutError::StructuralCycle {
                views: remaining,
                detail: "subviews depend on each other".to_string(),
            });
        }

        Ok(result)
    }
}

/// The ancestor of `target` (or `target` itself) that is a direct subview
/// of `superview`.
fn sibling_level(tree: &ViewTree, superview: ViewId, target: ViewId) -> Option<ViewId> {
    std::iter::once(target)
        .chain(tree.ancestors(target))
        .find(|&id| tree.superview(id) == Some(superview))
}

/// Group the direct subviews of `superview` by the align group of their
/// position on each axis.
pub fn align_groups(tree: &ViewTree, superview: ViewId) -> AlignGroups {
    let mut groups = AlignGroups::new();
    for &id in tree.subviews(superview) {
        let Some(view) = tree.get(id) else {
            continue;
        };
        for axis in Axis::ALL {
            if let Some(group_id) = view.pos(axis).align_group_id() {
                groups.entry((axis, group_id)).or_default().push(id);
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::Alignment;
    use crate::tree::View;
    use crate::{Dim, Pos};

    fn tree_with_children(count: usize) -> (ViewTree, ViewId, Vec<ViewId>) {
        let mut tree = ViewTree::new();
        let root = tree.insert(View::new());
        let children = (0..count)
            .map(|_| {
                let id = tree.insert(View::new());
                tree.add_subview(root, id).unwrap();
                id
            })
            .collect();
        (tree, root, children)
    }

    fn order_of(tree: &ViewTree, root: ViewId) -> Result<Vec<ViewId>, LayoutError> {
        let reachable = tree.reachable_from(root);
        DependencyGraph::build(tree, root, &reachable)?.order()
    }

    #[test]
    fn test_no_edges_keeps_subview_order() {
        let (tree, root, children) = tree_with_children(4);
        assert_eq!(order_of(&tree, root).unwrap(), children);
    }

    #[test]
    fn test_peer_edges_reorder() {
        let (mut tree, root, children) = tree_with_children(3);
        let (a, b, c) = (children[0], children[1], children[2]);
        tree.get_mut(a).unwrap().set_x(Pos::right(c) + 1);
        tree.get_mut(c).unwrap().set_width(Dim::width(b));
        assert_eq!(order_of(&tree, root).unwrap(), vec![b, c, a]);
    }

    #[test]
    fn test_self_and_ancestor_references_add_no_edges() {
        let (mut tree, root, children) = tree_with_children(2);
        let a = children[0];
        tree.get_mut(a).unwrap().set_width(Dim::width(a) + Dim::width(root));
        let reachable = tree.reachable_from(root);
        let graph = DependencyGraph::build(&tree, root, &reachable).unwrap();
        assert_eq!(graph.dependencies(a).count(), 0);
        assert_eq!(graph.order().unwrap(), children);
    }

    #[test]
    fn test_mutual_peers_are_a_cycle() {
        let (mut tree, root, children) = tree_with_children(3);
        let (a, b) = (children[0], children[1]);
        tree.get_mut(a).unwrap().set_x(Pos::right(b));
        tree.get_mut(b).unwrap().set_x(Pos::right(a));
        match order_of(&tree, root) {
            Err(LayoutError::StructuralCycle { views, .. }) => assert_eq!(views, vec![a, b]),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_peer_maps_to_sibling() {
        let (mut tree, root, children) = tree_with_children(2);
        let (a, b) = (children[0], children[1]);
        let inner = tree.insert(View::new());
        tree.add_subview(b, inner).unwrap();
        tree.get_mut(a).unwrap().set_y(Pos::bottom(inner));
        assert_eq!(order_of(&tree, root).unwrap(), vec![b, a]);
    }

    #[test]
    fn test_reading_a_dependent_subtree_is_a_cycle() {
        let (mut tree, root, children) = tree_with_children(2);
        let (a, b) = (children[0], children[1]);
        let inner = tree.insert(View::new());
        tree.add_subview(b, inner).unwrap();
        tree.get_mut(b).unwrap().set_x(Pos::right(a));
        tree.get_mut(a).unwrap().set_y(Pos::bottom(inner));
        assert!(matches!(
            order_of(&tree, root),
            Err(LayoutError::StructuralCycle { .. })
        ));
    }

    #[test]
    fn test_reference_to_align_member_waits_for_group() {
        let (mut tree, root, children) = tree_with_children(3);
        let (reader, first, second) = (children[0], children[1], children[2]);
        tree.get_mut(first).unwrap().set_x(Pos::align(Alignment::Center));
        tree.get_mut(second).unwrap().set_x(Pos::align(Alignment::Center));
        tree.get_mut(reader).unwrap().set_y(Pos::bottom(first));
        assert_eq!(order_of(&tree, root).unwrap(), vec![first, second, reader]);

        let groups = align_groups(&tree, root);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&(Axis::Width, 0)].as_slice(), &[first, second]);
    }

    #[test]
    fn test_cousin_reference_orders_ancestors() {
        let mut tree = ViewTree::new();
        let root = tree.insert(View::new());
        let left = tree.insert(View::new());
        let right = tree.insert(View::new());
        let inner = tree.insert(View::new());
        let target = tree.insert(View::new());
        tree.add_subview(root, left).unwrap();
        tree.add_subview(root, right).unwrap();
        tree.add_subview(left, inner).unwrap();
        tree.add_subview(right, target).unwrap();
        tree.get_mut(inner).unwrap().set_x(Pos::right(target));

        let reachable = tree.reachable_from(root);
        let graph = DependencyGraph::build(&tree, root, &reachable).unwrap();
        assert_eq!(graph.dependencies(left).collect::<Vec<_>>(), vec![right]);
        assert_eq!(graph.order().unwrap(), vec![right, left]);

        // One level down the target sits above the superview
        let graph = DependencyGraph::build(&tree, left, &reachable).unwrap();
        assert_eq!(graph.order().unwrap(), vec![inner]);
    }

    #[test]
    fn test_references_inside_own_subtree_add_no_edge() {
        let (mut tree, root, children) = tree_with_children(2);
        let a = children[0];
        let first = tree.insert(View::new());
        let second = tree.insert(View::new().with_x(Pos::right(first)));
        tree.add_subview(a, first).unwrap();
        tree.add_subview(a, second).unwrap();
        assert_eq!(order_of(&tree, root).unwrap(), children);
    }
}
