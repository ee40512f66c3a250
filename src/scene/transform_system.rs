//! Transform System
//!
//! Walks the node arena and propagates world transforms. Kept apart from
//! [`SceneGraph`](super::SceneGraph) so it only needs to borrow the node map.
//!
//! Traversal is pre-order with an explicit stack: a node is finished before
//! any of its children are visited, and children are visited in insertion
//! order. Every child therefore reads its parent's *already updated* world
//! matrix.

use glam::Mat4;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::SceneNode;

/// Updates `start` and its whole subtree.
///
/// `parent_world` is the world matrix `start` composes with; pass `None` for
/// a root, whose world matrix then equals its local matrix. A child's world
/// matrix is `local * parent_world`: points go through the parent's world
/// transform first, then the child's local one.
///
/// `visit` is called once per node immediately after its world matrix has
/// been written. Returns the number of nodes updated.
pub fn update_hierarchy<F>(
    nodes: &mut SlotMap<NodeHandle, SceneNode>,
    start: NodeHandle,
    parent_world: Option<Mat4>,
    mut visit: F,
) -> usize
where
    F: FnMut(NodeHandle, &SceneNode),
{
    let mut stack: Vec<(NodeHandle, Option<Mat4>)> = vec![(start, parent_world)];
    let mut updated = 0;

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            // Stale child handle; nothing to propagate into.
            continue;
        };

        node.transform.update_local_matrix();
        let local = node.transform.local_matrix;
        let world = match parent_world {
            Some(parent) => local * parent,
            None => local,
        };
        node.transform.set_world_matrix(world);
        updated += 1;

        visit(handle, node);

        // Reverse push keeps insertion order on pop.
        for &child in node.children.iter().rev() {
            stack.push((child, Some(world)));
        }
    }

    updated
}

/// Collects `start` and its descendants in pre-order.
#[must_use]
pub fn collect_pre_order(nodes: &SlotMap<NodeHandle, SceneNode>, start: NodeHandle) -> Vec<NodeHandle> {
    let mut order = Vec::new();
    let mut stack = vec![start];

    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };
        order.push(handle);
        for &child in node.children.iter().rev() {
            stack.push(child);
        }
    }

    order
}
