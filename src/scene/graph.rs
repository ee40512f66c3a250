use std::fmt::Write as _;

use slotmap::SlotMap;

use crate::errors::{LanternError, Result};
use crate::render::context::DrawContext;
use crate::renderables::Resources;
use crate::renderables::registry::{RenderableKey, ShaderKey};
use crate::scene::NodeHandle;
use crate::scene::node::SceneNode;
use crate::scene::transform_system;

/// Counters reported by [`SceneGraph::draw`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Nodes reached by the traversal.
    pub visited: usize,
    /// Nodes whose renderable was drawn.
    pub drawn: usize,
    /// Nodes with an attachment that no longer resolves.
    pub skipped: usize,
}

/// A tree of [`SceneNode`]s stored in an arena.
///
/// The graph owns every node. Parent and child links are plain handles into
/// the same arena, so there is exactly one owner per node and no reference
/// cycles. The root is created with the graph and lives as long as it does.
pub struct SceneGraph {
    nodes: SlotMap<NodeHandle, SceneNode>,
    root: NodeHandle,
}

impl SceneGraph {
    /// Creates a graph containing only a root node named `"Root"`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_name("Root")
    }

    #[must_use]
    pub fn with_root_name(name: impl Into<String>) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(name));
        Self { nodes, root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Number of nodes, detached ones included.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always holds its root, so this is never true.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Creates a detached node. It is not updated or drawn until it is
    /// attached somewhere below the root with [`add_child`](Self::add_child).
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeHandle {
        self.nodes.insert(SceneNode::new(name))
    }

    /// Creates a node and attaches it under `parent` in one step.
    pub fn create_child(&mut self, parent: NodeHandle, name: impl Into<String>) -> Result<NodeHandle> {
        if !self.nodes.contains_key(parent) {
            return Err(LanternError::NodeNotFound(parent));
        }
        let child = self.create_node(name);
        self.add_child(parent, child)?;
        Ok(child)
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(SceneNode::parent)
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        match self.nodes.get(handle) {
            Some(node) => node.children(),
            None => &[],
        }
    }

    /// First node in pre-order (from the root) with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        transform_system::collect_pre_order(&self.nodes, self.root)
            .into_iter()
            .find(|&h| self.nodes[h].name == name)
    }

    /// Appends `child` to `parent`'s children and sets its parent link.
    ///
    /// A child that already has a different parent is detached from it first.
    /// Attaching a node to itself or to one of its own descendants is refused
    /// with [`LanternError::HierarchyCycle`]; the root cannot become a child.
    pub fn add_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(LanternError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(LanternError::NodeNotFound(child));
        }
        if child == self.root {
            log::warn!("Refusing to attach the scene root under another node");
            return Err(LanternError::RootModification);
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!(
                "Refusing to attach '{}' under '{}': it would become its own ancestor",
                self.nodes[child].name,
                self.nodes[parent].name
            );
            return Err(LanternError::HierarchyCycle { parent, child });
        }

        if let Some(old_parent) = self.nodes[child].parent {
            if old_parent == parent {
                return Ok(());
            }
            if let Some(old) = self.nodes.get_mut(old_parent) {
                old.children.retain(|&c| c != child);
            }
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Detaches `handle` from its parent; the subtree stays alive, detached.
    pub fn detach(&mut self, handle: NodeHandle) -> Result<()> {
        if handle == self.root {
            return Err(LanternError::RootModification);
        }
        let node = self.nodes.get_mut(handle).ok_or(LanternError::NodeNotFound(handle))?;
        if let Some(parent) = node.parent.take()
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|&c| c != handle);
        }
        Ok(())
    }

    /// Removes a node together with its whole subtree.
    ///
    /// Returns the number of nodes removed.
    pub fn remove_node(&mut self, handle: NodeHandle) -> Result<usize> {
        self.detach(handle)?;
        let subtree = transform_system::collect_pre_order(&self.nodes, handle);
        for h in &subtree {
            self.nodes.remove(*h);
        }
        Ok(subtree.len())
    }

    /// Attaches a renderable and shader to `node`, replacing any previous one.
    pub fn set_renderable(&mut self, node: NodeHandle, renderable: RenderableKey, shader: ShaderKey) -> Result<()> {
        self.nodes
            .get_mut(node)
            .ok_or(LanternError::NodeNotFound(node))?
            .set_renderable(renderable, shader);
        Ok(())
    }

    /// True if `ancestor` is `node` or lies on `node`'s parent chain.
    fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Recomputes local and world transforms for every node under the root.
    ///
    /// `dt` is the frame time in seconds. Transforms do not depend on it; it
    /// is accepted so per-frame callers have one entry point.
    pub fn update(&mut self, dt: f64) {
        self.update_with(dt, |_, _| {});
    }

    /// Like [`update`](Self::update), calling `visit` for every node right
    /// after its world transform is written, in traversal order.
    pub fn update_with<F>(&mut self, dt: f64, visit: F)
    where
        F: FnMut(NodeHandle, &SceneNode),
    {
        let count = transform_system::update_hierarchy(&mut self.nodes, self.root, None, visit);
        log::trace!("Scene update: {count} nodes, dt = {dt:.4}s");
    }

    /// Updates a single subtree against its parent's cached world matrix.
    ///
    /// Cheaper than a full update when only one branch changed and its
    /// ancestors are already current.
    pub fn update_subtree(&mut self, handle: NodeHandle) -> Result<()> {
        let node = self.nodes.get(handle).ok_or(LanternError::NodeNotFound(handle))?;
        let parent_world = node
            .parent
            .and_then(|p| self.nodes.get(p))
            .map(SceneNode::world_matrix);
        transform_system::update_hierarchy(&mut self.nodes, handle, parent_world, |_, _| {});
        Ok(())
    }

    /// Draws every attached renderable under the root, parents first.
    ///
    /// A node whose renderable or shader no longer resolves in `resources`
    /// skips its own draw; its children are still visited.
    pub fn draw(&self, ctx: &mut DrawContext<'_>, resources: &Resources) -> DrawStats {
        let mut stats = DrawStats::default();
        let mut stack = vec![self.root];

        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            stats.visited += 1;

            if let Some(attachment) = node.attachment {
                let renderable = resources.renderable(attachment.renderable);
                let shader = resources.shader(attachment.shader).filter(|s| s.is_ready());
                match (renderable, shader) {
                    (Some(renderable), Some(shader)) => {
                        renderable.draw(ctx, shader, &node.world_matrix());
                        stats.drawn += 1;
                    }
                    _ => {
                        log::trace!("Node '{}' has a dangling attachment, skipping draw", node.name);
                        stats.skipped += 1;
                    }
                }
            }

            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }

        stats
    }

    /// Calls `f` for each node under the root in pre-order.
    pub fn traverse<F>(&self, mut f: F)
    where
        F: FnMut(NodeHandle, &SceneNode),
    {
        for handle in transform_system::collect_pre_order(&self.nodes, self.root) {
            f(handle, &self.nodes[handle]);
        }
    }

    /// Node handles under the root in pre-order.
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeHandle> {
        transform_system::collect_pre_order(&self.nodes, self.root)
    }

    /// Indented dump of the tree with local and world translations.
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];

        while let Some((handle, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            let local = node.local_translation();
            let world = node.world_translation();
            let drawable = if node.attachment.is_some() { " [drawable]" } else { "" };
            let _ = writeln!(
                out,
                "{:indent$}{}{} local=({:.3}, {:.3}, {:.3}) world=({:.3}, {:.3}, {:.3})",
                "",
                node.name,
                drawable,
                local.x,
                local.y,
                local.z,
                world.x,
                world.y,
                world.z,
                indent = depth * 2
            );
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        out
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
