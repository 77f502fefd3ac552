//! Skeleton construction.
//!
//! - [`SkeletonBuilder`] - flat node list in any order, as importers produce
//!   it (glTF joints, FBX clusters). `build` reorders parents before
//!   children and rejects dangling parents and cycles.
//! - [`NodeDesc`] - a recursive tree for procedural rigs and tests.

use crate::error::{SkeletonError, SkeletonResult};
use crate::node::{Node, NodeId};
use crate::skeleton::Skeleton;
use crate::transform::Transform;

#[derive(Debug, Clone)]
struct PendingNode {
    name: String,
    id: Option<NodeId>,
    parent: Option<usize>,
    transform: Transform,
}

/// Collects nodes in source order and builds a validated [`Skeleton`].
///
/// # Example
///
/// ```
/// use redlilium_skeleton::{SkeletonBuilder, Transform};
///
/// let mut builder = SkeletonBuilder::new();
/// // Children may come before their parents.
/// let hand = builder.add_node("hand", Some(1), Transform::IDENTITY);
/// let arm = builder.add_node("arm", None, Transform::IDENTITY);
///
/// let (skeleton, remap) = builder.build_with_remap().unwrap();
/// assert_eq!(remap[arm], 0);
/// assert_eq!(remap[hand], 1);
/// assert_eq!(skeleton.node(1).unwrap().parent(), Some(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkeletonBuilder {
    nodes: Vec<PendingNode>,
}

impl SkeletonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node. `parent` refers to the source index returned by an
    /// earlier or later `add_node` call. Returns this node's source index.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        transform: Transform,
    ) -> usize {
        self.push(name.into(), None, parent, transform)
    }

    /// Add a node with an explicit ID instead of the name-derived one.
    pub fn add_node_with_id(
        &mut self,
        name: impl Into<String>,
        id: NodeId,
        parent: Option<usize>,
        transform: Transform,
    ) -> usize {
        self.push(name.into(), Some(id), parent, transform)
    }

    fn push(
        &mut self,
        name: String,
        id: Option<NodeId>,
        parent: Option<usize>,
        transform: Transform,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(PendingNode {
            name,
            id,
            parent,
            transform,
        });
        index
    }

    /// Build the skeleton. See [`build_with_remap`](Self::build_with_remap).
    pub fn build(self) -> SkeletonResult<Skeleton> {
        self.build_with_remap().map(|(skeleton, _)| skeleton)
    }

    /// Build the skeleton and return the source-index → node-index mapping.
    ///
    /// Nodes are laid out depth-first, starting from the parentless nodes in
    /// source order and visiting children in source order, so every parent
    /// precedes its children. Every parentless node becomes a root and the
    /// bind pose receives each node's transform.
    ///
    /// Errors with [`SkeletonError::ParentOutOfRange`] for a parent index
    /// past the input, and [`SkeletonError::Cycle`] for nodes whose parent
    /// chain never reaches a root (reported for the lowest such source index).
    pub fn build_with_remap(self) -> SkeletonResult<(Skeleton, Vec<usize>)> {
        crate::profile_function!();

        let len = self.nodes.len();

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= len {
                    return Err(SkeletonError::ParentOutOfRange { index, parent, len });
                }
                children[parent].push(index);
            }
        }

        let mut order = Vec::with_capacity(len);
        let mut stack = Vec::new();
        for root in (0..len).filter(|&i| self.nodes[i].parent.is_none()) {
            stack.push(root);
            while let Some(index) = stack.pop() {
                order.push(index);
                stack.extend(children[index].iter().rev());
            }
        }

        const UNVISITED: usize = usize::MAX;
        let mut remap = vec![UNVISITED; len];
        for (position, &source) in order.iter().enumerate() {
            remap[source] = position;
        }
        if let Some(index) = remap.iter().position(|&p| p == UNVISITED) {
            log::error!("skeleton import failed: node {index} is part of a parent cycle");
            return Err(SkeletonError::Cycle { index });
        }

        let mut pending: Vec<Option<PendingNode>> = self.nodes.into_iter().map(Some).collect();
        let mut skeleton = Skeleton::new();
        skeleton.reserve_nodes(len);
        for &source in &order {
            let Some(PendingNode {
                name,
                id,
                parent,
                transform,
            }) = pending[source].take()
            else {
                continue;
            };
            let mut node = Node::new(name);
            if let Some(id) = id {
                node.set_id(id);
            }
            node.set_parent(parent.map(|p| remap[p]));
            skeleton.add_node_with_bind_transform(node, transform);
        }
        let roots = skeleton.rebuild_root_nodes();

        log::debug!("built skeleton: {len} nodes, {roots} roots");
        Ok((skeleton, remap))
    }
}

/// A node in a skeleton description tree.
///
/// Mirrors how scene loaders hand over node hierarchies: each node carries
/// its bind transform and owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDesc {
    /// Node name.
    pub name: String,
    /// Explicit ID; derived from the name when `None`.
    pub id: Option<NodeId>,
    /// Bind-pose transform relative to the parent.
    pub transform: Transform,
    /// Child nodes forming the sub-tree.
    pub children: Vec<NodeDesc>,
}

impl NodeDesc {
    /// Creates a node with identity transform and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            transform: Transform::IDENTITY,
            children: Vec::new(),
        }
    }

    /// Set an explicit ID.
    #[must_use]
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the bind transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Append one child.
    #[must_use]
    pub fn with_child(mut self, child: NodeDesc) -> Self {
        self.children.push(child);
        self
    }

    /// Set the child nodes.
    #[must_use]
    pub fn with_children(mut self, children: Vec<NodeDesc>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this sub-tree, including itself.
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(desc) = stack.pop() {
            count += 1;
            stack.extend(&desc.children);
        }
        count
    }
}

impl Drop for NodeDesc {
    // Unlinks children onto a heap stack so deep chains don't recurse.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut desc) = stack.pop() {
            stack.append(&mut desc.children);
        }
    }
}

impl Skeleton {
    /// Build a skeleton from description trees, laid out pre-order.
    pub fn from_hierarchy(roots: Vec<NodeDesc>) -> SkeletonResult<Skeleton> {
        let total = roots.iter().map(NodeDesc::count).sum();
        let mut builder = SkeletonBuilder::with_capacity(total);

        // Pre-order: children are pushed reversed so the first one pops first.
        let mut stack: Vec<(NodeDesc, Option<usize>)> =
            roots.into_iter().rev().map(|root| (root, None)).collect();
        while let Some((mut desc, parent)) = stack.pop() {
            let name = std::mem::take(&mut desc.name);
            let index = builder.push(name, desc.id, parent, desc.transform);
            let children = std::mem::take(&mut desc.children);
            stack.extend(children.into_iter().rev().map(|child| (child, Some(index))));
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn empty_builder() {
        let builder = SkeletonBuilder::new();
        assert!(builder.is_empty());
        let skeleton = builder.build().unwrap();
        assert!(skeleton.is_empty());
    }

    #[test]
    fn reorders_children_after_parents() {
        let mut builder = SkeletonBuilder::new();
        let head = builder.add_node("head", Some(2), Transform::from_position(Vec3::Y));
        let hips = builder.add_node("hips", None, Transform::IDENTITY);
        let spine = builder.add_node("spine", Some(1), Transform::IDENTITY);
        assert_eq!(builder.len(), 3);

        let (skeleton, remap) = builder.build_with_remap().unwrap();
        assert_eq!(remap[hips], 0);
        assert_eq!(remap[spine], 1);
        assert_eq!(remap[head], 2);
        assert_eq!(skeleton.node(2).unwrap().name(), "head");
        assert_eq!(skeleton.node(2).unwrap().parent(), Some(1));
        assert_eq!(
            skeleton.bind_pose().local_transform(2).unwrap().position,
            Vec3::Y
        );
        assert_eq!(skeleton.root_nodes(), &[0]);
        assert_eq!(skeleton.validate(), Ok(()));
    }

    #[test]
    fn multiple_roots_keep_source_order() {
        let mut builder = SkeletonBuilder::new();
        builder.add_node("b_child", Some(2), Transform::IDENTITY);
        builder.add_node("a", None, Transform::IDENTITY);
        builder.add_node("b", None, Transform::IDENTITY);

        let skeleton = builder.build().unwrap();
        let names: Vec<_> = skeleton.nodes().map(|(_, n)| n.name().to_owned()).collect();
        assert_eq!(names, ["a", "b", "b_child"]);
        assert_eq!(skeleton.root_nodes(), &[0, 1]);
    }

    #[test]
    fn explicit_id_is_kept() {
        let mut builder = SkeletonBuilder::new();
        builder.add_node_with_id("root", NodeId(7), None, Transform::IDENTITY);
        let skeleton = builder.build().unwrap();
        assert_eq!(skeleton.node(0).unwrap().id(), NodeId(7));
    }

    #[test]
    fn dangling_parent() {
        let mut builder = SkeletonBuilder::new();
        builder.add_node("root", None, Transform::IDENTITY);
        builder.add_node("lost", Some(9), Transform::IDENTITY);
        assert_eq!(
            builder.build().err(),
            Some(SkeletonError::ParentOutOfRange {
                index: 1,
                parent: 9,
                len: 2
            })
        );
    }

    #[test]
    fn cycle() {
        let mut builder = SkeletonBuilder::new();
        builder.add_node("root", None, Transform::IDENTITY);
        builder.add_node("a", Some(2), Transform::IDENTITY);
        builder.add_node("b", Some(1), Transform::IDENTITY);
        assert_eq!(
            builder.build().err(),
            Some(SkeletonError::Cycle { index: 1 })
        );

        let mut builder = SkeletonBuilder::new();
        builder.add_node("self", Some(0), Transform::IDENTITY);
        assert_eq!(
            builder.build().err(),
            Some(SkeletonError::Cycle { index: 0 })
        );
    }

    fn deep_chain(depth: usize) -> NodeDesc {
        let mut chain = NodeDesc::new(format!("bone{}", depth - 1));
        for i in (0..depth - 1).rev() {
            chain = NodeDesc::new(format!("bone{i}")).with_child(chain);
        }
        chain
    }

    #[test]
    fn deep_chain_from_hierarchy() {
        const DEPTH: usize = 100_000;
        let chain = deep_chain(DEPTH);
        assert_eq!(chain.count(), DEPTH);

        let skeleton = Skeleton::from_hierarchy(vec![chain]).unwrap();
        assert_eq!(skeleton.num_nodes(), DEPTH);
        assert_eq!(skeleton.node(1).unwrap().name(), "bone1");
        assert_eq!(skeleton.node(DEPTH - 1).unwrap().parent(), Some(DEPTH - 2));
        assert_eq!(skeleton.root_nodes(), &[0]);

        let mut globals = Vec::new();
        skeleton.bind_pose_global_matrices(&mut globals).unwrap();
        assert_eq!(skeleton.hierarchy_depth(DEPTH - 1), Ok(DEPTH - 1));
    }

    #[test]
    fn deep_chain_drops_without_recursion() {
        let chain = deep_chain(100_000);
        drop(chain);
    }

    #[test]
    fn from_hierarchy_is_preorder() {
        let tree = NodeDesc::new("root")
            .with_children(vec![
                NodeDesc::new("a").with_child(NodeDesc::new("a1")),
                NodeDesc::new("b").with_id(NodeId(3)),
            ]);
        assert_eq!(tree.count(), 4);

        let skeleton = Skeleton::from_hierarchy(vec![tree, NodeDesc::new("prop")]).unwrap();
        let layout: Vec<_> = skeleton
            .nodes()
            .map(|(_, n)| (n.name().to_owned(), n.parent()))
            .collect();
        assert_eq!(
            layout,
            [
                ("root".to_owned(), None),
                ("a".to_owned(), Some(0)),
                ("a1".to_owned(), Some(1)),
                ("b".to_owned(), Some(0)),
                ("prop".to_owned(), None),
            ]
        );
        assert_eq!(skeleton.node(3).unwrap().id(), NodeId(3));
        assert_eq!(skeleton.root_nodes(), &[0, 4]);
        assert_eq!(skeleton.validate(), Ok(()));
    }
}
