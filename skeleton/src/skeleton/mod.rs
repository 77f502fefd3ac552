//! Skeleton storage and root-node bookkeeping.
//!
//! A [`Skeleton`] owns an ordered sequence of node slots, the list of root
//! node indices and the bind [`Pose`]. Every accessor is bounds-checked and
//! returns a [`SkeletonResult`]; lookups that may legitimately miss return
//! `Option`.
//!
//! Structural edits keep three things in step: the bind pose always holds one
//! transform per slot, node self-indices follow their positions, and the root
//! list only names parentless nodes that exist. Edits made directly through
//! [`Skeleton::node_mut`] are the caller's to reconcile, with
//! [`Skeleton::reindex_from`], [`Skeleton::rebuild_root_nodes`] and
//! [`Skeleton::validate`].
//!
//! Mutation takes `&mut self`; a skeleton shared behind `&` (or an `Arc`) can
//! be read from many threads at once.

mod diagnostics;
mod lookup;
mod matrices;

pub use lookup::NameMatch;
pub use matrices::matrices_as_bytes;

use crate::error::{SkeletonError, SkeletonResult};
use crate::node::Node;
use crate::pose::Pose;
use crate::transform::Transform;

/// Bone hierarchy with a bind pose.
///
/// Parents are expected to precede their children in the node sequence.
/// [`SkeletonBuilder`](crate::SkeletonBuilder) guarantees this on
/// construction; matrix composition and [`validate`](Self::validate) check it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skeleton {
    /// Node slots, including root nodes. A slot is `None` only between a
    /// growing [`resize`](Self::resize) and the matching [`set_node`](Self::set_node).
    nodes: Vec<Option<Node>>,
    /// Indices of root nodes.
    root_nodes: Vec<usize>,
    /// One local transform per node slot.
    bind_pose: Pose,
}

impl Skeleton {
    /// Creates an empty skeleton.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of node slots.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checked node access.
    pub fn node(&self, index: usize) -> SkeletonResult<&Node> {
        match self.nodes.get(index) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(SkeletonError::EmptySlot { index }),
            None => Err(SkeletonError::IndexOutOfRange {
                index,
                len: self.nodes.len(),
            }),
        }
    }

    /// Checked mutable node access.
    ///
    /// Changing the parent or stored index here bypasses the skeleton's
    /// bookkeeping; call [`validate`](Self::validate) afterwards.
    pub fn node_mut(&mut self, index: usize) -> SkeletonResult<&mut Node> {
        let len = self.nodes.len();
        match self.nodes.get_mut(index) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(SkeletonError::EmptySlot { index }),
            None => Err(SkeletonError::IndexOutOfRange { index, len }),
        }
    }

    /// Iterate `(index, node)` over filled slots in sequence order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|node| (index, node)))
    }

    /// Pre-allocate space for `additional` more nodes. The count is unchanged.
    pub fn reserve_nodes(&mut self, additional: usize) {
        self.nodes.reserve(additional);
        self.bind_pose.reserve(additional);
    }

    /// Append a node with an identity bind transform.
    ///
    /// The node's stored index is set to its position, which is returned.
    /// The root list is not touched; see [`add_root_node`](Self::add_root_node).
    pub fn add_node(&mut self, node: Node) -> usize {
        self.add_node_with_bind_transform(node, Transform::IDENTITY)
    }

    /// Append a node together with its bind-pose transform.
    pub fn add_node_with_bind_transform(&mut self, mut node: Node, transform: Transform) -> usize {
        let index = self.nodes.len();
        node.set_index(index);
        self.nodes.push(Some(node));
        self.bind_pose.push(transform);
        index
    }

    /// Set the number of node slots.
    ///
    /// Growing appends empty slots (to be filled with [`set_node`](Self::set_node))
    /// and identity bind transforms. Shrinking hands the trailing nodes back
    /// to the caller and forgets root entries past the new end.
    #[must_use = "nodes removed by shrinking are returned to the caller"]
    pub fn resize(&mut self, len: usize) -> Vec<Node> {
        let detached = if len < self.nodes.len() {
            self.nodes.drain(len..).flatten().collect()
        } else {
            self.nodes.resize_with(len, || None);
            Vec::new()
        };
        self.bind_pose.resize(len);
        self.root_nodes.retain(|&root| root < len);
        detached
    }

    /// Replace the node at `index`, returning the previous occupant.
    ///
    /// The new node's stored index is set to `index`. If it has a parent,
    /// `index` is dropped from the root list.
    pub fn set_node(&mut self, index: usize, mut node: Node) -> SkeletonResult<Option<Node>> {
        let len = self.nodes.len();
        let slot = self
            .nodes
            .get_mut(index)
            .ok_or(SkeletonError::IndexOutOfRange { index, len })?;
        node.set_index(index);
        let has_parent = node.parent().is_some();
        let previous = slot.replace(node);
        if has_parent {
            self.root_nodes.retain(|&root| root != index);
        }
        Ok(previous)
    }

    /// Remove and drop the node at `index`.
    ///
    /// Later nodes shift down by one. See [`detach_node`](Self::detach_node)
    /// for how the hierarchy is repaired.
    pub fn remove_node(&mut self, index: usize) -> SkeletonResult {
        self.take_slot(index).map(drop)
    }

    /// Remove the node at `index` and hand it to the caller.
    ///
    /// Later nodes shift down by one, and in the same step:
    /// - the bind transform at `index` is removed,
    /// - shifted nodes get their stored index updated,
    /// - children of the removed node are re-linked to its parent,
    /// - parent links and root entries past `index` are decremented,
    /// - the removed node leaves the root list, and children that became
    ///   parentless join it.
    pub fn detach_node(&mut self, index: usize) -> SkeletonResult<Node> {
        self.node(index)?;
        self.take_slot(index)?
            .ok_or(SkeletonError::EmptySlot { index })
    }

    /// Remove and drop every node. Clears the root list and bind pose.
    pub fn remove_all_nodes(&mut self) {
        self.nodes.clear();
        self.root_nodes.clear();
        self.bind_pose.clear();
    }

    /// Remove every node and hand them to the caller in sequence order.
    #[must_use = "detached nodes are returned to the caller"]
    pub fn detach_all_nodes(&mut self) -> Vec<Node> {
        let detached = self.nodes.drain(..).flatten().collect();
        self.root_nodes.clear();
        self.bind_pose.clear();
        detached
    }

    /// Store each node's position as its index, for positions `start..`.
    ///
    /// A `start` at or past the end is a no-op.
    pub fn reindex_from(&mut self, start: usize) {
        for (index, slot) in self.nodes.iter_mut().enumerate().skip(start) {
            if let Some(node) = slot {
                node.set_index(index);
            }
        }
    }

    fn take_slot(&mut self, index: usize) -> SkeletonResult<Option<Node>> {
        let len = self.nodes.len();
        if index >= len {
            return Err(SkeletonError::IndexOutOfRange { index, len });
        }

        let removed = self.nodes.remove(index);
        self.bind_pose.remove(index);

        let relinked_parent = removed
            .as_ref()
            .and_then(Node::parent)
            .map(|parent| if parent > index { parent - 1 } else { parent });

        self.root_nodes.retain(|&root| root != index);
        for root in &mut self.root_nodes {
            if *root > index {
                *root -= 1;
            }
        }

        for (position, slot) in self.nodes.iter_mut().enumerate() {
            let Some(node) = slot else { continue };
            match node.parent() {
                Some(parent) if parent == index => {
                    node.set_parent(relinked_parent);
                    if relinked_parent.is_none() {
                        self.root_nodes.push(position);
                    }
                }
                Some(parent) if parent > index => node.set_parent(Some(parent - 1)),
                _ => {}
            }
        }

        self.reindex_from(index);

        log::debug!(
            "removed node {index} ({}), {} nodes remain",
            removed.as_ref().map_or("<empty>", Node::name),
            self.nodes.len()
        );
        Ok(removed)
    }

    // ---- Bind pose ----

    /// The bind pose: one local transform per node index.
    pub fn bind_pose(&self) -> &Pose {
        &self.bind_pose
    }

    /// Mutable bind-pose transforms. The count cannot change through this slice.
    pub fn bind_pose_transforms_mut(&mut self) -> &mut [Transform] {
        self.bind_pose.local_transforms_mut()
    }

    /// Replace one bind-pose transform.
    pub fn set_bind_transform(&mut self, index: usize, transform: Transform) -> SkeletonResult {
        self.bind_pose.set_local_transform(index, transform)
    }

    /// Replace the whole bind pose. It must hold one transform per node.
    pub fn set_bind_pose(&mut self, pose: Pose) -> SkeletonResult {
        if pose.len() != self.nodes.len() {
            return Err(SkeletonError::PoseSizeMismatch {
                expected: self.nodes.len(),
                found: pose.len(),
            });
        }
        self.bind_pose = pose;
        Ok(())
    }

    // ---- Root nodes ----

    pub fn num_root_nodes(&self) -> usize {
        self.root_nodes.len()
    }

    /// Node index of the root at `position` in the root list.
    pub fn root_node_index(&self, position: usize) -> SkeletonResult<usize> {
        self.root_nodes
            .get(position)
            .copied()
            .ok_or(SkeletonError::RootIndexOutOfRange {
                position,
                len: self.root_nodes.len(),
            })
    }

    /// Root node indices in registration order.
    pub fn root_nodes(&self) -> &[usize] {
        &self.root_nodes
    }

    /// Pre-allocate space in the root list. The root count is unchanged.
    pub fn reserve_root_nodes(&mut self, additional: usize) {
        self.root_nodes.reserve(additional);
    }

    /// Register a node as a root.
    ///
    /// The node must exist, have no parent, and not be registered already.
    pub fn add_root_node(&mut self, node_index: usize) -> SkeletonResult {
        let node = self.node(node_index)?;
        if let Some(parent) = node.parent() {
            log::warn!("refusing to register node {node_index} with parent {parent} as root");
            return Err(SkeletonError::NotParentless {
                index: node_index,
                parent,
            });
        }
        if self.root_nodes.contains(&node_index) {
            return Err(SkeletonError::DuplicateRoot { index: node_index });
        }
        self.root_nodes.push(node_index);
        Ok(())
    }

    /// Unregister the root at `position` in the root list, returning its node
    /// index. The node itself stays in the skeleton.
    pub fn remove_root_node(&mut self, position: usize) -> SkeletonResult<usize> {
        let len = self.root_nodes.len();
        if position >= len {
            return Err(SkeletonError::RootIndexOutOfRange { position, len });
        }
        Ok(self.root_nodes.remove(position))
    }

    /// Unregister every root. The nodes themselves stay in the skeleton.
    pub fn remove_all_root_nodes(&mut self) {
        self.root_nodes.clear();
    }

    /// Rebuild the root list from parent links, in ascending node order.
    ///
    /// Returns the number of roots.
    pub fn rebuild_root_nodes(&mut self) -> usize {
        self.root_nodes.clear();
        for (index, slot) in self.nodes.iter().enumerate() {
            if slot.as_ref().is_some_and(Node::is_root) {
                self.root_nodes.push(index);
            }
        }
        self.root_nodes.len()
    }
}
