use crate::error::{SkeletonError, SkeletonResult};

use super::Skeleton;

impl Skeleton {
    /// Check every structural invariant.
    ///
    /// - every slot is filled and its node reports its own position,
    /// - every parent exists and precedes its child,
    /// - the root list names existing parentless nodes, once each,
    /// - every parentless node is in the root list,
    /// - the bind pose holds one transform per node.
    pub fn validate(&self) -> SkeletonResult {
        let len = self.num_nodes();
        if self.bind_pose.len() != len {
            return Err(SkeletonError::PoseSizeMismatch {
                expected: len,
                found: self.bind_pose.len(),
            });
        }

        for position in 0..len {
            let node = self.node(position)?;
            if node.index() != position {
                return Err(SkeletonError::IndexMismatch {
                    position,
                    stored: node.index(),
                });
            }
            if let Some(parent) = node.parent() {
                if parent >= len {
                    return Err(SkeletonError::ParentOutOfRange {
                        index: position,
                        parent,
                        len,
                    });
                }
                if parent >= position {
                    return Err(SkeletonError::ParentOrder {
                        index: position,
                        parent,
                    });
                }
            }
        }

        let mut registered = vec![false; len];
        for &root in &self.root_nodes {
            let node = self.node(root)?;
            if let Some(parent) = node.parent() {
                return Err(SkeletonError::NotParentless {
                    index: root,
                    parent,
                });
            }
            if registered[root] {
                return Err(SkeletonError::DuplicateRoot { index: root });
            }
            registered[root] = true;
        }

        if let Some((index, _)) = self
            .nodes()
            .find(|(index, node)| node.is_root() && !registered[*index])
        {
            return Err(SkeletonError::MissingRoot { index });
        }

        Ok(())
    }

    /// Log every node at info level: index, name, ID, parent and depth.
    pub fn log_nodes(&self) {
        const MAX_INDENT: usize = 32;

        log::info!(
            "skeleton: {} nodes, {} roots",
            self.num_nodes(),
            self.num_root_nodes()
        );
        let depths = self.node_depths();
        for (index, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else {
                log::info!("  [{index:3}] <empty>");
                continue;
            };
            let parent = node
                .parent()
                .map_or_else(|| "-".to_owned(), |p| p.to_string());
            match depths[index] {
                Some(depth) => log::info!(
                    "  [{index:3}] {:indent$}{} id={} parent={parent} depth={depth}",
                    "",
                    node.name(),
                    node.id(),
                    indent = depth.min(MAX_INDENT) * 2
                ),
                None => log::info!(
                    "  [{index:3}] {} id={} parent={parent} (no ordered path to a root)",
                    node.name(),
                    node.id()
                ),
            }
        }
    }

    /// Depth of every slot in one pass, relying on parents preceding children.
    ///
    /// `None` for empty slots and for nodes whose parent chain breaks the
    /// ordering, points outside the skeleton or passes through such a node.
    fn node_depths(&self) -> Vec<Option<usize>> {
        let mut depths: Vec<Option<usize>> = Vec::with_capacity(self.nodes.len());
        for (index, slot) in self.nodes.iter().enumerate() {
            let depth = slot.as_ref().and_then(|node| match node.parent() {
                None => Some(0),
                Some(parent) if parent < index => depths[parent].map(|d| d + 1),
                Some(_) => None,
            });
            depths.push(depth);
        }
        depths
    }
}
