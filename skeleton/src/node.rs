//! Bone nodes and their numeric identifiers.

use std::fmt;

/// Numeric node identity.
///
/// By default derived from the node name, so nodes with the same name share
/// an ID across skeletons. Comparing IDs is cheaper than comparing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Derive an ID from a node name (32-bit FNV-1a over the UTF-8 bytes).
    pub const fn from_name(name: &str) -> Self {
        const OFFSET_BASIS: u32 = 0x811c_9dc5;
        const PRIME: u32 = 0x0100_0193;

        let bytes = name.as_bytes();
        let mut hash = OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u32;
            hash = hash.wrapping_mul(PRIME);
            i += 1;
        }
        Self(hash)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A bone in a [`Skeleton`](crate::Skeleton).
///
/// Parent linkage is an index into the owning skeleton's node sequence.
/// The stored self-index mirrors the node's position; the skeleton keeps it
/// current on its own edits and [`Skeleton::reindex_from`](crate::Skeleton::reindex_from)
/// repairs it after edits made through [`Skeleton::node_mut`](crate::Skeleton::node_mut).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    id: NodeId,
    parent: Option<usize>,
    index: usize,
}

impl Node {
    /// Create a parentless node. The ID is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let id = NodeId::from_name(&name);
        Self {
            name,
            id,
            parent: None,
            index: 0,
        }
    }

    /// Set the parent index.
    #[must_use]
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Override the name-derived ID.
    #[must_use]
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the node. The ID is re-derived from the new name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.id = NodeId::from_name(&self.name);
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn set_id(&mut self, id: NodeId) {
        self.id = id;
    }

    /// Parent node index, or `None` for a root node.
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<usize>) {
        self.parent = parent;
    }

    /// Stored self-index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Returns `true` if the node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
