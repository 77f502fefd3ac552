//! Error types for skeleton access and hierarchy validation.

use std::fmt;

/// Errors that can occur while editing a skeleton or composing its matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    /// A node index is not below the node count.
    IndexOutOfRange { index: usize, len: usize },
    /// A position is not below the root-node count.
    RootIndexOutOfRange { position: usize, len: usize },
    /// The slot exists but holds no node (grown by `resize`, not yet filled).
    EmptySlot { index: usize },
    /// A node registered as root still has a parent.
    NotParentless { index: usize, parent: usize },
    /// The node is already in the root list.
    DuplicateRoot { index: usize },
    /// A parentless node is missing from the root list.
    MissingRoot { index: usize },
    /// A parent link points past the end of the node sequence.
    ParentOutOfRange {
        index: usize,
        parent: usize,
        len: usize,
    },
    /// A parent does not precede its child in the node sequence.
    ParentOrder { index: usize, parent: usize },
    /// The parent chain starting at `index` loops.
    Cycle { index: usize },
    /// A node's stored index differs from its position.
    IndexMismatch { position: usize, stored: usize },
    /// A matrix buffer does not hold one matrix per node.
    MatrixCountMismatch { expected: usize, found: usize },
    /// A pose does not hold one transform per node.
    PoseSizeMismatch { expected: usize, found: usize },
}

impl fmt::Display for SkeletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "node index {index} out of range (node count {len})")
            }
            Self::RootIndexOutOfRange { position, len } => {
                write!(f, "root position {position} out of range (root count {len})")
            }
            Self::EmptySlot { index } => write!(f, "node slot {index} is empty"),
            Self::NotParentless { index, parent } => {
                write!(f, "node {index} has parent {parent} and cannot be a root")
            }
            Self::DuplicateRoot { index } => write!(f, "node {index} is already a root"),
            Self::MissingRoot { index } => {
                write!(f, "parentless node {index} is not registered as a root")
            }
            Self::ParentOutOfRange { index, parent, len } => {
                write!(
                    f,
                    "node {index} references parent {parent} outside the skeleton (node count {len})"
                )
            }
            Self::ParentOrder { index, parent } => {
                write!(f, "node {index} is stored before its parent {parent}")
            }
            Self::Cycle { index } => write!(f, "parent chain of node {index} contains a cycle"),
            Self::IndexMismatch { position, stored } => {
                write!(f, "node at position {position} reports index {stored}")
            }
            Self::MatrixCountMismatch { expected, found } => {
                write!(f, "expected {expected} matrices, found {found}")
            }
            Self::PoseSizeMismatch { expected, found } => {
                write!(f, "expected {expected} pose transforms, found {found}")
            }
        }
    }
}

impl std::error::Error for SkeletonError {}

/// Result type for skeleton operations.
pub type SkeletonResult<T = ()> = Result<T, SkeletonError>;
