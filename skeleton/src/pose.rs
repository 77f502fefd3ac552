//! Per-node local transforms.

use crate::error::{SkeletonError, SkeletonResult};
use crate::transform::Transform;

/// A set of local transforms, one per node index.
///
/// The skeleton's bind pose is one instance; animation instances hold their
/// own. A skeleton keeps its bind pose sized to its node count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    transforms: Vec<Transform>,
}

impl Pose {
    /// Creates an empty pose.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pose of `len` identity transforms.
    pub fn with_len(len: usize) -> Self {
        Self {
            transforms: vec![Transform::IDENTITY; len],
        }
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Local transform of a node.
    pub fn local_transform(&self, index: usize) -> SkeletonResult<&Transform> {
        let len = self.transforms.len();
        self.transforms
            .get(index)
            .ok_or(SkeletonError::IndexOutOfRange { index, len })
    }

    /// Replace the local transform of a node.
    pub fn set_local_transform(&mut self, index: usize, transform: Transform) -> SkeletonResult {
        let len = self.transforms.len();
        let slot = self
            .transforms
            .get_mut(index)
            .ok_or(SkeletonError::IndexOutOfRange { index, len })?;
        *slot = transform;
        Ok(())
    }

    /// All local transforms in node order.
    pub fn local_transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn local_transforms_mut(&mut self) -> &mut [Transform] {
        &mut self.transforms
    }

    /// Resize, filling new entries with identity transforms.
    pub fn resize(&mut self, len: usize) {
        self.transforms.resize(len, Transform::IDENTITY);
    }

    pub fn reserve(&mut self, additional: usize) {
        self.transforms.reserve(additional);
    }

    pub(crate) fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Transform {
        self.transforms.remove(index)
    }

    pub(crate) fn clear(&mut self) {
        self.transforms.clear();
    }
}

impl From<Vec<Transform>> for Pose {
    fn from(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }
}
