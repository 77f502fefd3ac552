//! Local and global bone matrices.
//!
//! Composition walks nodes in ascending index order and relies on parents
//! preceding their children, so one pass suffices:
//!
//! ```text
//! global[i] = local[i]                      (root)
//! global[i] = global[parent(i)] * local[i]  (child)
//! ```
//!
//! Each step checks `parent(i) < i`. That check also rules out cycles, since
//! every cycle contains at least one link that points forward.

use glam::Mat4;

use crate::error::{SkeletonError, SkeletonResult};
use crate::transform::Transform;

use super::Skeleton;

impl Skeleton {
    /// Local matrix of one node from a set of per-node transforms.
    ///
    /// Independent of the hierarchy. `transforms` is indexed by node index,
    /// e.g. [`Pose::local_transforms`](crate::Pose::local_transforms).
    pub fn local_matrix(&self, node_index: usize, transforms: &[Transform]) -> SkeletonResult<Mat4> {
        let len = self.num_nodes();
        if node_index >= len {
            return Err(SkeletonError::IndexOutOfRange {
                index: node_index,
                len,
            });
        }
        transforms
            .get(node_index)
            .map(Transform::to_matrix)
            .ok_or(SkeletonError::IndexOutOfRange {
                index: node_index,
                len: transforms.len(),
            })
    }

    /// Local matrices of the bind pose, one per node index.
    ///
    /// `out` is cleared and refilled; its allocation is reused.
    pub fn bind_pose_local_matrices(&self, out: &mut Vec<Mat4>) {
        out.clear();
        out.extend(
            self.bind_pose
                .local_transforms()
                .iter()
                .map(Transform::to_matrix),
        );
    }

    /// Compose global matrices from local ones.
    ///
    /// `local` must hold one matrix per node. `out` is cleared and refilled;
    /// once it has capacity for every node no allocation happens.
    ///
    /// On error `out` holds partial results and must not be used.
    pub fn global_matrices(&self, local: &[Mat4], out: &mut Vec<Mat4>) -> SkeletonResult {
        self.check_matrix_count(local.len())?;
        out.clear();
        out.extend_from_slice(local);
        self.compose_in_place(out)
    }

    /// Compose global matrices over a buffer of local matrices, in place.
    pub fn global_matrices_in_place(&self, matrices: &mut [Mat4]) -> SkeletonResult {
        self.check_matrix_count(matrices.len())?;
        self.compose_in_place(matrices)
    }

    /// Global matrices of the bind pose.
    ///
    /// Same result as [`bind_pose_local_matrices`](Self::bind_pose_local_matrices)
    /// followed by [`global_matrices`](Self::global_matrices), without the
    /// intermediate buffer.
    pub fn bind_pose_global_matrices(&self, out: &mut Vec<Mat4>) -> SkeletonResult {
        self.bind_pose_local_matrices(out);
        self.compose_in_place(out)
    }

    /// Number of parent hops from `node_index` up to a parentless node.
    ///
    /// Roots have depth 0. A chain longer than the node count can only be a
    /// cycle and is reported as [`SkeletonError::Cycle`].
    pub fn hierarchy_depth(&self, node_index: usize) -> SkeletonResult<usize> {
        let len = self.num_nodes();
        let mut index = node_index;
        let mut node = self.node(index)?;
        let mut depth = 0;

        while let Some(parent) = node.parent() {
            if parent >= len {
                return Err(SkeletonError::ParentOutOfRange { index, parent, len });
            }
            depth += 1;
            if depth >= len {
                log::error!("parent chain of node {node_index} loops");
                return Err(SkeletonError::Cycle { index: node_index });
            }
            index = parent;
            node = self.node(index)?;
        }

        Ok(depth)
    }

    fn check_matrix_count(&self, found: usize) -> SkeletonResult {
        let expected = self.num_nodes();
        if found != expected {
            return Err(SkeletonError::MatrixCountMismatch { expected, found });
        }
        Ok(())
    }

    fn compose_in_place(&self, matrices: &mut [Mat4]) -> SkeletonResult {
        crate::profile_scope!("skeleton_global_matrices");

        let len = self.num_nodes();
        crate::profile_plot!("skeleton_nodes", len);
        debug_assert_eq!(matrices.len(), len);

        for index in 0..len {
            let Some(parent) = self.node(index)?.parent() else {
                continue;
            };
            if parent >= index {
                let err = if parent >= len {
                    SkeletonError::ParentOutOfRange { index, parent, len }
                } else {
                    SkeletonError::ParentOrder { index, parent }
                };
                log::error!("global matrix composition aborted: {err}");
                return Err(err);
            }
            matrices[index] = matrices[parent] * matrices[index];
        }

        Ok(())
    }
}

/// View matrices as raw bytes, e.g. for uploading globals to a skinning buffer.
pub fn matrices_as_bytes(matrices: &[Mat4]) -> &[u8] {
    bytemuck::cast_slice(matrices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use glam::{Quat, Vec3};
    use rstest::rstest;
    use std::f32::consts::FRAC_PI_2;

    fn chain(len: usize) -> Skeleton {
        let mut skeleton = Skeleton::new();
        for i in 0..len {
            let mut node = Node::new(format!("bone{i}"));
            node.set_parent(i.checked_sub(1));
            skeleton.add_node_with_bind_transform(
                node,
                Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
            );
        }
        skeleton.rebuild_root_nodes();
        skeleton
    }

    #[test]
    fn single_root_global_equals_local() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("root"));
        let local = [Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_x(0.4),
            Vec3::splat(2.0),
        )
        .to_matrix()];

        let mut globals = Vec::new();
        skeleton.global_matrices(&local, &mut globals).unwrap();
        assert_eq!(globals, local);
    }

    #[test]
    fn child_composes_with_parent() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("root"));
        skeleton.add_node(Node::new("child").with_parent(0));
        let local = [
            Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)).to_matrix(),
            Transform::from_position(Vec3::new(0.0, 0.0, 1.0)).to_matrix(),
        ];

        let mut globals = Vec::new();
        skeleton.global_matrices(&local, &mut globals).unwrap();
        assert_eq!(globals[1], globals[0] * local[1]);
        // Parent 90° Y rotation turns child's +Z into +X
        assert!((globals[1].w_axis.truncate() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn chain_accumulates_translation() {
        let skeleton = chain(4);
        let mut globals = Vec::new();
        skeleton.bind_pose_global_matrices(&mut globals).unwrap();
        for (i, global) in globals.iter().enumerate() {
            let expected = Vec3::new(0.0, (i + 1) as f32, 0.0);
            assert!((global.w_axis.truncate() - expected).length() < 1e-6);
        }
    }

    #[test]
    fn bind_pose_globals_match_two_step() {
        let mut skeleton = chain(5);
        skeleton
            .set_bind_transform(
                2,
                Transform::new(Vec3::X, Quat::from_rotation_z(0.7), Vec3::new(1.0, 2.0, 1.0))
                    .with_scale_rotation(Quat::from_rotation_x(0.3)),
            )
            .unwrap();

        let mut fused = Vec::new();
        skeleton.bind_pose_global_matrices(&mut fused).unwrap();

        let mut locals = Vec::new();
        skeleton.bind_pose_local_matrices(&mut locals);
        let mut two_step = Vec::new();
        skeleton.global_matrices(&locals, &mut two_step).unwrap();

        assert_eq!(fused, two_step);
    }

    #[test]
    fn local_matrix_checks_both_ranges() {
        let skeleton = chain(2);
        let transforms = skeleton.bind_pose().local_transforms();
        assert_eq!(
            skeleton.local_matrix(1, transforms),
            Ok(Transform::from_position(Vec3::Y).to_matrix())
        );
        assert_eq!(
            skeleton.local_matrix(2, transforms),
            Err(SkeletonError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            skeleton.local_matrix(1, &transforms[..1]),
            Err(SkeletonError::IndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn matrix_count_mismatch() {
        let skeleton = chain(3);
        let mut out = Vec::new();
        assert_eq!(
            skeleton.global_matrices(&[Mat4::IDENTITY; 2], &mut out),
            Err(SkeletonError::MatrixCountMismatch {
                expected: 3,
                found: 2
            })
        );
        let mut buffer = [Mat4::IDENTITY; 4];
        assert!(skeleton.global_matrices_in_place(&mut buffer).is_err());
    }

    #[test]
    fn in_place_matches_buffered() {
        let skeleton = chain(3);
        let mut locals = Vec::new();
        skeleton.bind_pose_local_matrices(&mut locals);

        let mut buffered = Vec::new();
        skeleton.global_matrices(&locals, &mut buffered).unwrap();
        skeleton.global_matrices_in_place(&mut locals).unwrap();
        assert_eq!(locals, buffered);
    }

    #[test]
    fn out_buffer_is_reused() {
        let skeleton = chain(8);
        let mut globals = Vec::with_capacity(8);
        let ptr = globals.as_ptr();
        for _ in 0..3 {
            skeleton.bind_pose_global_matrices(&mut globals).unwrap();
        }
        assert_eq!(globals.len(), 8);
        assert_eq!(globals.as_ptr(), ptr);
    }

    #[test]
    fn forward_parent_is_rejected() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("child").with_parent(1));
        skeleton.add_node(Node::new("parent"));
        let mut out = Vec::new();
        assert_eq!(
            skeleton.bind_pose_global_matrices(&mut out),
            Err(SkeletonError::ParentOrder {
                index: 0,
                parent: 1
            })
        );
    }

    #[test]
    fn cycle_is_rejected_by_composition() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("a").with_parent(1));
        skeleton.add_node(Node::new("b").with_parent(0));
        let mut out = Vec::new();
        assert!(matches!(
            skeleton.bind_pose_global_matrices(&mut out),
            Err(SkeletonError::ParentOrder { index: 0, parent: 1 })
        ));
    }

    #[test]
    fn dangling_parent_is_rejected() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("a").with_parent(5));
        let mut out = Vec::new();
        assert_eq!(
            skeleton.bind_pose_global_matrices(&mut out),
            Err(SkeletonError::ParentOutOfRange {
                index: 0,
                parent: 5,
                len: 1
            })
        );
        assert_eq!(
            skeleton.hierarchy_depth(0),
            Err(SkeletonError::ParentOutOfRange {
                index: 0,
                parent: 5,
                len: 1
            })
        );
    }

    #[test]
    fn empty_slot_is_rejected() {
        let mut skeleton = chain(2);
        let _ = skeleton.resize(3);
        let mut out = Vec::new();
        assert_eq!(
            skeleton.bind_pose_global_matrices(&mut out),
            Err(SkeletonError::EmptySlot { index: 2 })
        );
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(4, 4)]
    #[case(9, 9)]
    fn depth_along_chain(#[case] node: usize, #[case] expected: usize) {
        let skeleton = chain(10);
        assert_eq!(skeleton.hierarchy_depth(node), Ok(expected));
    }

    #[test]
    fn depth_of_every_root_is_zero() {
        let mut skeleton = chain(3);
        let extra = skeleton.add_node(Node::new("prop"));
        skeleton.add_root_node(extra).unwrap();
        for &root in skeleton.root_nodes() {
            assert_eq!(skeleton.hierarchy_depth(root), Ok(0));
        }
    }

    #[test]
    fn depth_detects_cycles() {
        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("a").with_parent(2));
        skeleton.add_node(Node::new("b").with_parent(0));
        skeleton.add_node(Node::new("c").with_parent(1));
        assert_eq!(
            skeleton.hierarchy_depth(1),
            Err(SkeletonError::Cycle { index: 1 })
        );

        let mut skeleton = Skeleton::new();
        skeleton.add_node(Node::new("self").with_parent(0));
        assert_eq!(
            skeleton.hierarchy_depth(0),
            Err(SkeletonError::Cycle { index: 0 })
        );
    }

    #[test]
    fn depth_out_of_range() {
        let skeleton = chain(2);
        assert_eq!(
            skeleton.hierarchy_depth(2),
            Err(SkeletonError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn bytes_view() {
        let matrices = [Mat4::IDENTITY; 3];
        let bytes = matrices_as_bytes(&matrices);
        assert_eq!(bytes.len(), 3 * 64);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
    }
}
