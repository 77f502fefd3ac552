//! # RedLilium Skeleton
//!
//! Skeleton hierarchy for character animation: an ordered set of bone
//! [`Node`]s, the root-node list, the bind [`Pose`], and the routines that
//! turn per-bone local transforms into global matrices every frame.
//!
//! - [`Skeleton`] - node storage, lookup, root bookkeeping, matrix composition
//! - [`SkeletonBuilder`] / [`NodeDesc`] - validated construction for importers
//!   and procedural rigs
//! - [`Transform`] / [`Pose`] - per-bone local transforms
//! - [`SkeletonError`] - checked-access and hierarchy errors
//!
//! # Example
//!
//! ```
//! use redlilium_skeleton::{NodeDesc, Skeleton, Transform};
//! use glam::{Mat4, Vec3};
//!
//! let skeleton = Skeleton::from_hierarchy(vec![
//!     NodeDesc::new("hips")
//!         .with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)))
//!         .with_child(
//!             NodeDesc::new("spine")
//!                 .with_transform(Transform::from_position(Vec3::new(0.0, 0.5, 0.0))),
//!         ),
//! ])
//! .unwrap();
//!
//! let mut globals: Vec<Mat4> = Vec::new();
//! skeleton.bind_pose_global_matrices(&mut globals).unwrap();
//! assert_eq!(globals.len(), 2);
//! assert!((globals[1].w_axis.truncate() - Vec3::new(0.0, 1.5, 0.0)).length() < 1e-6);
//! ```

pub mod builder;
pub mod error;
pub mod node;
pub mod pose;
pub mod profiling;
pub mod skeleton;
pub mod transform;

pub use builder::{NodeDesc, SkeletonBuilder};
pub use error::{SkeletonError, SkeletonResult};
pub use node::{Node, NodeId};
pub use pose::Pose;
pub use skeleton::{NameMatch, Skeleton, matrices_as_bytes};
pub use transform::Transform;

/// Skeleton library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
