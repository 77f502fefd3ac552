//! # RedLilium Skeleton Demos
//!
//! Demo programs showcasing the skeleton core.
//!
//! ## Available Demos
//!
//! - `skeleton_demo` - Builds a procedural rig, logs its hierarchy and prints
//!   bind-pose global matrices

use glam::{Quat, Vec3};
use redlilium_skeleton::{NodeDesc, Transform};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Procedural rig: a root with `depth` levels of `branches` children each.
///
/// Children are named after their parent with a `.k` suffix, sit one bone
/// length above it and fan out around the Z axis.
pub fn procedural_rig(depth: usize, branches: usize) -> NodeDesc {
    struct Frame {
        desc: NodeDesc,
        remaining: usize,
        next_child: usize,
    }

    let mut stack = vec![Frame {
        desc: NodeDesc::new("root"),
        remaining: depth,
        next_child: 0,
    }];
    let mut rig = None;
    while let Some(mut frame) = stack.pop() {
        if frame.remaining > 0 && frame.next_child < branches {
            let k = frame.next_child;
            frame.next_child += 1;
            let child = Frame {
                desc: NodeDesc::new(format!("{}.{k}", frame.desc.name))
                    .with_transform(branch_transform(k, branches)),
                remaining: frame.remaining - 1,
                next_child: 0,
            };
            stack.push(frame);
            stack.push(child);
            continue;
        }

        match stack.last_mut() {
            Some(parent) => parent.desc.children.push(frame.desc),
            None => rig = Some(frame.desc),
        }
    }
    rig.unwrap_or_else(|| NodeDesc::new("root"))
}

fn branch_transform(k: usize, branches: usize) -> Transform {
    let spread = std::f32::consts::FRAC_PI_4;
    let angle = if branches > 1 {
        spread * (k as f32 / (branches - 1) as f32 - 0.5)
    } else {
        0.0
    };
    Transform::new(Vec3::Y, Quat::from_rotation_z(angle), Vec3::ONE)
}

/// Node count of [`procedural_rig`] without building it, saturating at
/// `usize::MAX`.
pub fn procedural_rig_len(depth: usize, branches: usize) -> usize {
    match branches {
        0 => 1,
        1 => depth.saturating_add(1),
        _ => {
            let mut total = 0usize;
            let mut level_len = 1usize;
            for _ in 0..=depth {
                total = total.saturating_add(level_len);
                if total == usize::MAX {
                    break;
                }
                level_len = level_len.saturating_mul(branches);
            }
            total
        }
    }
}
