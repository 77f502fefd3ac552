//! Skeleton Demo
//!
//! Builds a procedural rig, logs its hierarchy, validates it and prints the
//! bind-pose global matrices.

use clap::Parser;
use redlilium_demos::{procedural_rig, procedural_rig_len};
use redlilium_skeleton::{Skeleton, SkeletonResult, matrices_as_bytes};

/// Largest rig the demo will build.
const MAX_NODES: usize = 1 << 16;

#[derive(Parser, Debug)]
#[command(
    name = "skeleton_demo",
    about = "Build a procedural skeleton and print its bind-pose global matrices",
    version
)]
struct Args {
    /// Levels below the root node.
    #[arg(long, default_value = "3")]
    depth: usize,

    /// Children per node.
    #[arg(long, default_value = "2")]
    branches: usize,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    #[cfg(feature = "profiling")]
    let _tracy = redlilium_skeleton::profiling::Client::start();

    log::info!("Starting RedLilium Skeleton Demo");
    log::info!("Skeleton version: {}", redlilium_skeleton::VERSION);
    log::info!("Demos version: {}", redlilium_demos::VERSION);

    if let Err(err) = run(&args) {
        log::error!("skeleton demo failed: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> SkeletonResult {
    let expected = procedural_rig_len(args.depth, args.branches);
    if expected > MAX_NODES {
        log::warn!(
            "depth {} with {} branches gives {expected} nodes; limiting depth to 1",
            args.depth,
            args.branches
        );
    }
    let depth = if expected > MAX_NODES { 1 } else { args.depth };

    let skeleton = Skeleton::from_hierarchy(vec![procedural_rig(depth, args.branches)])?;
    skeleton.log_nodes();
    skeleton.validate()?;

    let mut globals = Vec::with_capacity(skeleton.num_nodes());
    skeleton.bind_pose_global_matrices(&mut globals)?;

    for (index, node) in skeleton.nodes() {
        let (scale, rotation, translation) = globals[index].to_scale_rotation_translation();
        let (axis, angle) = rotation.to_axis_angle();
        println!(
            "{index:4} {:<24} pos=({:7.3}, {:7.3}, {:7.3}) rot={:6.1}° about ({:.2}, {:.2}, {:.2}) scale={:.2}",
            node.name(),
            translation.x,
            translation.y,
            translation.z,
            angle.to_degrees(),
            axis.x,
            axis.y,
            axis.z,
            scale.max_element(),
        );
    }

    log::info!(
        "{} global matrices, {} bytes ready for upload",
        globals.len(),
        matrices_as_bytes(&globals).len()
    );
    Ok(())
}
