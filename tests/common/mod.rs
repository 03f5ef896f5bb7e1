// tests/common/mod.rs
//
// On-disk IRS fixtures shared by the integration tests.

#![allow(dead_code)]

use anyhow::Result;
use image::{Rgb, RgbImage};
use ndarray::{arr2, Array2};
use ndarray_npy::WriteNpyExt;
use std::fs::{self, File};
use std::path::Path;
use tempfile::TempDir;

use irs_views::data_formats::build_multi_npz;

/// Pinhole intrinsics with the principal point at the image center.
pub fn centered_intrinsics(width: usize, height: usize) -> Array2<f32> {
    arr2(&[
        [100.0, 0.0, width as f32 / 2.0],
        [0.0, 100.0, height as f32 / 2.0],
        [0.0, 0.0, 1.0],
    ])
}

/// Depth ramp with every value well inside the valid range.
pub fn ramp_depth(width: usize, height: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(y, x)| 1.0 + (y * width + x) as f32 * 0.01)
}

fn scene_dirs(root: &Path, scene: &str) -> Result<()> {
    for sub in ["rgb", "depth", "cam"] {
        fs::create_dir_all(root.join(scene).join(sub))?;
    }
    Ok(())
}

pub fn write_rgb(root: &Path, scene: &str, basename: &str, width: u32, height: u32) -> Result<()> {
    scene_dirs(root, scene)?;
    let seed = basename.bytes().fold(0u8, |a, b| a.wrapping_add(b));
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([seed, (x % 256) as u8, (y % 256) as u8])
    });
    img.save(root.join(scene).join("rgb").join(format!("{basename}.png")))?;
    Ok(())
}

pub fn write_depth(root: &Path, scene: &str, basename: &str, depth: &Array2<f32>) -> Result<()> {
    scene_dirs(root, scene)?;
    let file = File::create(root.join(scene).join("depth").join(format!("{basename}.npy")))?;
    depth.write_npy(file)?;
    Ok(())
}

pub fn write_cam(root: &Path, scene: &str, basename: &str, intrinsics: &Array2<f32>) -> Result<()> {
    scene_dirs(root, scene)?;
    let k = intrinsics.clone().into_dyn();
    let npz = build_multi_npz([("intrinsics", &k)])?;
    fs::write(root.join(scene).join("cam").join(format!("{basename}.npz")), &npz)?;
    Ok(())
}

/// One complete frame: png + npy + npz.
pub fn write_frame(root: &Path, scene: &str, basename: &str, width: usize, height: usize) -> Result<()> {
    write_rgb(root, scene, basename, width as u32, height as u32)?;
    write_depth(root, scene, basename, &ramp_depth(width, height))?;
    write_cam(root, scene, basename, &centered_intrinsics(width, height))?;
    Ok(())
}

/// A temporary root holding `scenes`, every frame `width`×`height`.
pub fn build_root(scenes: &[(&str, &[&str])], width: usize, height: usize) -> Result<TempDir> {
    let dir = tempfile::tempdir()?;
    for (scene, basenames) in scenes {
        for basename in *basenames {
            write_frame(dir.path(), scene, basename, width, height)?;
        }
    }
    Ok(dir)
}

/// Basenames `"0000"`, `"0001"`, ...
pub fn numbered(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{i:04}")).collect()
}
