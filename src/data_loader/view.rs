// src/data_loader/view.rs
//
// One loaded view: the unit handed to the training pipeline.

use ndarray::{Array2, Array3};

/// A single RGB-D frame with its camera and bookkeeping flags.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// H×W×3 color image.
    pub img: Array3<u8>,
    /// H×W metric depth; invalid pixels are 0.
    pub depthmap: Array2<f32>,
    /// 4×4 camera-to-world pose.
    pub camera_pose: Array2<f32>,
    /// 3×3 pinhole intrinsics.
    pub camera_intrinsics: Array2<f32>,
    pub dataset: &'static str,
    pub label: String,
    /// Unique id of this view within the sample, `"{idx}_{label}"`.
    pub instance: String,
    pub is_metric: bool,
    pub is_video: bool,
    pub quantile: f32,
    pub img_mask: bool,
    pub ray_mask: bool,
    pub camera_only: bool,
    pub depth_only: bool,
    pub single_view: bool,
    pub reset: bool,
}

impl View {
    /// (height, width) of the image.
    pub fn size(&self) -> (usize, usize) {
        let (h, w, _) = self.img.dim();
        (h, w)
    }
}
