//! Geometric preprocessing applied to every loaded view.
//!
//! A [`CropResize`] turns a raw frame into one of the requested output
//! resolution while keeping the intrinsics consistent with the pixels.
//! Two implementations are provided:
//!  * `Passthrough`       – leaves the frame untouched.
//!  * `PrincipalPointCrop` – crops around the principal point, matches the
//!    output orientation to the frame, rescales (Lanczos for color, nearest
//!    for depth), then center-crops.

use image::imageops::{self, FilterType};
use ndarray::{s, Array2, Array3};
use rand::{Rng, RngCore};
use std::path::{Path, PathBuf};

use crate::config::Resolution;
use crate::data_formats::{array_to_rgb, rgb_to_array};
use crate::data_loader::dataset::DatasetError;

/// Image, depth and intrinsics of one view, kept in sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// H×W×3
    pub image: Array3<u8>,
    /// H×W
    pub depth: Array2<f32>,
    /// 3×3
    pub intrinsics: Array2<f32>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.image.dim().1
    }

    pub fn height(&self) -> usize {
        self.image.dim().0
    }

    /// Fail unless the depth map is H×W like the image. `path` names the
    /// depth source in the error.
    pub fn check_depth_matches(&self, path: &Path) -> Result<(), DatasetError> {
        let (h, w) = (self.height(), self.width());
        if self.depth.dim() != (h, w) {
            return Err(DatasetError::BadShape {
                what: "depth map",
                path: path.to_path_buf(),
                expected: format!("[{h}, {w}] (image size)"),
                actual: self.depth.shape().to_vec(),
            });
        }
        Ok(())
    }

    /// Keep the window `[left, left+width) × [top, top+height)`.
    pub fn crop(
        self,
        left: usize,
        top: usize,
        width: usize,
        height: usize,
        info: &str,
    ) -> Result<Frame, DatasetError> {
        if left + width > self.width() || top + height > self.height() {
            return Err(DatasetError::ResolutionTooLarge {
                info: info.to_string(),
                left,
                top,
                crop_width: width,
                crop_height: height,
                width: self.width(),
                height: self.height(),
            });
        }
        let image = self
            .image
            .slice(s![top..top + height, left..left + width, ..])
            .to_owned();
        let depth = self
            .depth
            .slice(s![top..top + height, left..left + width])
            .to_owned();
        let mut intrinsics = self.intrinsics;
        intrinsics[[0, 2]] -= left as f32;
        intrinsics[[1, 2]] -= top as f32;
        Ok(Frame {
            image,
            depth,
            intrinsics,
        })
    }

    /// Resample to `width`×`height` and scale the intrinsics to match.
    pub fn rescale(self, width: u32, height: u32, info: &str) -> Result<Frame, DatasetError> {
        let (h, w) = (self.height(), self.width());
        let (nw, nh) = (width as usize, height as usize);
        if (nw, nh) == (w, h) {
            return Ok(self);
        }

        let rgb = array_to_rgb(&self.image).ok_or_else(|| DatasetError::BadShape {
            what: "image",
            path: PathBuf::from(info),
            expected: "[H, W, 3]".to_string(),
            actual: self.image.shape().to_vec(),
        })?;
        let image = rgb_to_array(imageops::resize(&rgb, width, height, FilterType::Lanczos3));

        let depth = Array2::from_shape_fn((nh, nw), |(y, x)| {
            let sy = (((y as f64 + 0.5) * h as f64 / nh as f64) as usize).min(h - 1);
            let sx = (((x as f64 + 0.5) * w as f64 / nw as f64) as usize).min(w - 1);
            self.depth[[sy, sx]]
        });

        let sx = nw as f32 / w as f32;
        let sy = nh as f32 / h as f32;
        let mut intrinsics = self.intrinsics;
        intrinsics[[0, 0]] *= sx;
        intrinsics[[0, 1]] *= sx;
        intrinsics[[1, 1]] *= sy;
        // pixel centers sit at +0.5
        intrinsics[[0, 2]] = (intrinsics[[0, 2]] + 0.5) * sx - 0.5;
        intrinsics[[1, 2]] = (intrinsics[[1, 2]] + 0.5) * sy - 0.5;

        Ok(Frame {
            image,
            depth,
            intrinsics,
        })
    }
}

/// Resolution-aware crop/resize collaborator.
pub trait CropResize {
    /// Bring `frame` to `resolution`. `rng` is the caller's generator (for
    /// randomized crops), `info` labels the view in error messages.
    fn crop_resize(
        &self,
        frame: Frame,
        resolution: Resolution,
        rng: &mut dyn RngCore,
        info: &str,
    ) -> Result<Frame, DatasetError>;
}

/// Identity transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl CropResize for Passthrough {
    fn crop_resize(
        &self,
        frame: Frame,
        _resolution: Resolution,
        _rng: &mut dyn RngCore,
        _info: &str,
    ) -> Result<Frame, DatasetError> {
        Ok(frame)
    }
}

/// Crop centered on the principal point, rescale, then center-crop.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalPointCrop {
    /// When > 1, the rescale target grows by `rng.random_range(0..aug_crop)`
    /// pixels on both axes before the final crop.
    pub aug_crop: u32,
}

impl PrincipalPointCrop {
    pub fn new(aug_crop: u32) -> Self {
        Self { aug_crop }
    }
}

impl CropResize for PrincipalPointCrop {
    fn crop_resize(
        &self,
        frame: Frame,
        resolution: Resolution,
        rng: &mut dyn RngCore,
        info: &str,
    ) -> Result<Frame, DatasetError> {
        frame.check_depth_matches(Path::new(info))?;
        let (w, h) = (frame.width(), frame.height());

        // 1. largest window centered on the principal point
        let cx = frame.intrinsics[[0, 2]].round() as i64;
        let cy = frame.intrinsics[[1, 2]].round() as i64;
        let margin_x = cx.min(w as i64 - cx);
        let margin_y = cy.min(h as i64 - cy);
        if (margin_x as f64) <= w as f64 / 5.0 || (margin_y as f64) <= h as f64 / 5.0 {
            return Err(DatasetError::BadPrincipalPoint {
                info: info.to_string(),
                cx,
                cy,
                width: w,
                height: h,
            });
        }
        let frame = frame.crop(
            (cx - margin_x) as usize,
            (cy - margin_y) as usize,
            (2 * margin_x) as usize,
            (2 * margin_y) as usize,
            info,
        )?;

        // 2. portrait frames get a portrait output; near-square ones pick at random
        let resolution = orient(resolution, frame.width(), frame.height(), rng);

        // 3. rescale so both sides cover the (possibly enlarged) target
        let mut target = resolution;
        if self.aug_crop > 1 {
            let extra = rng.random_range(0..self.aug_crop);
            target.width += extra;
            target.height += extra;
        }
        let (w, h) = (frame.width() as f64, frame.height() as f64);
        let scale = (target.width as f64 / w).max(target.height as f64 / h);
        let new_w = ((w * scale).round() as u32).max(target.width);
        let new_h = ((h * scale).round() as u32).max(target.height);
        let frame = frame.rescale(new_w, new_h, info)?;

        // 4. center crop to the requested size
        let (rw, rh) = (resolution.width as usize, resolution.height as usize);
        let left = frame.width().saturating_sub(rw) / 2;
        let top = frame.height().saturating_sub(rh) / 2;
        frame.crop(left, top, rw, rh, info)
    }
}

/// Transpose `resolution` to follow the frame's orientation.
///
/// `resolution` is read as the landscape size. A frame taller than 1.1×
/// its width gets the portrait size; a frame with aspect within 10% of
/// square draws one bit from `rng` unless the resolution is square too.
pub fn orient(
    resolution: Resolution,
    width: usize,
    height: usize,
    rng: &mut dyn RngCore,
) -> Resolution {
    let landscape = Resolution::new(
        resolution.width.max(resolution.height),
        resolution.width.min(resolution.height),
    );
    let portrait = Resolution::new(landscape.height, landscape.width);
    let (w, h) = (width as f64, height as f64);
    if h > 1.1 * w {
        portrait
    } else if h / w > 0.9 && h / w < 1.1 && landscape.width != landscape.height {
        if rng.random_range(0..2u32) == 1 {
            portrait
        } else {
            landscape
        }
    } else {
        landscape
    }
}
