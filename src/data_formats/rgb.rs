// src/data_formats/rgb.rs
//
// Color image decoding into channel-last ndarrays, and the way back.

use image::{ImageResult, RgbImage};
use ndarray::Array3;
use std::path::Path;

/// Decode any supported image file to an H×W×3 `u8` array (RGB order).
pub fn read_rgb_image(path: &Path) -> ImageResult<Array3<u8>> {
    let rgb = image::open(path)?.into_rgb8();
    Ok(rgb_to_array(rgb))
}

pub fn rgb_to_array(rgb: RgbImage) -> Array3<u8> {
    let (w, h) = rgb.dimensions();
    Array3::from_shape_fn((h as usize, w as usize, 3), |(y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c]
    })
}

/// Inverse of [`rgb_to_array`]. Returns `None` unless the array is H×W×3.
pub fn array_to_rgb(array: &Array3<u8>) -> Option<RgbImage> {
    let (h, w, c) = array.dim();
    if c != 3 {
        return None;
    }
    let raw: Vec<u8> = array.iter().copied().collect();
    RgbImage::from_raw(w as u32, h as u32, raw)
}
