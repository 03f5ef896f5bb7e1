pub mod rgb;
pub mod npz;

pub use rgb::{array_to_rgb, read_rgb_image, rgb_to_array};
pub use npz::{
    array_to_npy_bytes, build_multi_npz, find_npz_array, list_npz_arrays, read_npy_bytes,
    read_npz_array,
};
