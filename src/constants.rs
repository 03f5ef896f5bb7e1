// src/constants.rs
//
// Centralized constants for the IRS loader to avoid hardcoded values throughout the codebase

/// Literal stored in every view's `dataset` field
pub const DATASET_NAME: &str = "irs";

/// Depth values above this ceiling (metres) are treated as invalid and zeroed
pub const MAX_VALID_DEPTH: f32 = 200.0;

/// Per-scene subdirectory holding the color images
pub const RGB_DIR: &str = "rgb";

/// Per-scene subdirectory holding the depth maps
pub const DEPTH_DIR: &str = "depth";

/// Per-scene subdirectory holding the camera archives
pub const CAM_DIR: &str = "cam";

/// Color image extension, including the dot
pub const RGB_EXT: &str = ".png";

/// Depth map extension, including the dot
pub const DEPTH_EXT: &str = ".npy";

/// Camera archive extension, including the dot
pub const CAM_EXT: &str = ".npz";

/// Array name looked up inside each camera archive
pub const INTRINSICS_KEY: &str = "intrinsics";

/// Default output resolution (width x height) when none is configured
pub const DEFAULT_RESOLUTION: (u32, u32) = (512, 384);

/// Environment variable names read by `DatasetConfig::from_env`
pub const ENV_ROOT: &str = "IRS_ROOT";
pub const ENV_RESOLUTIONS: &str = "IRS_RESOLUTIONS";
pub const ENV_SEED: &str = "IRS_SEED";
pub const ENV_AUG_CROP: &str = "IRS_AUG_CROP";
pub const ENV_SCENE_ORDER: &str = "IRS_SCENE_ORDER";
