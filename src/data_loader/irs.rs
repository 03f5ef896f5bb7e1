// src/data_loader/irs.rs
//
// IRS multi-view dataset: per-scene rgb / depth / cam directories, metric
// depth, no camera poses.

use ndarray::{Array2, Ix2};
use rand::RngCore;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{DatasetConfig, Resolution};
use crate::constants::{DATASET_NAME, INTRINSICS_KEY, MAX_VALID_DEPTH};
use crate::data_formats::{find_npz_array, read_npy_bytes, read_rgb_image};
use crate::data_loader::dataset::{DatasetError, MultiViewDataset};
use crate::data_loader::index::{build_index, SampleKey};
use crate::data_loader::sampler::{call_rng, Sampler, ViewSampler};
use crate::data_loader::transform::{CropResize, Frame, PrincipalPointCrop};
use crate::data_loader::view::View;

/// Zero out depth values that are non-finite or beyond [`MAX_VALID_DEPTH`].
pub fn sanitize_depth(depth: &mut Array2<f32>) {
    depth.mapv_inplace(|d| {
        if !d.is_finite() || d > MAX_VALID_DEPTH {
            0.0
        } else {
            d
        }
    });
}

/// Read-only view over an IRS root.
///
/// The key list is built once in the constructor; every `get_views` call
/// re-reads its files from disk.
#[derive(Debug, Clone)]
pub struct IrsDataset<C = PrincipalPointCrop> {
    config: DatasetConfig,
    img_names: Vec<SampleKey>,
    transform: C,
}

impl IrsDataset<PrincipalPointCrop> {
    /// Scan `config.root` and crop with [`PrincipalPointCrop`].
    pub fn new(config: DatasetConfig) -> Result<Self, DatasetError> {
        let transform = PrincipalPointCrop::new(config.aug_crop);
        Self::with_transform(config, transform)
    }
}

impl<C: CropResize> IrsDataset<C> {
    /// Scan `config.root` and use `transform` for crop/resize.
    pub fn with_transform(config: DatasetConfig, transform: C) -> Result<Self, DatasetError> {
        let img_names = build_index(&config.root, config.scene_order)?;
        Ok(Self {
            config,
            img_names,
            transform,
        })
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// All sample keys, in index order.
    pub fn keys(&self) -> &[SampleKey] {
        &self.img_names
    }

    pub fn image_count(&self) -> usize {
        self.img_names.len()
    }

    /// Decode the three files of `key`, sanitized but not yet cropped.
    pub fn load_frame(&self, key: &SampleKey) -> Result<Frame, DatasetError> {
        let root = self.root();

        let rgb_path = key.rgb_path(root);
        let image = read_rgb_image(&rgb_path).map_err(|source| DatasetError::Image {
            path: rgb_path.clone(),
            source,
        })?;

        let depth_path = key.depth_path(root);
        let mut depth = load_depth(&depth_path)?;
        sanitize_depth(&mut depth);

        let intrinsics = load_intrinsics(&key.cam_path(root))?;

        let frame = Frame {
            image,
            depth,
            intrinsics,
        };
        frame.check_depth_matches(&depth_path)?;
        Ok(frame)
    }

    fn load_view(
        &self,
        idx: usize,
        key: &SampleKey,
        resolution: Resolution,
        rng: &mut dyn RngCore,
    ) -> Result<View, DatasetError> {
        let frame = self.load_frame(key)?;
        // camera pose is not provided, placeholder
        let camera_pose = Array2::<f32>::eye(4);

        let frame = self
            .transform
            .crop_resize(frame, resolution, rng, &key.basename)?;
        debug!(
            "loaded view {} ({}x{}) for idx {}",
            key,
            frame.width(),
            frame.height(),
            idx
        );

        Ok(View {
            img: frame.image,
            depthmap: frame.depth,
            camera_pose,
            camera_intrinsics: frame.intrinsics,
            dataset: DATASET_NAME,
            label: key.basename.clone(),
            instance: format!("{}_{}", idx, key.basename),
            is_metric: true,
            is_video: false,
            quantile: 1.0,
            img_mask: true,
            ray_mask: false,
            camera_only: false,
            depth_only: false,
            single_view: true,
            reset: true,
        })
    }
}

impl<C: CropResize> MultiViewDataset for IrsDataset<C> {
    fn len(&self) -> usize {
        self.img_names.len()
    }

    fn config(&self) -> &DatasetConfig {
        &self.config
    }

    fn get_views(
        &self,
        idx: usize,
        resolution: Resolution,
        rng: &mut dyn RngCore,
        num_views: usize,
    ) -> Result<Vec<View>, DatasetError> {
        if resolution.width == 0 || resolution.height == 0 {
            return Err(DatasetError::EmptyResolution(resolution));
        }
        let mut call = call_rng(rng, idx);
        let mut sampler = ViewSampler::new(&mut call, self.img_names.len(), num_views)?;

        let mut views = Vec::with_capacity(num_views);
        while let Some(pos) = sampler.next_index() {
            let key = &self.img_names[pos];
            views.push(self.load_view(idx, key, resolution, rng)?);
        }

        assert_eq!(views.len(), num_views);
        Ok(views)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, DatasetError> {
    std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_depth(path: &Path) -> Result<Array2<f32>, DatasetError> {
    let raw = read_file(path)?;
    let depth = read_npy_bytes(&raw).map_err(|source| DatasetError::Npy {
        path: path.to_path_buf(),
        source,
    })?;
    let shape = depth.shape().to_vec();
    depth
        .into_dimensionality::<Ix2>()
        .map_err(|_| bad_shape("depth map", path, "[H, W]", shape))
}

fn load_intrinsics(path: &Path) -> Result<Array2<f32>, DatasetError> {
    let raw = read_file(path)?;
    let k = find_npz_array(&raw, INTRINSICS_KEY)
        .map_err(|reason| DatasetError::Archive {
            path: path.to_path_buf(),
            reason,
        })?
        .ok_or_else(|| DatasetError::MissingArray {
            path: path.to_path_buf(),
            name: INTRINSICS_KEY.to_string(),
        })?;
    if k.shape() != [3, 3] {
        return Err(bad_shape("intrinsics", path, "[3, 3]", k.shape().to_vec()));
    }
    Ok(k.into_dimensionality::<Ix2>().map_err(anyhow::Error::from)?)
}

fn bad_shape(what: &'static str, path: &Path, expected: &str, actual: Vec<usize>) -> DatasetError {
    DatasetError::BadShape {
        what,
        path: PathBuf::from(path),
        expected: expected.to_string(),
        actual,
    }
}
