//! Core dataset abstractions for the multi-view loader.
//!
//! A multi-view dataset answers one question: given a sample index, an
//! output resolution and a random generator, which `num_views` views go
//! together?  Implementors supply [`MultiViewDataset::get_views`]; the
//! provided [`MultiViewDataset::get_item`] adds the usual entry-point
//! bookkeeping (resolution choice and generator seeding).

use anyhow::Error as AnyError;
use ndarray_npy::ReadNpyError;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::path::PathBuf;
use thiserror::Error;
use tracing::trace;

use crate::config::{DatasetConfig, Resolution};
use crate::data_loader::view::View;

/// Item‑level error type for dataset & loader operations.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("index out of range: {index} (dataset has {len} samples)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file name is not valid UTF-8: {}", .0.display())]
    InvalidName(PathBuf),

    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode npy {}: {source}", path.display())]
    Npy {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },

    #[error("bad npz archive {}: {reason:#}", path.display())]
    Archive { path: PathBuf, reason: AnyError },

    #[error("array {name} missing from {}", path.display())]
    MissingArray { path: PathBuf, name: String },

    #[error("{what} in {} has shape {actual:?}, expected {expected}", path.display())]
    BadShape {
        what: &'static str,
        path: PathBuf,
        expected: String,
        actual: Vec<usize>,
    },

    #[error("cannot draw {requested} distinct views from {available} samples")]
    NotEnoughSamples { requested: usize, available: usize },

    #[error("resolution index {index} out of range ({available} configured)")]
    ResolutionOutOfRange { index: usize, available: usize },

    #[error("output resolution {0} has a zero side")]
    EmptyResolution(Resolution),

    #[error("bad principal point ({cx}, {cy}) for {width}x{height} image in view={info}")]
    BadPrincipalPoint {
        info: String,
        cx: i64,
        cy: i64,
        width: usize,
        height: usize,
    },

    #[error("crop {crop_width}x{crop_height}+{left}+{top} exceeds {width}x{height} image in view={info}")]
    ResolutionTooLarge {
        info: String,
        left: usize,
        top: usize,
        crop_width: usize,
        crop_height: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Backend(#[from] AnyError),
}

/// A scene-based collection of posed (or unposed) RGB-D frames from which
/// multi-view training samples are drawn.
pub trait MultiViewDataset {
    /// Number of addressable samples (one per frame, not per scene).
    fn len(&self) -> usize;

    fn config(&self) -> &DatasetConfig;

    /// Draw and load exactly `num_views` views for sample `idx`.
    ///
    /// `rng` is the caller's generator: implementations may advance it and
    /// must pass it on to any randomized cropping.
    fn get_views(
        &self,
        idx: usize,
        resolution: Resolution,
        rng: &mut dyn RngCore,
        num_views: usize,
    ) -> Result<Vec<View>, DatasetError>;

    /// Convenience helper.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map-style entry point.
    ///
    /// Picks `config().resolutions[ar_idx]`, seeds a generator from
    /// `config().seed + idx` (or OS entropy when no seed is configured) and
    /// delegates to [`MultiViewDataset::get_views`].
    fn get_item(
        &self,
        idx: usize,
        ar_idx: usize,
        num_views: usize,
    ) -> Result<Vec<View>, DatasetError> {
        let len = self.len();
        if idx >= len {
            return Err(DatasetError::IndexOutOfRange { index: idx, len });
        }

        let resolutions = &self.config().resolutions;
        let resolution = *resolutions
            .get(ar_idx)
            .ok_or(DatasetError::ResolutionOutOfRange {
                index: ar_idx,
                available: resolutions.len(),
            })?;

        let mut rng = match self.config().seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed.wrapping_add(idx as u64)),
            None => ChaCha20Rng::from_os_rng(),
        };
        trace!(idx, ar_idx, %resolution, seeded = self.config().seed.is_some(), "get_item");

        self.get_views(idx, resolution, &mut rng, num_views)
    }
}
