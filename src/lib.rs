// src/lib.rs
//
// Crate root: public re-exports.
//
// Loader for the IRS multi-view RGB-D dataset: scans a scene tree once,
// then serves randomly drawn, deterministically seeded sets of views.

pub mod config;
pub mod constants;
pub mod data_formats;
pub mod data_loader;

pub use config::{DatasetConfig, Resolution, SceneOrder};
pub use data_loader::{
    build_index, derive_seed, sanitize_depth, CropResize, DatasetError, Frame, IrsDataset,
    MultiViewDataset, Passthrough, PrincipalPointCrop, SampleKey, View,
};
// Module alias so callers can use `irs_views::dataset::MultiViewDataset`:
pub use crate::data_loader::dataset;
