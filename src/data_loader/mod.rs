// src/data_loader/mod.rs

//! Public API surface for the multi-view data_loader layer.
pub mod dataset;
pub mod index;
pub mod irs;
pub mod sampler;
pub mod transform;
pub mod view;

// Re‐export the key types at this level:
pub use dataset::{DatasetError, MultiViewDataset};
pub use index::{build_index, SampleKey};
pub use irs::{sanitize_depth, IrsDataset};
pub use sampler::{derive_seed, Sampler, ViewSampler};
pub use transform::{CropResize, Frame, Passthrough, PrincipalPointCrop};
pub use view::View;
