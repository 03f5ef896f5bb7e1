// src/data_loader/index.rs
//
// Scene index: one (scene, basename) key per color image under the root.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SceneOrder;
use crate::constants::{CAM_DIR, CAM_EXT, DEPTH_DIR, DEPTH_EXT, RGB_DIR, RGB_EXT};
use crate::data_loader::dataset::DatasetError;

/// Identifies one color / depth / camera triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleKey {
    pub scene: String,
    pub basename: String,
}

impl SampleKey {
    pub fn new(scene: impl Into<String>, basename: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            basename: basename.into(),
        }
    }

    /// `<root>/<scene>/rgb/<basename>.png`
    pub fn rgb_path(&self, root: &Path) -> PathBuf {
        self.file_path(root, RGB_DIR, RGB_EXT)
    }

    /// `<root>/<scene>/depth/<basename>.npy`
    pub fn depth_path(&self, root: &Path) -> PathBuf {
        self.file_path(root, DEPTH_DIR, DEPTH_EXT)
    }

    /// `<root>/<scene>/cam/<basename>.npz`
    pub fn cam_path(&self, root: &Path) -> PathBuf {
        self.file_path(root, CAM_DIR, CAM_EXT)
    }

    fn file_path(&self, root: &Path, dir: &str, ext: &str) -> PathBuf {
        root.join(&self.scene)
            .join(dir)
            .join(format!("{}{}", self.basename, ext))
    }
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scene, self.basename)
    }
}

/// Scan `root` and return every sample key.
///
/// Every entry of `root` is taken to be a scene; its `rgb` directory must
/// exist. Basenames are sorted within a scene, scenes follow `order`.
/// Depth and camera files are not checked here.
pub fn build_index(root: &Path, order: SceneOrder) -> Result<Vec<SampleKey>, DatasetError> {
    let mut scenes = list_names(root)?;
    if order == SceneOrder::Sorted {
        scenes.sort();
    }

    let mut keys = Vec::new();
    for scene in &scenes {
        let rgb_dir = root.join(scene).join(RGB_DIR);
        let mut basenames: Vec<String> = list_names(&rgb_dir)?
            .into_iter()
            .filter_map(|name| name.strip_suffix(RGB_EXT).map(str::to_owned))
            .collect();
        basenames.sort();
        debug!("scene {}: {} images", scene, basenames.len());

        keys.extend(basenames.into_iter().map(|b| SampleKey::new(scene.as_str(), b)));
    }

    info!(
        "indexed {} samples across {} scenes under {} ({} order)",
        keys.len(),
        scenes.len(),
        root.display(),
        order
    );
    Ok(keys)
}

/// Entry names of `dir`, in listing order.
fn list_names(dir: &Path) -> Result<Vec<String>, DatasetError> {
    let io_err = |source: std::io::Error| DatasetError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| DatasetError::InvalidName(entry.path()))?;
        names.push(name);
    }
    Ok(names)
}
