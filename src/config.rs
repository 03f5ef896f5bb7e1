// src/config.rs
//
// Runtime parameters for the IRS dataset.
//
// Builder helpers are provided so callers can write a fluent style:
//
// let cfg = DatasetConfig::new("/data/irs")
//     .with_resolutions(vec![Resolution::new(512, 384), Resolution::new(512, 288)])
//     .with_seed(777)
//     .aug_crop(16)
//     .scene_order(SceneOrder::Sorted);

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_RESOLUTION, ENV_AUG_CROP, ENV_RESOLUTIONS, ENV_ROOT, ENV_SCENE_ORDER, ENV_SEED,
};

/// Output image size, width first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION.0, DEFAULT_RESOLUTION.1)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parse `"512x384"` (an upper-case `X` is accepted too).
impl FromStr for Resolution {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .with_context(|| format!("Resolution must look like WIDTHxHEIGHT, got: {s}"))?;
        let width: u32 = w.trim().parse().with_context(|| format!("Bad width in {s}"))?;
        let height: u32 = h.trim().parse().with_context(|| format!("Bad height in {s}"))?;
        if width == 0 || height == 0 {
            bail!("Resolution must be non-zero, got: {s}");
        }
        Ok(Self { width, height })
    }
}

/// Order in which scene directories are visited while building the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneOrder {
    /// Lexicographic by scene name; identical on every platform.
    #[default]
    Sorted,
    /// Whatever `read_dir` returns. Stable for one run, not across machines.
    Listing,
}

impl fmt::Display for SceneOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneOrder::Sorted => write!(f, "sorted"),
            SceneOrder::Listing => write!(f, "listing"),
        }
    }
}

impl FromStr for SceneOrder {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sorted" => Ok(SceneOrder::Sorted),
            "listing" | "fs" => Ok(SceneOrder::Listing),
            _ => bail!("Unknown scene order: {}. Valid options: sorted, listing", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Dataset root; one subdirectory per scene.
    pub root: PathBuf,
    /// Candidate output resolutions, selected by `ar_idx` in `get_item`.
    pub resolutions: Vec<Resolution>,
    /// Base seed for `get_item`. `None` draws the caller generator from OS entropy.
    pub seed: Option<u64>,
    /// Random enlargement (pixels) of the rescale target before the final crop. `0`/`1` disable it.
    pub aug_crop: u32,
    /// Scene visiting order for the index.
    pub scene_order: SceneOrder,
}

impl DatasetConfig {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            resolutions: vec![Resolution::default()],
            seed: None,
            aug_crop: 0,
            scene_order: SceneOrder::default(),
        }
    }

    /// Replace the candidate resolutions. An empty list is ignored.
    pub fn with_resolutions(mut self, resolutions: Vec<Resolution>) -> Self {
        if !resolutions.is_empty() {
            self.resolutions = resolutions;
        }
        self
    }

    /// Builder-style helper: single output resolution.
    pub fn with_resolution(self, resolution: Resolution) -> Self {
        self.with_resolutions(vec![resolution])
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn aug_crop(mut self, pixels: u32) -> Self {
        self.aug_crop = pixels;
        self
    }

    pub fn scene_order(mut self, order: SceneOrder) -> Self {
        self.scene_order = order;
        self
    }

    /// Build a config from the process environment (after loading any `.env` file).
    ///
    /// `IRS_ROOT` is required; `IRS_RESOLUTIONS`, `IRS_SEED`, `IRS_AUG_CROP`
    /// and `IRS_SCENE_ORDER` are optional.
    pub fn from_env() -> Result<Self> {
        // Loads any variables from .env file that are not already set
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DatasetConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = lookup(ENV_ROOT).with_context(|| format!("{ENV_ROOT} is not set"))?;
        let mut cfg = Self::new(root);

        if let Some(list) = lookup(ENV_RESOLUTIONS) {
            let resolutions = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(Resolution::from_str)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid {ENV_RESOLUTIONS}"))?;
            cfg = cfg.with_resolutions(resolutions);
        }
        if let Some(seed) = lookup(ENV_SEED) {
            let seed = seed
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_SEED}: {seed}"))?;
            cfg = cfg.with_seed(seed);
        }
        if let Some(px) = lookup(ENV_AUG_CROP) {
            let px = px
                .trim()
                .parse()
                .with_context(|| format!("Invalid {ENV_AUG_CROP}: {px}"))?;
            cfg = cfg.aug_crop(px);
        }
        if let Some(order) = lookup(ENV_SCENE_ORDER) {
            cfg = cfg.scene_order(order.parse()?);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn resolution_parses_and_displays() {
        let r: Resolution = "640x480".parse().unwrap();
        assert_eq!(r, Resolution::new(640, 480));
        assert_eq!(r.to_string(), "640x480");
        assert_eq!("224X224".parse::<Resolution>().unwrap(), Resolution::new(224, 224));
        assert!("640".parse::<Resolution>().is_err());
        assert!("0x480".parse::<Resolution>().is_err());
        assert!("ax480".parse::<Resolution>().is_err());
    }

    #[test]
    fn scene_order_from_str() {
        assert_eq!("Sorted".parse::<SceneOrder>().unwrap(), SceneOrder::Sorted);
        assert_eq!("listing".parse::<SceneOrder>().unwrap(), SceneOrder::Listing);
        assert!("random".parse::<SceneOrder>().is_err());
    }

    #[test]
    fn from_lookup_reads_all_keys() {
        let env: HashMap<&str, &str> = [
            (ENV_ROOT, "/data/irs"),
            (ENV_RESOLUTIONS, "512x384, 512x288"),
            (ENV_SEED, "777"),
            (ENV_AUG_CROP, "16"),
            (ENV_SCENE_ORDER, "listing"),
        ]
        .into_iter()
        .collect();

        let cfg = DatasetConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.root, PathBuf::from("/data/irs"));
        assert_eq!(
            cfg.resolutions,
            vec![Resolution::new(512, 384), Resolution::new(512, 288)]
        );
        assert_eq!(cfg.seed, Some(777));
        assert_eq!(cfg.aug_crop, 16);
        assert_eq!(cfg.scene_order, SceneOrder::Listing);
    }

    #[test]
    fn from_lookup_requires_root() {
        let err = DatasetConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(ENV_ROOT));
    }

    #[test]
    fn defaults() {
        let cfg = DatasetConfig::new("/tmp/x");
        assert_eq!(cfg.resolutions, vec![Resolution::new(512, 384)]);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.aug_crop, 0);
        assert_eq!(cfg.scene_order, SceneOrder::Sorted);
        // empty list keeps the previous resolutions
        let cfg = cfg.with_resolutions(Vec::new());
        assert_eq!(cfg.resolutions.len(), 1);
    }
}
