//! CLI for inspecting an IRS dataset root: `index` and `sample`.
//!
//! Examples:
//! ```bash
//! irs-cli index  /data/irs                          # sample / scene counts
//! irs-cli -v sample /data/irs --idx 5 -n 4          # draw 4 views for idx 5
//! IRS_ROOT=/data/irs irs-cli sample --resolution 512x288 --seed 7
//! ```

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use irs_views::{
    DatasetConfig, IrsDataset, MultiViewDataset, Passthrough, PrincipalPointCrop, Resolution,
    SceneOrder, View,
};

/// Macro to safely print with broken pipe handling
macro_rules! safe_println {
    ($($arg:tt)*) => {
        match writeln!(io::stdout(), $($arg)*) {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // Gracefully exit on broken pipe (e.g., when piped to head/tail)
                std::process::exit(0);
            }
            Err(e) => return Err(e.into())
        }
    };
}

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short = 'v',
        long,
        action = ArgAction::Count,
        help = "Increase log verbosity: -v = Info, -vv = Debug",
    )]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a dataset root and print sample counts per scene.
    Index {
        /// Dataset root (falls back to IRS_ROOT).
        root: Option<PathBuf>,

        /// Scene order: sorted | listing
        #[arg(long, default_value = "sorted")]
        order: SceneOrder,
    },

    /// Draw one multi-view sample and print what was loaded.
    Sample {
        /// Dataset root (falls back to IRS_ROOT).
        root: Option<PathBuf>,

        /// Sample index; mixed into the per-call seed.
        #[arg(long, default_value_t = 0)]
        idx: usize,

        /// Number of distinct views to draw.
        #[arg(short = 'n', long, default_value_t = 2)]
        num_views: usize,

        /// Output resolution, WIDTHxHEIGHT.
        #[arg(short = 'r', long, default_value = "512x384")]
        resolution: Resolution,

        /// Seed of the caller generator.
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Random target enlargement in pixels before the final crop.
        #[arg(long, default_value_t = 0)]
        aug_crop: u32,

        /// Skip crop/resize and return frames at their native size.
        #[arg(long)]
        passthrough: bool,
    },
}

fn dataset_config(root: Option<PathBuf>) -> Result<DatasetConfig> {
    match root {
        Some(root) => Ok(DatasetConfig::new(root)),
        None => DatasetConfig::from_env().context("no ROOT given"),
    }
}

fn index_cmd(root: Option<PathBuf>, order: SceneOrder) -> Result<()> {
    let cfg = dataset_config(root)?.scene_order(order);
    let ds = IrsDataset::new(cfg).context("failed to index dataset")?;

    let mut per_scene: BTreeMap<&str, usize> = BTreeMap::new();
    for key in ds.keys() {
        *per_scene.entry(key.scene.as_str()).or_default() += 1;
    }

    safe_println!("root:    {}", ds.root().display());
    safe_println!("samples: {}", ds.image_count());
    safe_println!("scenes:  {}", per_scene.len());
    for (scene, count) in per_scene {
        safe_println!("  {:<40} {}", scene, count);
    }
    Ok(())
}

fn print_views(views: &[View]) -> Result<()> {
    for (i, v) in views.iter().enumerate() {
        let (h, w) = v.size();
        let valid = v.depthmap.iter().filter(|d| **d > 0.0).count();
        safe_println!(
            "[{}] {:<24} label={} {}x{} valid_depth={}/{} fx={:.2} cx={:.2} cy={:.2}",
            i,
            v.instance,
            v.label,
            w,
            h,
            valid,
            v.depthmap.len(),
            v.camera_intrinsics[[0, 0]],
            v.camera_intrinsics[[0, 2]],
            v.camera_intrinsics[[1, 2]],
        );
    }
    Ok(())
}

fn sample_cmd(
    root: Option<PathBuf>,
    idx: usize,
    num_views: usize,
    resolution: Resolution,
    seed: u64,
    aug_crop: u32,
    passthrough: bool,
) -> Result<()> {
    let cfg = dataset_config(root)?
        .with_resolution(resolution)
        .aug_crop(aug_crop);
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    let views = if passthrough {
        let ds = IrsDataset::with_transform(cfg, Passthrough)?;
        ds.get_views(idx, resolution, &mut rng, num_views)?
    } else {
        let ds = IrsDataset::with_transform(cfg, PrincipalPointCrop::new(aug_crop))?;
        ds.get_views(idx, resolution, &mut rng, num_views)?
    };
    info!("drew {} views for idx {}", views.len(), idx);
    print_views(&views)
}

fn main() -> Result<()> {
    // Loads any variables from .env file that are not already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbosity
    let filter = match cli.verbose {
        0 => "warn",  // no -v: WARN level
        1 => "info",  // -v: INFO level
        _ => "debug", // -vv or more: DEBUG level
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.cmd {
        Command::Index { root, order } => index_cmd(root, order)?,
        Command::Sample {
            root,
            idx,
            num_views,
            resolution,
            seed,
            aug_crop,
            passthrough,
        } => sample_cmd(root, idx, num_views, resolution, seed, aug_crop, passthrough)?,
    }
    Ok(())
}
