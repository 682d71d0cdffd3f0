//! `flatfs` mount binary.
//!
//! Mounts an empty in-memory flat-namespace filesystem at the given
//! mount point and serves it until the process exits or the mount is
//! unmounted. All entries are discarded at unmount.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flatfs_fuse::FlatFuse;
use fuser::MountOption;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Mount an in-memory flat-namespace filesystem.
///
/// Everything created under the mount point lives in process memory
/// only: a flat root of directories and small files, gone at unmount.
#[derive(Parser, Debug)]
#[command(name = "flatfs", version, about)]
struct Cli {
    /// Where to mount the filesystem.
    mountpoint: PathBuf,

    /// Enable verbose logging (debug level).
    #[arg(short, long)]
    verbose: bool,

    /// Allow other users to access the mount.
    #[arg(long)]
    allow_other: bool,

    /// Unmount automatically when the process exits.
    #[arg(long)]
    auto_unmount: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut options = vec![MountOption::FSName("flatfs".to_string())];
    if cli.allow_other {
        options.push(MountOption::AllowOther);
    }
    if cli.auto_unmount {
        options.push(MountOption::AutoUnmount);
    }

    info!(mountpoint = %cli.mountpoint.display(), "mounting flatfs");
    fuser::mount2(FlatFuse::new(), &cli.mountpoint, &options)
        .with_context(|| format!("failed to mount flatfs at {}", cli.mountpoint.display()))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
