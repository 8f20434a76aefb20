use std::path::PathBuf;

use clap::Args;
use jiff::Timestamp;
use larder_app::domain::carts::{FileCartStorage, prune_stale_carts};

#[derive(Debug, Args)]
pub(crate) struct PruneArgs {
    /// Directory the JSON API writes cart records to
    #[arg(long, env = "CART_STORAGE_DIR")]
    dir: PathBuf,
}

pub(crate) async fn run(args: PruneArgs) -> Result<(), String> {
    let storage = FileCartStorage::new(&args.dir);

    let report = prune_stale_carts(&storage, Timestamp::now())
        .await
        .map_err(|error| format!("failed to prune {}: {error}", args.dir.display()))?;

    println!("removed: {}", report.removed);
    println!("kept: {}", report.kept);

    Ok(())
}
