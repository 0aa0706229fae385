//! Prefetch demo
//!
//! Builds a small asset directory, selects a model and shows the neighbours
//! arriving in the background while the selection loads.
//!
//! Run with `RUST_LOG=debug cargo run --example prefetch_demo`.

use showcase_viewer::fetch::mock::placeholder_glb;
use showcase_viewer::{
    CachedFetcher, CameraPose, FetchTier, FileFetcher, FileStore, ModelViewer, TokioSpawner,
    ViewerConfig,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let workdir = std::env::temp_dir().join("showcase_viewer_demo");
    let config = ViewerConfig {
        asset_root: workdir.join("public"),
        ..ViewerConfig::default()
    };

    std::fs::create_dir_all(&config.asset_root)?;
    for entry in &config.catalog()? {
        std::fs::write(config.asset_root.join(entry.relative_path()), placeholder_glb())?;
    }

    println!("showcase_viewer Prefetch Demo");
    println!("=============================\n");

    let fetcher = Arc::new(CachedFetcher::new(
        FileFetcher::new(&config.asset_root),
        config.cache_budget_bytes,
    ));
    let store = FileStore::new(workdir.join("profile"));
    let viewer = ModelViewer::new(&config, TokioSpawner::new(), Arc::clone(&fetcher), store)?;

    println!("Initial camera: {:?}", viewer.initial_pose());

    let selection = "/X_Bacon.glb".parse()?;
    viewer.select(Some(selection));

    if let Some(plan) = viewer.prefetch().plan() {
        println!("\nPrefetch plan:");
        for entry in plan.entries() {
            let tier = match entry.tier {
                FetchTier::Immediate => "now",
                FetchTier::Priority => "neighbour",
                FetchTier::Background => "background",
            };
            println!("  {:>5} ms  {:<10} {}", entry.delay.as_millis(), tier, entry.id);
        }
    }

    let scene = viewer.load_selected().await?;
    println!(
        "\nAttached {} ({} nodes, {} bytes)",
        scene.id, scene.node_count, scene.byte_len
    );

    tokio::time::sleep(config.load_settle_delay() + Duration::from_millis(10)).await;
    println!("Loading indicator visible: {}", viewer.is_loading());

    tokio::time::sleep(Duration::from_secs(3)).await;
    println!(
        "\nCached after 3s: {} models, {} parsed scenes",
        fetcher.byte_cache().len(),
        fetcher.scene_cache().len()
    );

    viewer.on_interaction_end(&CameraPose::new(
        glam::Vec3::new(1.0, 0.5, 2.0),
        glam::Vec3::ZERO,
        40.0,
    ));
    println!("Camera framing saved under {:?}", viewer.poses().key());

    println!("\nPrefetch demo complete!");
    Ok(())
}
