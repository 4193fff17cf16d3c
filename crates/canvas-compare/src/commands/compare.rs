use std::path::Path;

use anyhow::{Context, Result};
use canvas_compare::{CompareParams, Comparison, DiffEngine, DiffResult, EngineKind};
use image::RgbaImage;
use serde::Serialize;
use tracing::debug;

use crate::config::ResolvedRunConfig;
use crate::load::{self, ImageSource};
use crate::report::terminal;

/// Machine-readable result for `--json`.
#[derive(Debug, Serialize)]
struct CompareSummary<'a> {
    base: String,
    target: String,
    engine: &'a str,
    params: CompareParams,
    width: u32,
    height: u32,
    changed_pixel_count: u64,
    total_pixels: u64,
    percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution_time_ms: Option<u64>,
}

/// `canvas-compare compare` — load two images, diff them, report.
pub async fn compare(
    config: ResolvedRunConfig,
    base: &str,
    target: &str,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let base = ImageSource::parse(base).context("Invalid base image source")?;
    let target = ImageSource::parse(target).context("Invalid target image source")?;

    let (base_bytes, target_bytes) = tokio::try_join!(load::fetch(&base), load::fetch(&target))
        .context("Failed to load images")?;
    debug!(
        base_bytes = base_bytes.len(),
        target_bytes = target_bytes.len(),
        "images fetched"
    );

    let params = config.params;
    let engine = config.engine;
    let result = tokio::task::spawn_blocking(move || run(&base_bytes, &target_bytes, params, engine))
        .await
        .context("Diff task panicked")??;

    let name = format!("{base} -> {target}");
    if json {
        let (width, height) = result.diff_buffer().dimensions();
        let summary = CompareSummary {
            base: base.to_string(),
            target: target.to_string(),
            engine: engine.name(),
            params,
            width,
            height,
            changed_pixel_count: result.changed_pixel_count(),
            total_pixels: result.total_pixels(),
            percentage: result.percentage(),
            execution_time_ms: result.execution_time_ms(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize result")?
        );
    } else {
        terminal::print_result(&name, &result);
    }

    if let Some(path) = output {
        save_diff(result, path)?;
        if !json {
            println!("  saved {}", path.display());
        }
    }

    Ok(())
}

/// Decode both sides and run the pipeline. CPU-bound.
fn run(
    base: &[u8],
    target: &[u8],
    params: CompareParams,
    engine: EngineKind,
) -> Result<DiffResult> {
    let base = load::decode(base).context("Failed to decode base image")?;
    let target = load::decode(target).context("Failed to decode target image")?;
    let result = Comparison::new(params)
        .with_engine(engine)
        .base(base)
        .target(target)
        .run()?;
    Ok(result)
}

/// Write the diff buffer as an image; the format follows the extension.
fn save_diff(result: DiffResult, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let img = RgbaImage::try_from(result.into_diff_buffer())?;
    img.save(path)
        .with_context(|| format!("Failed to save diff image: {}", path.display()))?;
    Ok(())
}
