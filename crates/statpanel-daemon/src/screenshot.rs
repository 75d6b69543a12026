//! PNG screenshots of rendered frames.

use crate::layout::{Layout, ScreenKind};
use crate::rendering::ScreenRenderer;
use crate::sources::DataFetch;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use statpanel_hw::Framebuffer;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

/// Encodes a frame as an 8-bit RGB PNG.
pub fn encode_png(frame: &Framebuffer) -> Result<Vec<u8>> {
    let (width, height) = frame.dimensions();
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width as u32, height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(frame.data())?;
    }
    Ok(png_data)
}

/// Writes `frame` to `dir/name`, creating the directory if needed.
pub fn save(frame: &Framebuffer, dir: &Path, name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(name);
    let png = encode_png(frame)?;
    std::fs::write(&path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Operator screenshot file name, e.g. `screenshot_20240131_235959.png`.
pub fn timestamped_name(now: DateTime<Local>) -> String {
    format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// File name for screen `index` in a generated set.
pub fn screen_file_name(layout: &Layout, index: usize) -> String {
    let screen = &layout.screens[index];
    let stem = match screen.kind {
        ScreenKind::Hero => screen
            .image_path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("hero_{}", index)),
        ScreenKind::Standard if screen.title.is_empty() => format!("screen_{}", index),
        ScreenKind::Standard => screen.title.replace(' ', "_").to_lowercase(),
    };
    format!("screen_{}_{}.png", index, stem)
}

/// Renders every screen in the layout to `out`.
///
/// A screen that fails to save is logged and skipped.
pub fn generate_all(
    renderer: &mut ScreenRenderer,
    data: &dyn DataFetch,
    out: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    let mut written = Vec::new();
    for index in 0..renderer.screen_count() {
        let name = screen_file_name(renderer.layout(), index);
        let frame = renderer.render(index, data);
        match save(&frame, out, &name) {
            Ok(path) => written.push(path),
            Err(e) => warn!("Failed to save {}: {:#}", name, e),
        }
    }
    info!("Generated {} screenshots in {}", written.len(), out.display());
    Ok(written)
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Regenerates screenshots whenever the layout file changes, until Ctrl+C.
pub async fn watch(
    layout_path: &Path,
    assets: &Path,
    out: &Path,
    size: (u16, u16),
    data: &dyn DataFetch,
) -> Result<()> {
    let mut last = modified(layout_path);
    info!("Watching {} for changes", layout_path.display());

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Watcher stopped");
                return Ok(());
            }
        }

        let current = modified(layout_path);
        if current == last {
            continue;
        }
        last = current;

        info!("Layout changed, regenerating screenshots");
        let layout = match Layout::load(layout_path) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("{:#}", e);
                continue;
            }
        };
        let mut renderer = ScreenRenderer::new(layout, assets, size)?;
        generate_all(&mut renderer, data, out)?;
    }
}
