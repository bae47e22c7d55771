//! Play still images and animations in the terminal as true-color block
//! characters.
//!
//! Frames are decoded, trimmed of transparent padding and rendered up front;
//! playback then only writes the prepared text.

pub mod crop;
pub mod error;
pub mod loader;
pub mod playback;
pub mod render;

use std::path::Path;

use tracing::{debug, info};

pub use crop::{content_bounds, crop_to_content, ContentBounds};
pub use error::{Error, Result};
pub use loader::{load_frames, Frame};
pub use playback::{PlaybackState, Player, RenderedFrame, StopReason};
pub use render::{render_blocks, BlockRenderer, FilterType};

/// How frames are turned into text.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub crop: bool,
    pub alpha_threshold: u8,
    pub filter: FilterType,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: render::DEFAULT_WIDTH,
            crop: true,
            alpha_threshold: crop::DEFAULT_ALPHA_THRESHOLD,
            filter: FilterType::default(),
        }
    }
}

/// Renders every frame, keeping order and delays.
pub fn render_frames(frames: &[Frame], options: &RenderOptions) -> Result<Vec<RenderedFrame>> {
    let renderer = BlockRenderer::new(options.width).with_filter(options.filter);
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let text = if options.crop {
                let cropped = crop_to_content(&frame.raster, options.alpha_threshold);
                debug!(frame = i, from = ?frame.raster.dimensions(), to = ?cropped.dimensions(), "cropped");
                renderer.render(&cropped)?
            } else {
                renderer.render(&frame.raster)?
            };
            Ok(RenderedFrame { text, delay: frame.delay })
        })
        .collect()
}

/// Loads `path` and renders all of its frames.
pub fn prepare_frames(path: impl AsRef<Path>, options: &RenderOptions) -> Result<Vec<RenderedFrame>> {
    let frames = load_frames(path)?;
    let rendered = render_frames(&frames, options)?;
    info!(frames = rendered.len(), width = options.width, "rendered");
    Ok(rendered)
}
