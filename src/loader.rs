//! Decoding of still and animated images into an owned frame sequence.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, ImageError, ImageFormat, ImageResult, RgbaImage};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Delay used when a format carries no timing metadata at all.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
/// Shortest delay a frame may have; zero hints are raised to this.
pub const MIN_DELAY: Duration = Duration::from_millis(10);

/// One decoded picture and how long it stays on screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub raster: RgbaImage,
    pub delay: Duration,
}

impl Frame {
    pub fn new(raster: RgbaImage, delay: Duration) -> Self {
        Self { raster, delay: delay.max(MIN_DELAY) }
    }
}

/// Reads `path` and returns every frame it contains, first frame first.
///
/// GIF, APNG and animated WebP yield one frame per animation step; anything
/// else the image crate can decode yields exactly one frame.
pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<Frame>> {
    let path = path.as_ref();
    let decode_err = |source: ImageError| Error::Decode { path: path.to_path_buf(), source };

    let bytes = std::fs::read(path).map_err(|e| decode_err(ImageError::IoError(e)))?;
    let format = image::guess_format(&bytes).map_err(decode_err)?;
    debug!(path = %path.display(), ?format, "decoding");

    let frames = decode(&bytes, format).map_err(decode_err)?;
    if frames.is_empty() {
        return Err(Error::NoFrames { path: path.to_path_buf() });
    }

    info!(path = %path.display(), frames = frames.len(), "loaded");
    Ok(frames)
}

fn decode(bytes: &[u8], format: ImageFormat) -> ImageResult<Vec<Frame>> {
    let reader = Cursor::new(bytes);
    match format {
        ImageFormat::Gif => animated(GifDecoder::new(reader)?),
        ImageFormat::Png => {
            let decoder = PngDecoder::new(reader)?;
            if decoder.is_apng()? {
                animated(decoder.apng()?)
            } else {
                still(bytes, format)
            }
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(reader)?;
            if decoder.has_animation() {
                animated(decoder)
            } else {
                still(bytes, format)
            }
        }
        _ => still(bytes, format),
    }
}

fn animated<'a>(decoder: impl AnimationDecoder<'a>) -> ImageResult<Vec<Frame>> {
    let frames = decoder.into_frames().collect_frames()?;
    Ok(frames
        .into_iter()
        .enumerate()
        .map(|(i, f)| {
            let hint = Duration::from(f.delay());
            if hint < MIN_DELAY {
                warn!(frame = i, ?hint, floor = ?MIN_DELAY, "delay raised to floor");
            }
            Frame::new(f.into_buffer(), hint)
        })
        .collect())
}

fn still(bytes: &[u8], format: ImageFormat) -> ImageResult<Vec<Frame>> {
    let image = image::load_from_memory_with_format(bytes, format)?;
    Ok(vec![Frame::new(image.to_rgba8(), DEFAULT_DELAY)])
}
