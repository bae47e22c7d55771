use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} contains no frames", path.display())]
    NoFrames { path: PathBuf },
    #[error("Invalid dimensions: {width}x{height} raster at width {target}")]
    InvalidDimension { width: u32, height: u32, target: u32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
