use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Image loading error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Images must have the same dimensions ({}x{} vs {}x{})", left.0, left.1, right.0, right.1)]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Invalid sample depth: {0}")]
    InvalidSampleDepth(String),

    #[error("Raster {width}x{height} needs {expected} samples, got {actual}")]
    StorageMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CompareError>;
