use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScryError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("unrecognized preprocess mode: '{0}'")]
    InvalidMode(String),

    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("invalid fingerprint length: {0} bytes (expected 32)")]
    InvalidHashLength(usize),

    #[error("fingerprint detection failed")]
    HashComputation,

    #[error("catalog contains no entries")]
    EmptyCatalog,

    #[error("catalog unavailable: {0}")]
    StoreUnavailable(String),
}

pub type Result<T> = std::result::Result<T, ScryError>;
