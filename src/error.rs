use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid PNG optimization level: {0}. Must be between 0 and 6")]
    InvalidLevel(u8),

    #[error("Invalid scale factor: {0}. Must be greater than 0 and at most 1")]
    InvalidScale(f32),

    #[error("Invalid resize target: {0}x{1}. Both sides must be greater than 0")]
    InvalidDimensions(u32, u32),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Strategy {strategy} does not accept parameter '{key}' (accepted: {accepted})")]
    UnknownParameter {
        strategy: String,
        key: String,
        accepted: String,
    },

    #[error("Invalid parameter '{0}': {1}")]
    InvalidParameter(String, String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("Inputs {first:?} and {second:?} would both write to {output:?}")]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobPattern(#[from] glob::PatternError),
}

impl BenchError {
    /// Short class name used in log lines, e.g. `DecodeError`.
    pub fn class(&self) -> &'static str {
        match self {
            BenchError::Io(_)
            | BenchError::WalkdirError(_)
            | BenchError::FileNotFound(_)
            | BenchError::DirectoryCreationFailed(_) => "IOError",
            BenchError::Decode(_) => "DecodeError",
            BenchError::Encode(_) | BenchError::PngOptimization(_) => "EncodeError",
            BenchError::Metadata(_) => "MetadataError",
            _ => "ConfigError",
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
