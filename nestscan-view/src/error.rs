//! Error types for nestscan-view

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Not an image file: {0}")]
    NotAnImage(String),

    #[error("File size {0} bytes exceeds the 10 MiB limit")]
    FileTooLarge(u64),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("A detection request is already in flight")]
    Busy,
}

pub type Result<T> = std::result::Result<T, ViewError>;
