// Copyright 2024 the Drawkit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The common error type for drawkit operations.

use crate::ColorParseError;

/// An error that can occur while building or rendering a drawing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Option not supported")]
    NotSupported,
    #[error("Invalid input")]
    InvalidInput,
    #[error("Stack unbalanced")]
    StackUnbalance,
    #[error("Function not implemented")]
    Unimplemented,
    #[error("Font not found: {0}")]
    MissingFont(String),
    #[error("Font loading failed: {0}")]
    FontLoadingFailed(String),
    #[error("Invalid color: {0}")]
    ColorParse(#[from] ColorParseError),
    #[error("Malformed command list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image decoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("Backend error: {0}")]
    BackendError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Error {
        Error::BackendError(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::BackendError(Box::new(e))
    }
}
