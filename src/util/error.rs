//! Error types for keystable.

use thiserror::Error;

/// Result alias for keystable operations.
pub type KeystableResult<T> = std::result::Result<T, KeystableError>;

/// Errors that can occur when running keystable algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum KeystableError {
    /// A numeric parameter (kernel size, sigma, scale list) is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
    /// Image dimensions are zero or overflow.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The pixel buffer does not hold `width * height` RGBA samples.
    #[error("buffer too small: needed {needed} samples, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// An external collaborator (image source, render sink, store) failed.
    #[error("{collaborator} failed: {reason}")]
    CollaboratorFailure {
        collaborator: &'static str,
        reason: String,
    },
    /// Decoding or encoding an image file failed.
    #[cfg(feature = "image-io")]
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}

impl KeystableError {
    pub(crate) fn collaborator(collaborator: &'static str, reason: impl ToString) -> Self {
        Self::CollaboratorFailure {
            collaborator,
            reason: reason.to_string(),
        }
    }
}
