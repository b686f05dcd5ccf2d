#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// High-level image reading and writing functions.
///
/// See [`functional::read_image_any`] for automatic format detection.
pub mod functional;

/// Plain text artifacts holding a parameter vector or a 3x3 matrix.
pub mod text;

/// TIFF image encoding and decoding.
///
/// Real valued images are stored as single precision floating point TIFF.
pub mod tiff;

pub use crate::error::IoError;
pub use crate::functional::GenericImage;
