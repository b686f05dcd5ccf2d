use std::path::PathBuf;

use icalign_image::ImageError;
use icalign_io::IoError;

/// Width, height and channel count of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Number of channels.
    pub channels: usize,
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// An error type for the alignment pipeline.
#[derive(thiserror::Error, Debug)]
pub enum AlignError {
    /// An image or mask file could not be read.
    #[error("Cannot read the image {path}: {source}")]
    LoadFailed {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying decoding error.
        #[source]
        source: IoError,
    },

    /// The two input images do not share width, height and channel count.
    #[error("Cannot read the images or their sizes are not the same: {0} vs {1}")]
    GeometryMismatch(Geometry, Geometry),

    /// A mask does not have the geometry of the image it belongs to.
    #[error("The mask {path} is {found}, its image is {expected}")]
    MaskMismatch {
        /// The mask file.
        path: PathBuf,
        /// Geometry of the owning image.
        expected: Geometry,
        /// Geometry of the mask.
        found: Geometry,
    },

    /// An image reference could not be parsed.
    #[error("Invalid image reference '{0}'")]
    InvalidImageReference(String),

    /// A parameter vector does not have the length of its transform type.
    #[error("Expected {expected} transform parameters, got {found}")]
    InvalidParameterCount {
        /// Length required by the transform type.
        expected: usize,
        /// Length supplied.
        found: usize,
    },

    /// The estimator could not produce a transform.
    #[error("Estimation failed: {0}")]
    EstimationFailed(String),

    /// Error from an image operation.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// Error from reading or writing files.
    #[error(transparent)]
    IoError(#[from] IoError),
}
