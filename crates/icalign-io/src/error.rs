/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Invalid file extension.
    #[error("File is does not have a valid extension: {0}")]
    InvalidFileExtension(std::path::PathBuf),

    /// Error to open the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] icalign_image::ImageError),

    /// Error to decode or encode the image with the image crate.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to decode or encode the TIFF image.
    #[error("Error with TIFF encoding/decoding. {0}")]
    TiffError(#[from] tiff::TiffError),

    /// The pixel layout of the image is not supported.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// A text artifact does not hold the expected values.
    #[error("Invalid text artifact {0}: {1}")]
    InvalidTextArtifact(std::path::PathBuf, String),
}
