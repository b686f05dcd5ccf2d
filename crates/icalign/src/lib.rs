#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Alignment options, their validation and defaults.
pub mod config;

/// Error types for the alignment pipeline.
pub mod error;

/// The estimator capability and its settings.
pub mod estimator;

/// Reduction of three channel inputs to grayscale.
pub mod grayscale;

/// Image references of the form `path[:maskpath]`.
pub mod image_ref;

/// Loading and validation of the input images and masks.
pub mod loader;

/// Persistence of the estimated transform.
pub mod output;

/// The end to end alignment run.
pub mod pipeline;

/// Pyramid depth policy.
pub mod pyramid;

/// Parametric transform models.
pub mod transform;

pub use crate::config::{AlignConfig, AlignOptions, OutputFormat, RobustFunction};
pub use crate::error::{AlignError, Geometry};
pub use crate::estimator::{EstimatorConfig, TransformEstimator};
pub use crate::image_ref::ImageRef;
pub use crate::loader::{Frame, ImagePair, LoadedPair};
pub use crate::pipeline::run;
pub use crate::transform::{TransformMatrix, TransformParameters, TransformType};
