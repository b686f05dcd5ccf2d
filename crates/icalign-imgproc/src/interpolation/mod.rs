//! Pixel interpolation methods for image transformations.
//!
//! # Interpolation Modes
//!
//! - **Bicubic**: Keys cubic convolution over a 4x4 neighbourhood, exact at integer positions
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//!
//! Samples outside the image read the nearest border pixel.

mod bicubic;
pub(crate) mod interpolate;
mod nearest;

pub use interpolate::interpolate_pixel;
pub use interpolate::InterpolationMode;
