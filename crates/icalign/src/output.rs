use std::path::Path;

use icalign_image::Image;
use icalign_imgproc::{
    interpolation::InterpolationMode,
    warp::{warp_perspective_backward, OutsidePolicy},
};
use icalign_io::{functional::write_image_any, text};

use crate::{
    config::OutputFormat,
    error::AlignError,
    loader::{Frame, LoadedPair},
    transform::TransformParameters,
};

/// Warp the second image onto the geometry of the first one: `out(x) = second(T(x))`.
///
/// Pixels mapped outside the second image are NaN.
pub fn warp_second_image<const C: usize>(
    second: &Frame<C>,
    params: &TransformParameters,
) -> Result<Image<f32, C>, AlignError> {
    let mut warped = Image::<f32, C>::from_size_val(second.image.size(), 0.0)?;
    warp_perspective_backward(
        &second.image,
        &mut warped,
        params.to_matrix().as_array(),
        InterpolationMode::Bicubic,
        OutsidePolicy::Discard { margin: 0.0 },
    )?;
    Ok(warped)
}

/// Persist the estimated transform.
///
/// # Arguments
///
/// * `format` - What to write.
/// * `file_path` - The destination file.
/// * `params` - The estimated parameters.
/// * `original` - The images as loaded, used by [`OutputFormat::WarpedImage`] with their
///   original channel count.
pub fn write_output(
    format: OutputFormat,
    file_path: &Path,
    params: &TransformParameters,
    original: &LoadedPair,
) -> Result<(), AlignError> {
    match format {
        OutputFormat::Parameters => text::write_parameters_txt(file_path, params.as_slice())?,
        OutputFormat::Matrix => text::write_matrix_txt(file_path, params.to_matrix().as_array())?,
        OutputFormat::WarpedImage => match original {
            LoadedPair::Gray(pair) => {
                write_image_any(file_path, &warp_second_image(&pair.second, params)?)?
            }
            LoadedPair::Rgb(pair) => {
                write_image_any(file_path, &warp_second_image(&pair.second, params)?)?
            }
        },
    }

    log::debug!("wrote {format:?} output to {}", file_path.display());

    Ok(())
}
