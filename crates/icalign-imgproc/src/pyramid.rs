use crate::filter::gaussian_blur;
use crate::interpolation::{interpolate_pixel, InterpolationMode};
use icalign_image::{Image, ImageError, ImageSize};

/// Size of one side after zooming out by `factor`, rounded to the nearest pixel.
///
/// Never returns less than one pixel.
pub fn zoom_size(side: usize, factor: f32) -> usize {
    ((side as f32 * factor + 0.5) as usize).max(1)
}

/// Standard deviation of the presmoothing applied before zooming out by `factor`.
pub fn zoom_sigma(factor: f32) -> f32 {
    0.6 * (1.0 / (factor * factor) - 1.0).sqrt()
}

/// Downsample an image by a zoom factor in (0, 1).
///
/// The source is smoothed with a gaussian of sigma [`zoom_sigma`] and then resampled with
/// bicubic interpolation, destination pixel `(x, y)` reading the source at `(x / z, y / z)`.
///
/// # Arguments
///
/// * `src` - The source image to be downsampled.
/// * `dst` - The destination image, of size [`zoom_size`] of the source along each side.
/// * `factor` - The zoom factor.
///
/// # Example
///
/// ```
/// use icalign_image::{Image, ImageSize};
/// use icalign_imgproc::pyramid::{zoom_out, zoom_size};
///
/// let image = Image::<f32, 1>::from_size_val(
///     ImageSize {
///         width: 9,
///         height: 4,
///     },
///     1.0,
/// ).unwrap();
///
/// let size = ImageSize {
///     width: zoom_size(9, 0.5),
///     height: zoom_size(4, 0.5),
/// };
/// let mut downsampled = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// zoom_out(&image, &mut downsampled, 0.5).unwrap();
/// assert_eq!(downsampled.width(), 5);
/// assert_eq!(downsampled.height(), 2);
/// ```
pub fn zoom_out<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    factor: f32,
) -> Result<(), ImageError> {
    let expected = ImageSize {
        width: zoom_size(src.width(), factor),
        height: zoom_size(src.height(), factor),
    };

    if dst.size() != expected {
        return Err(ImageError::InvalidImageSize(
            expected.width,
            expected.height,
            dst.width(),
            dst.height(),
        ));
    }

    let mut smoothed = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    gaussian_blur(src, &mut smoothed, zoom_sigma(factor))?;

    let dst_cols = dst.cols();
    dst.as_slice_mut()
        .chunks_exact_mut(C)
        .enumerate()
        .for_each(|(i, dst_pixel)| {
            let u = (i % dst_cols) as f32 / factor;
            let v = (i / dst_cols) as f32 / factor;
            dst_pixel.iter_mut().enumerate().for_each(|(k, pixel)| {
                *pixel = interpolate_pixel(&smoothed, u, v, k, InterpolationMode::Bicubic)
            });
        });

    Ok(())
}
