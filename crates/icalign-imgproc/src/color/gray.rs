use icalign_image::{Image, ImageError};

/// Convert an RGB image to grayscale averaging the three channels:
///
/// Y = (R + G + B) / 3
///
/// The three channels are weighted equally, not with perceptual luma weights.
///
/// # Arguments
///
/// * `src` - The input RGB image.
/// * `dst` - The output grayscale image.
///
/// Precondition: the input and output images must have the same size.
///
/// # Example
///
/// ```
/// use icalign_image::{Image, ImageSize};
/// use icalign_imgproc::color::gray_from_rgb_mean;
///
/// let image = Image::<f32, 3>::new(
///     ImageSize {
///         width: 1,
///         height: 1,
///     },
///     vec![3.0, 6.0, 9.0],
/// )
/// .unwrap();
///
/// let mut gray = Image::<f32, 1>::from_size_val(image.size(), 0.0).unwrap();
///
/// gray_from_rgb_mean(&image, &mut gray).unwrap();
/// assert_eq!(gray.as_slice(), &[6.0]);
/// ```
pub fn gray_from_rgb_mean(src: &Image<f32, 3>, dst: &mut Image<f32, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    src.as_slice()
        .chunks_exact(3)
        .zip(dst.as_slice_mut().iter_mut())
        .for_each(|(src_pixel, dst_pixel)| {
            *dst_pixel = (src_pixel[0] + src_pixel[1] + src_pixel[2]) / 3.0;
        });

    Ok(())
}
