use icalign_image::Image;

/// Kernel for nearest neighbor interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `c` - The channel of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel value.
pub(crate) fn nearest_neighbor_interpolation<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    c: usize,
) -> f32 {
    let (rows, cols) = (image.rows(), image.cols());

    // float to int casts saturate, negative coordinates land on 0
    let iu = (u.round() as usize).min(cols - 1);
    let iv = (v.round() as usize).min(rows - 1);

    image.as_slice()[(iv * cols + iu) * C + c]
}

#[cfg(test)]
mod tests {
    use icalign_image::{Image, ImageError};

    #[test]
    fn nearest_clamps_to_border() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new([2, 2].into(), vec![1.0, 2.0, 3.0, 4.0])?;
        assert_eq!(super::nearest_neighbor_interpolation(&image, 0.6, 0.2, 0), 2.0);
        assert_eq!(super::nearest_neighbor_interpolation(&image, -3.0, 9.0, 0), 3.0);
        Ok(())
    }
}
