use crate::interpolation::{interpolate_pixel, InterpolationMode};

use icalign_image::{Image, ImageError};

/// What to write for destination pixels whose source location falls outside the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutsidePolicy {
    /// Write NaN when the source location is closer than `margin` pixels to the image border,
    /// or outside it.
    Discard {
        /// Distance to the border, in pixels, below which a location is discarded.
        margin: f32,
    },
    /// Sample anyway, replicating the border pixels.
    Clamp,
}

/// Map a point through a 3x3 homogeneous matrix stored row-major.
///
/// # Arguments
///
/// * `x` - The x coordinate of the point.
/// * `y` - The y coordinate of the point.
/// * `m` - The 3x3 matrix.
///
/// # Returns
///
/// The mapped point after the perspective division.
pub fn transform_point(x: f64, y: f64, m: &[f64; 9]) -> (f64, f64) {
    let w = m[6] * x + m[7] * y + m[8];
    let xt = (m[0] * x + m[1] * y + m[2]) / w;
    let yt = (m[3] * x + m[4] * y + m[5]) / w;
    (xt, yt)
}

/// Backward-warp an image through a perspective transformation.
///
/// Every destination pixel `x` receives `src(m · x)`, so `m` maps destination coordinates to
/// source coordinates and is used as is, without inversion.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (new_height, new_width, channels).
/// * `m` - The 3x3 perspective transformation matrix dst -> src, row-major.
/// * `interpolation` - The interpolation mode to use.
/// * `outside` - The policy for source locations outside the image.
///
/// # Example
///
/// ```
/// use icalign_image::{Image, ImageSize};
/// use icalign_imgproc::interpolation::InterpolationMode;
/// use icalign_imgproc::warp::{warp_perspective_backward, OutsidePolicy};
///
/// let src = Image::<f32, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 1,
///   },
///   vec![0.0, 1.0, 2.0]
/// ).unwrap();
///
/// // shift one pixel to the left
/// let m = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
///
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// warp_perspective_backward(
///   &src,
///   &mut dst,
///   &m,
///   InterpolationMode::Bicubic,
///   OutsidePolicy::Discard { margin: 0.0 },
/// ).unwrap();
///
/// assert_eq!(&dst.as_slice()[..2], &[1.0, 2.0]);
/// assert!(dst.as_slice()[2].is_nan());
/// ```
pub fn warp_perspective_backward<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f64; 9],
    interpolation: InterpolationMode,
    outside: OutsidePolicy,
) -> Result<(), ImageError> {
    if src.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let dst_cols = dst.cols();
    let (max_x, max_y) = ((src.cols() - 1) as f64, (src.rows() - 1) as f64);

    dst.as_slice_mut()
        .chunks_exact_mut(C)
        .enumerate()
        .for_each(|(i, dst_pixel)| {
            let (x, y) = ((i % dst_cols) as f64, (i / dst_cols) as f64);
            let (u, v) = transform_point(x, y, m);

            let inside = match outside {
                OutsidePolicy::Discard { margin } => {
                    let margin = margin as f64;
                    u >= margin && u <= max_x - margin && v >= margin && v <= max_y - margin
                }
                OutsidePolicy::Clamp => u.is_finite() && v.is_finite(),
            };

            if inside {
                dst_pixel.iter_mut().enumerate().for_each(|(k, pixel)| {
                    *pixel = interpolate_pixel(src, u as f32, v as f32, k, interpolation)
                });
            } else {
                dst_pixel.iter_mut().for_each(|pixel| *pixel = f32::NAN);
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use icalign_image::ImageSize;

    #[test]
    fn transform_point() {
        let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let (x, y) = super::transform_point(1.0, 1.0, &m);
        assert_eq!((x, y), (0.0, 2.0));

        // homogeneous division
        let m = [2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0];
        assert_eq!(super::transform_point(3.0, 5.0, &m), (3.0, 5.0));
    }

    #[test]
    fn warp_perspective_identity() -> Result<(), ImageError> {
        let image = Image::<f32, 3>::from_fn(
            ImageSize {
                width: 4,
                height: 5,
            },
            |x, y, c| (x * 3 + y * 11 + c) as f32,
        );

        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let mut image_transformed = Image::from_size_val(image.size(), 0.0)?;

        warp_perspective_backward(
            &image,
            &mut image_transformed,
            &m,
            InterpolationMode::Bicubic,
            OutsidePolicy::Discard { margin: 0.0 },
        )?;

        assert_eq!(image_transformed, image);

        Ok(())
    }

    #[test]
    fn warp_perspective_hflip() -> Result<(), ImageError> {
        let image = Image::<_, 1>::new(
            ImageSize {
                width: 2,
                height: 3,
            },
            vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0],
        )?;

        let image_expected = vec![1.0, 0.0, 3.0, 2.0, 5.0, 4.0];

        // flip matrix
        let m = [-1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let mut image_transformed = Image::<_, 1>::from_size_val(image.size(), 0.0f32)?;

        warp_perspective_backward(
            &image,
            &mut image_transformed,
            &m,
            InterpolationMode::Nearest,
            OutsidePolicy::Clamp,
        )?;

        assert_eq!(image_transformed.as_slice(), image_expected);

        Ok(())
    }

    #[test]
    fn warp_perspective_discard_margin() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_fn([6, 6].into(), |x, _, _| x as f32);
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

        let mut discarded = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        warp_perspective_backward(
            &image,
            &mut discarded,
            &m,
            InterpolationMode::Bicubic,
            OutsidePolicy::Discard { margin: 2.0 },
        )?;

        let valid = discarded.as_slice().iter().filter(|v| !v.is_nan()).count();
        assert_eq!(valid, 4);
        assert_eq!(discarded.get([2, 3, 0]), Some(&3.0));

        let mut clamped = Image::<f32, 1>::from_size_val(image.size(), 0.0)?;
        let shift = [1.0, 0.0, -10.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        warp_perspective_backward(
            &image,
            &mut clamped,
            &shift,
            InterpolationMode::Bicubic,
            OutsidePolicy::Clamp,
        )?;
        assert!(clamped.as_slice().iter().all(|&v| v == 0.0));

        Ok(())
    }

    #[test]
    fn warp_perspective_clamp_far_coordinates() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::from_fn([8, 8].into(), |x, y, _| (x + 8 * y) as f32);

        // w close to zero sends every pixel far away from the image
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1e-20];

        for mode in [InterpolationMode::Bicubic, InterpolationMode::Nearest] {
            let mut warped = Image::<f32, 1>::from_size_val(image.size(), -1.0)?;
            warp_perspective_backward(&image, &mut warped, &m, mode, OutsidePolicy::Clamp)?;

            // the origin maps to 0 / 1e-20, the other pixels to the far corners
            assert_eq!(warped.get([0, 0, 0]), Some(&0.0));
            assert_eq!(warped.get([7, 7, 0]), Some(&63.0));
            assert_eq!(warped.get([0, 7, 0]), Some(&7.0));
            assert!(warped.as_slice().iter().all(|v| image.as_slice().contains(v)));
        }

        Ok(())
    }
}
