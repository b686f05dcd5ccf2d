use icalign_image::{Image, ImageError};

use super::{kernels, separable_filter};

/// Discrete derivative kernels available for [`spatial_gradient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    /// Central differences `[-0.5, 0, 0.5]`.
    CentralDifferences,
    /// Forward differences averaged over the two neighbouring rows (or columns).
    Hypomode,
    /// Farid 3-tap derivative with its matched prefilter, scaled to unit ramp response.
    Farid3,
    /// Farid 5-tap derivative with its matched prefilter, scaled to unit ramp response.
    Farid5,
    /// Gaussian derivative with sigma 0.3.
    GaussianSigma03,
    /// Gaussian derivative with sigma 0.6.
    GaussianSigma06,
}

impl GradientKind {
    /// The derivative and smoothing kernels of the gradient operator.
    ///
    /// # Returns
    ///
    /// A tuple `(derivative, smoothing)`. The derivative runs along the gradient direction and
    /// the smoothing along the other one.
    pub fn kernels(&self) -> (Vec<f32>, Vec<f32>) {
        match self {
            GradientKind::CentralDifferences => (vec![-0.5, 0.0, 0.5], vec![1.0]),
            GradientKind::Hypomode => (vec![-1.0, 1.0], vec![0.5, 0.5]),
            GradientKind::Farid3 => unit_ramp(kernels::farid3_kernel_1d()),
            GradientKind::Farid5 => unit_ramp(kernels::farid5_kernel_1d()),
            GradientKind::GaussianSigma03 => gaussian_pair(0.3),
            GradientKind::GaussianSigma06 => gaussian_pair(0.6),
        }
    }
}

fn unit_ramp((mut derivative, smoothing): (Vec<f32>, Vec<f32>)) -> (Vec<f32>, Vec<f32>) {
    kernels::normalize_derivative_kernel(&mut derivative);
    (derivative, smoothing)
}

fn gaussian_pair(sigma: f32) -> (Vec<f32>, Vec<f32>) {
    let radius = ((3.0 * sigma).ceil() as usize).max(1);
    let size = 2 * radius + 1;
    (
        kernels::gaussian_derivative_kernel_1d(size, sigma),
        kernels::gaussian_kernel_1d(size, sigma),
    )
}

/// Blur an image using a gaussian blur filter
///
/// The kernel covers three sigmas on each side of the center.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn gaussian_blur<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    sigma: f32,
) -> Result<(), ImageError> {
    let radius = ((3.0 * sigma).ceil() as usize).max(1);
    let kernel = kernels::gaussian_kernel_1d(2 * radius + 1, sigma);
    separable_filter(src, dst, &kernel, &kernel)?;
    Ok(())
}

/// Compute the spatial gradient of an image.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dx` - The horizontal derivative with shape (H, W, C).
/// * `dy` - The vertical derivative with shape (H, W, C).
/// * `kind` - The derivative kernel to use.
///
/// PRECONDITION: `src`, `dx` and `dy` must have the same shape.
pub fn spatial_gradient<const C: usize>(
    src: &Image<f32, C>,
    dx: &mut Image<f32, C>,
    dy: &mut Image<f32, C>,
    kind: GradientKind,
) -> Result<(), ImageError> {
    let (derivative, smoothing) = kind.kernels();
    separable_filter(src, dx, &derivative, &smoothing)?;
    separable_filter(src, dy, &smoothing, &derivative)?;
    Ok(())
}

/// Compute the 5-point Laplacian of an image with replicated borders.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn laplacian<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    let src_data = src.as_slice();
    let at = |x: usize, y: usize, c: usize| src_data[(y * cols + x) * C + c];

    for (i, dst_pixel) in dst.as_slice_mut().chunks_exact_mut(C).enumerate() {
        let (x, y) = (i % cols, i / cols);
        let (xl, xr) = (x.saturating_sub(1), (x + 1).min(cols - 1));
        let (yu, yd) = (y.saturating_sub(1), (y + 1).min(rows - 1));
        for (c, out) in dst_pixel.iter_mut().enumerate() {
            *out = at(xl, y, c) + at(xr, y, c) + at(x, yu, c) + at(x, yd, c) - 4.0 * at(x, y, c);
        }
    }

    Ok(())
}
