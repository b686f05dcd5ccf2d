use icalign::{AlignError, EstimatorConfig, Frame, TransformParameters};
use icalign_image::Image;
use icalign_imgproc::{
    filter::{laplacian, spatial_gradient},
    interpolation::InterpolationMode,
    warp::{warp_perspective_backward, OutsidePolicy},
};
use nalgebra::{DMatrix, DVector};

use crate::{
    pyramid::mask_valid,
    robust::{robust_loss, LambdaSchedule},
};

/// Maximum number of iterations per pyramid level.
pub const MAX_ITERATIONS: usize = 30;

/// Outcome of the estimation on one pyramid level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelResult {
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the increment fell below the tolerance.
    pub converged: bool,
    /// Number of pixels taking part in the last iteration.
    pub valid_pixels: usize,
}

fn prefilter<const C: usize>(
    image: &Image<f32, C>,
    enabled: bool,
) -> Result<Image<f32, C>, AlignError> {
    if !enabled {
        return Ok(image.clone());
    }
    let mut filtered = Image::<f32, C>::from_size_val(image.size(), 0.0)?;
    laplacian(image, &mut filtered)?;
    Ok(filtered)
}

/// Steepest descent images `∇I1 · J(x)`, `nparams` values per pixel and channel.
fn steepest_descent<const C: usize>(
    image: &Image<f32, C>,
    params: &TransformParameters,
    config: &EstimatorConfig,
) -> Result<Vec<f64>, AlignError> {
    let kind = params.kind();
    let n = kind.nparams();
    let width = image.width();

    let mut ix = Image::<f32, C>::from_size_val(image.size(), 0.0)?;
    let mut iy = Image::<f32, C>::from_size_val(image.size(), 0.0)?;
    spatial_gradient(image, &mut ix, &mut iy, config.gradient)?;

    let mut sd = vec![0.0f64; image.size().area() * C * n];
    for (idx, pixel_sd) in sd.chunks_exact_mut(C * n).enumerate() {
        let jacobian = kind.jacobian((idx % width) as f64, (idx / width) as f64);
        for (c, channel_sd) in pixel_sd.chunks_exact_mut(n).enumerate() {
            let gx = ix.as_slice()[idx * C + c] as f64;
            let gy = iy.as_slice()[idx * C + c] as f64;
            for (k, value) in channel_sd.iter_mut().enumerate() {
                *value = gx * jacobian[0][k] + gy * jacobian[1][k];
            }
        }
    }

    Ok(sd)
}

/// Estimate the transform on a single resolution with the inverse compositional algorithm.
///
/// Each iteration warps the second image with the current transform, weights the residuals
/// with the robust function and solves the normal equations for the increment `Δp`. The
/// transform is then updated as `M(p) · M(Δp)⁻¹`. Iterations stop when `|Δp|` falls below the
/// tolerance, when the normal equations are singular, or after [`MAX_ITERATIONS`].
///
/// # Arguments
///
/// * `first` - The reference frame.
/// * `second` - The frame aligned onto the reference, same size as `first`.
/// * `params` - The initial parameters on input, the refined ones on output.
/// * `config` - The estimation settings.
pub fn inverse_compositional<const C: usize>(
    first: &Frame<C>,
    second: &Frame<C>,
    params: &mut TransformParameters,
    config: &EstimatorConfig,
) -> Result<LevelResult, AlignError> {
    let kind = params.kind();
    let n = kind.nparams();

    let i1 = prefilter(&first.image, config.laplacian)?;
    let i2 = prefilter(&second.image, config.laplacian)?;
    let sd = steepest_descent(&i1, params, config)?;

    let outside = if config.discard_boundary {
        OutsidePolicy::Discard {
            margin: config.delta as f32,
        }
    } else {
        OutsidePolicy::Clamp
    };

    let mut warped = Image::<f32, C>::from_size_val(i1.size(), 0.0)?;
    let mut warped_mask = match &second.mask {
        Some(_) => Some(Image::<f32, C>::from_size_val(i1.size(), 0.0)?),
        None => None,
    };

    let mut lambda = LambdaSchedule::new(config.lambda);
    let mut result = LevelResult {
        iterations: 0,
        converged: false,
        valid_pixels: 0,
    };

    while result.iterations < MAX_ITERATIONS {
        result.iterations += 1;

        let matrix = params.to_matrix();
        warp_perspective_backward(
            &i2,
            &mut warped,
            matrix.as_array(),
            InterpolationMode::Bicubic,
            outside,
        )?;
        if let (Some(mask), Some(dst)) = (&second.mask, warped_mask.as_mut()) {
            warp_perspective_backward(
                mask,
                dst,
                matrix.as_array(),
                InterpolationMode::Nearest,
                OutsidePolicy::Clamp,
            )?;
        }

        let loss = robust_loss(config.robust, lambda.current());
        let mut hessian = vec![0.0f64; n * n];
        let mut rhs = vec![0.0f64; n];
        let mut valid_pixels = 0;

        let pixels = warped
            .as_slice()
            .chunks_exact(C)
            .zip(i1.as_slice().chunks_exact(C))
            .zip(sd.chunks_exact(C * n))
            .enumerate();

        for (idx, ((warped_pixel, reference), pixel_sd)) in pixels {
            if warped_pixel.iter().any(|v| v.is_nan())
                || !mask_valid(first.mask.as_ref(), idx)
                || !mask_valid(warped_mask.as_ref(), idx)
            {
                continue;
            }

            let errors: [f64; C] =
                std::array::from_fn(|c| warped_pixel[c] as f64 - reference[c] as f64);
            let weight = loss.weight(errors.iter().map(|e| e * e).sum());
            valid_pixels += 1;

            for (error, g) in errors.iter().zip(pixel_sd.chunks_exact(n)) {
                for a in 0..n {
                    rhs[a] += weight * g[a] * error;
                    for b in 0..n {
                        hessian[a * n + b] += weight * g[a] * g[b];
                    }
                }
            }
        }
        result.valid_pixels = valid_pixels;

        let hessian = DMatrix::from_row_slice(n, n, &hessian);
        let Some(increment) = hessian.lu().solve(&DVector::from_column_slice(&rhs)) else {
            log::debug!("singular normal equations with {valid_pixels} valid pixels");
            break;
        };
        if increment.iter().any(|v| !v.is_finite()) {
            log::debug!("non finite increment with {valid_pixels} valid pixels");
            break;
        }

        let delta = TransformParameters::from_slice(kind, increment.as_slice())?;
        match params.compose_inverse(&delta) {
            Ok(updated) => *params = updated,
            Err(err) => {
                log::debug!("cannot invert the increment: {err}");
                break;
            }
        }

        let norm = increment.norm();
        log::debug!(
            "iteration {}: |dp| = {norm:.3e}, lambda = {:.3}, valid pixels = {valid_pixels}",
            result.iterations,
            lambda.current()
        );

        if norm < config.tolerance {
            result.converged = true;
            break;
        }

        lambda.step();
    }

    Ok(result)
}
