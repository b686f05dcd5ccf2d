use icalign_imgproc::filter::GradientKind;

use crate::{
    config::{AlignConfig, RobustFunction},
    error::AlignError,
    loader::ImagePair,
    pyramid::PyramidSpec,
    transform::{TransformParameters, TransformType},
};

/// Everything an estimator needs besides the images and the initial parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    /// The motion model.
    pub transform_type: TransformType,
    /// The pyramid to estimate on.
    pub pyramid: PyramidSpec,
    /// Stop iterating when the norm of the increment falls below this value.
    pub tolerance: f64,
    /// The robust error function.
    pub robust: RobustFunction,
    /// Robust scale, zero for automatic.
    pub lambda: f64,
    /// Finest pyramid level processed, lower than `pyramid.levels`.
    pub first_scale: usize,
    /// Discard pixels warped closer than `delta` to the boundary.
    pub discard_boundary: bool,
    /// Distance to the boundary, in pixels.
    pub delta: usize,
    /// Gradient kernel.
    pub gradient: GradientKind,
    /// Laplacian prefiltering of both images.
    pub laplacian: bool,
    /// Emit per level diagnostics.
    pub verbose: bool,
}

impl EstimatorConfig {
    /// Build the estimator configuration of a run.
    ///
    /// The first scale is clamped to the coarsest level of `pyramid`.
    pub fn new(config: &AlignConfig, pyramid: PyramidSpec) -> Self {
        let coarsest = pyramid.levels.saturating_sub(1);
        if config.first_scale > coarsest {
            log::debug!(
                "first scale {} is beyond the coarsest level, using {coarsest}",
                config.first_scale
            );
        }

        Self {
            transform_type: config.transform_type,
            pyramid,
            tolerance: config.tolerance,
            robust: config.robust,
            lambda: config.lambda,
            first_scale: config.first_scale.min(coarsest),
            discard_boundary: config.discard_boundary,
            delta: config.delta,
            gradient: config.gradient,
            laplacian: config.laplacian,
            verbose: config.verbose,
        }
    }
}

/// A parametric motion estimator.
///
/// Implementors estimate the transform `T` such that `second(T(x))` matches `first(x)`,
/// refining the parameters they receive.
pub trait TransformEstimator {
    /// Estimate the transform aligning the second frame of `images` onto the first one.
    ///
    /// # Arguments
    ///
    /// * `images` - The frames, with their optional masks.
    /// * `params` - The initial parameters on input, the estimated ones on output.
    /// * `config` - The estimation settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the estimation cannot run. Lack of convergence is not an error.
    fn estimate<const C: usize>(
        &self,
        images: &ImagePair<C>,
        params: &mut TransformParameters,
        config: &EstimatorConfig,
    ) -> Result<(), AlignError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlignOptions, ImageRef};

    #[test]
    fn first_scale_is_clamped() {
        let config = AlignConfig::from_options(
            ImageRef::new("a.png"),
            ImageRef::new("b.png"),
            AlignOptions {
                first_scale: 9,
                ..Default::default()
            },
        );
        let pyramid = PyramidSpec {
            levels: 3,
            zoom_factor: 0.5,
        };

        let estimator_config = EstimatorConfig::new(&config, pyramid);
        assert_eq!(estimator_config.first_scale, 2);
        assert_eq!(estimator_config.transform_type, TransformType::Homography);
    }
}
