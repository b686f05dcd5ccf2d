#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Single level inverse compositional solver.
pub mod inverse_compositional;

/// Image and mask pyramids.
pub mod pyramid;

/// Robust error functions and the automatic robust scale.
pub mod robust;

use icalign::{AlignError, EstimatorConfig, ImagePair, TransformEstimator, TransformParameters};

pub use crate::inverse_compositional::{inverse_compositional, LevelResult, MAX_ITERATIONS};

/// Coarse to fine estimator running the inverse compositional algorithm on every pyramid level.
///
/// The parameters given to [`TransformEstimator::estimate`] and returned by it are expressed
/// at full resolution. They are scaled down to the coarsest level first, refined on each level
/// down to `first_scale`, and scaled back up at the end.
///
/// # Example
///
/// ```no_run
/// use icalign::{AlignConfig, AlignOptions, ImageRef};
/// use icalign_estimator::InverseCompositional;
///
/// let config = AlignConfig::from_options(
///     ImageRef::new("first.tif"),
///     ImageRef::new("second.tif"),
///     AlignOptions::default(),
/// );
///
/// let params = icalign::run(&config, &InverseCompositional).unwrap();
/// println!("{:?}", params.as_slice());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct InverseCompositional;

impl TransformEstimator for InverseCompositional {
    fn estimate<const C: usize>(
        &self,
        images: &ImagePair<C>,
        params: &mut TransformParameters,
        config: &EstimatorConfig,
    ) -> Result<(), AlignError> {
        let levels = config.pyramid.levels;
        let zoom = config.pyramid.zoom_factor;

        if levels == 0 || config.first_scale >= levels {
            return Err(AlignError::EstimationFailed(format!(
                "first scale {} is not within the {levels} pyramid levels",
                config.first_scale
            )));
        }

        let first = pyramid::build_pyramid(&images.first, &config.pyramid)?;
        let second = pyramid::build_pyramid(&images.second, &config.pyramid)?;

        *params = params.rescaled(zoom.powi(levels as i32 - 1));

        for scale in (config.first_scale..levels).rev() {
            let result = inverse_compositional(&first[scale], &second[scale], params, config)?;

            if config.verbose {
                log::info!(
                    "Scale {scale}: {} iterations, converged={}, valid pixels={}, params={:?}",
                    result.iterations,
                    result.converged,
                    result.valid_pixels,
                    params.as_slice()
                );
            } else {
                log::debug!("scale {scale}: {result:?}");
            }

            if scale > config.first_scale {
                *params = params.rescaled(1.0 / zoom);
            }
        }

        *params = params.rescaled(zoom.powi(-(config.first_scale as i32)));

        Ok(())
    }
}
