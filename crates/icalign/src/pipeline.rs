use std::time::Instant;

use crate::{
    config::AlignConfig,
    error::AlignError,
    estimator::{EstimatorConfig, TransformEstimator},
    grayscale::reduce_pair,
    loader::{load_pair, LoadedPair},
    output::write_output,
    pyramid::PyramidSpec,
    transform::TransformParameters,
};

/// Run a complete alignment: load, optionally reduce to grayscale, estimate and persist.
///
/// # Arguments
///
/// * `config` - The validated configuration of the run.
/// * `estimator` - The motion estimator.
///
/// # Returns
///
/// The estimated parameters, already written to `config.output_file`.
///
/// # Errors
///
/// Fails without writing anything if the images cannot be loaded or do not share their
/// geometry, or if the estimator fails.
pub fn run<E: TransformEstimator>(
    config: &AlignConfig,
    estimator: &E,
) -> Result<TransformParameters, AlignError> {
    let loaded = load_pair(&config.first, &config.second)?;
    let geometry = loaded.geometry();

    let pyramid = PyramidSpec::resolve(
        [geometry.width, geometry.height].into(),
        config.nscales,
        config.zoom_factor,
    );

    if config.verbose {
        log::info!("Parameters: scales={}, {}", pyramid.levels, config);
    }

    let mut params = TransformParameters::from_seeds(config.transform_type, &config.seeds);
    let estimator_config = EstimatorConfig::new(config, pyramid);

    let start = Instant::now();
    match &loaded {
        LoadedPair::Gray(pair) => estimator.estimate(pair, &mut params, &estimator_config)?,
        LoadedPair::Rgb(pair) if config.grayscale => {
            let gray = reduce_pair(pair)?;
            estimator.estimate(&gray, &mut params, &estimator_config)?;
        }
        LoadedPair::Rgb(pair) => estimator.estimate(pair, &mut params, &estimator_config)?,
    }

    if config.verbose {
        log::info!("Time={:.6}", start.elapsed().as_secs_f64());
    }

    write_output(config.output_format, &config.output_file, &params, &loaded)?;

    if config.verbose {
        let matrix = params.to_matrix();
        let entries = matrix
            .as_array()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>();
        log::info!("Transform: {}", entries.join(" "));
    }

    Ok(params)
}
