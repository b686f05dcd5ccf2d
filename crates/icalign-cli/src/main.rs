use std::{io::Write, path::PathBuf, process::ExitCode};

use argh::FromArgs;
use icalign::{
    config::{self, seeds_from_env},
    AlignConfig, AlignError, AlignOptions, ImageRef, TransformParameters,
};
use icalign_estimator::InverseCompositional;

/// Estimate the parametric transform that aligns the second image onto the first.
///
/// Initial parameter values are read from the environment variables P0 to P7.
#[derive(Debug, FromArgs)]
struct Args {
    /// first image, optionally followed by `:mask`
    #[argh(positional)]
    image1: String,

    /// second image, optionally followed by `:mask`
    #[argh(positional)]
    image2: String,

    /// output file
    #[argh(option, short = 'f', default = "PathBuf::from(config::DEFAULT_OUTPUT_FILE)")]
    output_file: PathBuf,

    /// output: 0 parameters, 1 matrix, 2 warped second image
    #[argh(option, short = 'o', default = "config::DEFAULT_OUTPUT_FORMAT")]
    output_format: i32,

    /// number of scales, automatic when zero or less
    #[argh(option, short = 'n', default = "config::DEFAULT_NSCALES")]
    nscales: i32,

    /// zoom factor between scales
    #[argh(option, short = 'z', default = "config::DEFAULT_ZOOM_FACTOR")]
    zoom_factor: f64,

    /// stopping criterion threshold
    #[argh(option, short = 'e', default = "config::DEFAULT_TOLERANCE")]
    tolerance: f64,

    /// transform: 2 translation, 3 euclidean, 4 similarity, 6 affinity, 8 homography
    #[argh(option, short = 't', default = "config::DEFAULT_NPARAMS")]
    nparams: i32,

    /// robust function: 0 quadratic, 1 truncated quadratic, 2 Geman-McClure, 3 Lorentzian, 4 Charbonnier
    #[argh(option, short = 'r', default = "config::DEFAULT_ROBUST")]
    robust: i32,

    /// robust scale, automatic when zero
    #[argh(option, short = 'l', default = "config::DEFAULT_LAMBDA")]
    lambda: f64,

    /// first scale used in the pyramid
    #[argh(option, short = 's', default = "config::DEFAULT_FIRST_SCALE")]
    first_scale: i32,

    /// convert color images to grayscale: 0 no, 1 yes
    #[argh(option, short = 'c', default = "config::DEFAULT_GRAYSCALE")]
    grayscale: i32,

    /// distance to the boundary, in pixels
    #[argh(option, short = 'd', default = "config::DEFAULT_DELTA")]
    delta: i32,

    /// discard pixels warped close to the boundary: 0 no, 1 yes
    #[argh(option, short = 'p', default = "config::DEFAULT_DISCARD_BOUNDARY")]
    discard_boundary: i32,

    /// gradient: 0 central differences, 1 hypomode, 2 Farid 3x3, 3 Farid 5x5, 4 sigma 0.3, 5 sigma 0.6
    #[argh(option, short = 'g', default = "config::DEFAULT_GRADIENT")]
    gradient: i32,

    /// apply the Laplacian at each scale when nonzero
    #[argh(option, short = 'L', default = "0")]
    laplacian: i32,

    /// report the parameters, the time and the transform
    #[argh(switch, short = 'v')]
    verbose: bool,
}

impl Args {
    fn options(&self) -> AlignOptions {
        AlignOptions {
            output_file: self.output_file.clone(),
            output_format: self.output_format,
            nscales: self.nscales,
            zoom_factor: self.zoom_factor,
            tolerance: self.tolerance,
            nparams: self.nparams,
            robust: self.robust,
            lambda: self.lambda,
            first_scale: self.first_scale,
            grayscale: self.grayscale,
            delta: self.delta,
            discard_boundary: self.discard_boundary,
            gradient: self.gradient,
            laplacian: self.laplacian,
            verbose: self.verbose,
            seeds: seeds_from_env(),
        }
    }
}

/// Parse the image references and run the alignment.
fn align(args: &Args) -> Result<TransformParameters, AlignError> {
    let first = args.image1.parse::<ImageRef>()?;
    let second = args.image2.parse::<ImageRef>()?;
    let config = AlignConfig::from_options(first, second, args.options());
    icalign::run(&config, &InverseCompositional)
}

/// Report a failed run and map it to the process exit status.
fn exit_code(result: Result<TransformParameters, AlignError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => {
            log::error!("{e}");
            1
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .target(env_logger::Target::Stdout)
        .init();

    let args: Args = argh::from_env();

    ExitCode::from(exit_code(align(&args)))
}
