use std::path::PathBuf;

use icalign_imgproc::filter::GradientKind;

use crate::{image_ref::ImageRef, transform::TransformType};

/// Default number of pyramid levels, zero selects the maximum allowed by the image size.
pub const DEFAULT_NSCALES: i32 = 0;
/// Default zoom factor between pyramid levels.
pub const DEFAULT_ZOOM_FACTOR: f64 = 0.5;
/// Default stopping threshold on the norm of the parameter increment.
pub const DEFAULT_TOLERANCE: f64 = 0.001;
/// Default number of transform parameters.
pub const DEFAULT_NPARAMS: i32 = 8;
/// Default robust error function code.
pub const DEFAULT_ROBUST: i32 = 3;
/// Default robust scale, zero selects the automatic schedule.
pub const DEFAULT_LAMBDA: f64 = 0.0;
/// Default first (finest) pyramid level processed.
pub const DEFAULT_FIRST_SCALE: i32 = 0;
/// Default grayscale conversion flag.
pub const DEFAULT_GRAYSCALE: i32 = 1;
/// Default distance to the boundary, in pixels.
pub const DEFAULT_DELTA: i32 = 5;
/// Default boundary discard flag.
pub const DEFAULT_DISCARD_BOUNDARY: i32 = 1;
/// Default gradient kernel code.
pub const DEFAULT_GRADIENT: i32 = 3;
/// Default output format code.
pub const DEFAULT_OUTPUT_FORMAT: i32 = 0;
/// Default output file name.
pub const DEFAULT_OUTPUT_FILE: &str = "transform.mat";

/// Outlier tolerant error functions used to weight the residuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobustFunction {
    /// Plain least squares.
    Quadratic,
    /// Least squares up to `λ`, constant beyond.
    TruncatedQuadratic,
    /// Geman-McClure.
    GemanMcClure,
    /// Lorentzian.
    Lorentzian,
    /// Charbonnier.
    Charbonnier,
}

impl RobustFunction {
    /// Get the robust function from its command line code, `0..=4`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(RobustFunction::Quadratic),
            1 => Some(RobustFunction::TruncatedQuadratic),
            2 => Some(RobustFunction::GemanMcClure),
            3 => Some(RobustFunction::Lorentzian),
            4 => Some(RobustFunction::Charbonnier),
            _ => None,
        }
    }

    /// The command line code of the robust function.
    pub fn code(&self) -> i32 {
        match self {
            RobustFunction::Quadratic => 0,
            RobustFunction::TruncatedQuadratic => 1,
            RobustFunction::GemanMcClure => 2,
            RobustFunction::Lorentzian => 3,
            RobustFunction::Charbonnier => 4,
        }
    }
}

/// How the estimated transform is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The raw parameter vector.
    Parameters,
    /// The 3x3 matrix of the transform.
    Matrix,
    /// The second image warped onto the first one.
    WarpedImage,
}

impl OutputFormat {
    /// Get the output format from its command line code, `0..=2`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OutputFormat::Parameters),
            1 => Some(OutputFormat::Matrix),
            2 => Some(OutputFormat::WarpedImage),
            _ => None,
        }
    }

    /// The command line code of the output format.
    pub fn code(&self) -> i32 {
        match self {
            OutputFormat::Parameters => 0,
            OutputFormat::Matrix => 1,
            OutputFormat::WarpedImage => 2,
        }
    }
}

/// Get the gradient kernel from its command line code, `0..=5`.
pub fn gradient_from_code(code: i32) -> Option<GradientKind> {
    match code {
        0 => Some(GradientKind::CentralDifferences),
        1 => Some(GradientKind::Hypomode),
        2 => Some(GradientKind::Farid3),
        3 => Some(GradientKind::Farid5),
        4 => Some(GradientKind::GaussianSigma03),
        5 => Some(GradientKind::GaussianSigma06),
        _ => None,
    }
}

/// The command line code of a gradient kernel.
pub fn gradient_code(kind: GradientKind) -> i32 {
    match kind {
        GradientKind::CentralDifferences => 0,
        GradientKind::Hypomode => 1,
        GradientKind::Farid3 => 2,
        GradientKind::Farid5 => 3,
        GradientKind::GaussianSigma03 => 4,
        GradientKind::GaussianSigma06 => 5,
    }
}

/// Read the initial parameter values from the environment variables `P0` to `P7`.
///
/// Unset or unparsable variables give zero.
pub fn seeds_from_env() -> [f64; 8] {
    std::array::from_fn(|i| {
        let name = format!("P{i}");
        match std::env::var(&name).ok().map(|v| v.trim().parse::<f64>()) {
            Some(Ok(value)) => {
                log::debug!("seed {name} = {value}");
                value
            }
            Some(Err(_)) => {
                log::debug!("seed {name} is not a number, using 0");
                0.0
            }
            None => 0.0,
        }
    })
}

/// The raw, unvalidated alignment options, as typed on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignOptions {
    /// Output file.
    pub output_file: PathBuf,
    /// Output format code.
    pub output_format: i32,
    /// Number of pyramid levels, zero or less for automatic.
    pub nscales: i32,
    /// Zoom factor between pyramid levels.
    pub zoom_factor: f64,
    /// Stopping threshold.
    pub tolerance: f64,
    /// Number of transform parameters.
    pub nparams: i32,
    /// Robust error function code.
    pub robust: i32,
    /// Robust scale.
    pub lambda: f64,
    /// First (finest) pyramid level processed.
    pub first_scale: i32,
    /// Grayscale conversion flag.
    pub grayscale: i32,
    /// Distance to the boundary, in pixels.
    pub delta: i32,
    /// Boundary discard flag.
    pub discard_boundary: i32,
    /// Gradient kernel code.
    pub gradient: i32,
    /// Laplacian prefiltering, enabled when nonzero.
    pub laplacian: i32,
    /// Report the effective configuration, timing and result.
    pub verbose: bool,
    /// Initial parameter values.
    pub seeds: [f64; 8],
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            output_format: DEFAULT_OUTPUT_FORMAT,
            nscales: DEFAULT_NSCALES,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
            nparams: DEFAULT_NPARAMS,
            robust: DEFAULT_ROBUST,
            lambda: DEFAULT_LAMBDA,
            first_scale: DEFAULT_FIRST_SCALE,
            grayscale: DEFAULT_GRAYSCALE,
            delta: DEFAULT_DELTA,
            discard_boundary: DEFAULT_DISCARD_BOUNDARY,
            gradient: DEFAULT_GRADIENT,
            laplacian: 0,
            verbose: false,
            seeds: [0.0; 8],
        }
    }
}

/// The validated configuration of one alignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    /// The reference image.
    pub first: ImageRef,
    /// The image aligned onto the reference.
    pub second: ImageRef,
    /// Output file.
    pub output_file: PathBuf,
    /// Output format.
    pub output_format: OutputFormat,
    /// Requested number of pyramid levels, `None` for automatic.
    pub nscales: Option<usize>,
    /// Zoom factor between pyramid levels, in (0, 1).
    pub zoom_factor: f64,
    /// Stopping threshold, non negative.
    pub tolerance: f64,
    /// The motion model.
    pub transform_type: TransformType,
    /// The robust error function.
    pub robust: RobustFunction,
    /// Robust scale, zero for automatic.
    pub lambda: f64,
    /// First (finest) pyramid level processed.
    pub first_scale: usize,
    /// Convert three channel inputs to grayscale before estimating.
    pub grayscale: bool,
    /// Distance to the boundary, in pixels.
    pub delta: usize,
    /// Discard pixels warped closer than `delta` to the boundary.
    pub discard_boundary: bool,
    /// Gradient kernel.
    pub gradient: GradientKind,
    /// Laplacian prefiltering.
    pub laplacian: bool,
    /// Report the effective configuration, timing and result.
    pub verbose: bool,
    /// Initial parameter values.
    pub seeds: [f64; 8],
}

fn replaced<T: std::fmt::Display, U: std::fmt::Display>(name: &str, given: T, used: U) {
    log::debug!("{name} {given} is out of range, using {used}");
}

fn flag(name: &str, value: i32, default: i32) -> bool {
    match value {
        0 => false,
        1 => true,
        other => {
            replaced(name, other, default);
            default != 0
        }
    }
}

impl AlignConfig {
    /// Validate the options of a run.
    ///
    /// Values out of range are replaced by their defaults, never rejected.
    ///
    /// # Arguments
    ///
    /// * `first` - The reference image.
    /// * `second` - The image aligned onto the reference.
    /// * `options` - The raw options.
    ///
    /// # Examples
    ///
    /// ```
    /// use icalign::{AlignConfig, AlignOptions, ImageRef};
    /// use icalign::transform::TransformType;
    ///
    /// let options = AlignOptions {
    ///     nparams: 5,
    ///     zoom_factor: 1.5,
    ///     ..Default::default()
    /// };
    /// let config = AlignConfig::from_options(ImageRef::new("a.png"), ImageRef::new("b.png"), options);
    ///
    /// assert_eq!(config.transform_type, TransformType::Homography);
    /// assert_eq!(config.zoom_factor, 0.5);
    /// ```
    pub fn from_options(first: ImageRef, second: ImageRef, options: AlignOptions) -> Self {
        let zoom_factor = if options.zoom_factor > 0.0 && options.zoom_factor < 1.0 {
            options.zoom_factor
        } else {
            replaced("zoom factor", options.zoom_factor, DEFAULT_ZOOM_FACTOR);
            DEFAULT_ZOOM_FACTOR
        };

        let tolerance = if options.tolerance >= 0.0 {
            options.tolerance
        } else {
            replaced("tolerance", options.tolerance, DEFAULT_TOLERANCE);
            DEFAULT_TOLERANCE
        };

        let default_type = TransformType::Homography;
        let transform_type = usize::try_from(options.nparams)
            .ok()
            .and_then(TransformType::from_nparams)
            .unwrap_or_else(|| {
                replaced("number of parameters", options.nparams, DEFAULT_NPARAMS);
                default_type
            });

        let robust = RobustFunction::from_code(options.robust).unwrap_or_else(|| {
            replaced("robust function", options.robust, DEFAULT_ROBUST);
            RobustFunction::Lorentzian
        });

        let lambda = if options.lambda >= 0.0 {
            options.lambda
        } else {
            replaced("lambda", options.lambda, DEFAULT_LAMBDA);
            DEFAULT_LAMBDA
        };

        let delta = usize::try_from(options.delta).unwrap_or_else(|_| {
            replaced("boundary distance", options.delta, DEFAULT_DELTA);
            DEFAULT_DELTA as usize
        });

        let first_scale = usize::try_from(options.first_scale).unwrap_or_else(|_| {
            replaced("first scale", options.first_scale, 0);
            0
        });

        let gradient = gradient_from_code(options.gradient).unwrap_or_else(|| {
            replaced("gradient type", options.gradient, DEFAULT_GRADIENT);
            GradientKind::Farid5
        });

        let output_format = OutputFormat::from_code(options.output_format).unwrap_or_else(|| {
            replaced("output format", options.output_format, DEFAULT_OUTPUT_FORMAT);
            OutputFormat::Parameters
        });

        Self {
            first,
            second,
            output_file: options.output_file,
            output_format,
            nscales: usize::try_from(options.nscales).ok().filter(|&n| n > 0),
            zoom_factor,
            tolerance,
            transform_type,
            robust,
            lambda,
            first_scale,
            grayscale: flag("grayscale", options.grayscale, DEFAULT_GRAYSCALE),
            delta,
            discard_boundary: flag(
                "boundary discard",
                options.discard_boundary,
                DEFAULT_DISCARD_BOUNDARY,
            ),
            gradient,
            laplacian: options.laplacian != 0,
            verbose: options.verbose,
            seeds: options.seeds,
        }
    }
}

impl std::fmt::Display for AlignConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "zoom={:.6}, TOL={:.6}, transform type={}, robust function={}, lambda={:.6}, \
             output file={}, delta={}, nanifoutside={}, graymethod={}, first scale={}, \
             gradient type={}, type output={}",
            self.zoom_factor,
            self.tolerance,
            self.transform_type.nparams(),
            self.robust.code(),
            self.lambda,
            self.output_file.display(),
            self.delta,
            u8::from(self.discard_boundary),
            u8::from(self.grayscale),
            self.first_scale,
            gradient_code(self.gradient),
            self.output_format.code(),
        )
    }
}
