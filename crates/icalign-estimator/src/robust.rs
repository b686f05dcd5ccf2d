//! Robust error functions for the iteratively reweighted least squares.
//!
//! Each function is represented by the derivative of its error `ρ(t², λ)` with respect to the
//! squared residual `t²`, which is the weight of a residual in the normal equations.

use icalign::RobustFunction;

/// Initial robust scale when it is chosen automatically.
pub const AUTO_LAMBDA_START: f64 = 80.0;
/// Factor applied to the automatic robust scale after each iteration.
pub const AUTO_LAMBDA_DECAY: f64 = 0.9;
/// Smallest automatic robust scale.
pub const AUTO_LAMBDA_MIN: f64 = 5.0;

/// Trait for robust loss functions that scale residuals by weight.
pub trait RobustLoss {
    /// Compute loss weight for a squared residual norm.
    fn weight(&self, squared_norm: f64) -> f64;
}

/// Quadratic loss: weight always 1.0 (L2 baseline).
#[derive(Debug, Clone, Copy)]
pub struct QuadraticLoss;

impl RobustLoss for QuadraticLoss {
    fn weight(&self, _squared_norm: f64) -> f64 {
        1.0
    }
}

/// Truncated quadratic loss: residuals beyond `lambda` are ignored.
#[derive(Debug, Clone, Copy)]
pub struct TruncatedQuadraticLoss {
    /// Truncation threshold.
    pub lambda: f64,
}

impl RobustLoss for TruncatedQuadraticLoss {
    fn weight(&self, squared_norm: f64) -> f64 {
        if squared_norm < self.lambda * self.lambda {
            1.0
        } else {
            0.0
        }
    }
}

/// Geman-McClure loss: `λ² / (λ² + t²)²`.
#[derive(Debug, Clone, Copy)]
pub struct GemanMcClureLoss {
    /// Scale of the function.
    pub lambda: f64,
}

impl RobustLoss for GemanMcClureLoss {
    fn weight(&self, squared_norm: f64) -> f64 {
        let lambda_sq = self.lambda * self.lambda;
        let denom = lambda_sq + squared_norm;
        lambda_sq / (denom * denom)
    }
}

/// Lorentzian loss: `1 / (λ² + t²)`.
#[derive(Debug, Clone, Copy)]
pub struct LorentzianLoss {
    /// Scale of the function.
    pub lambda: f64,
}

impl RobustLoss for LorentzianLoss {
    fn weight(&self, squared_norm: f64) -> f64 {
        1.0 / (self.lambda * self.lambda + squared_norm)
    }
}

/// Charbonnier loss: `1 / sqrt(t² + λ²)`.
#[derive(Debug, Clone, Copy)]
pub struct CharbonnierLoss {
    /// Scale of the function.
    pub lambda: f64,
}

impl RobustLoss for CharbonnierLoss {
    fn weight(&self, squared_norm: f64) -> f64 {
        1.0 / (squared_norm + self.lambda * self.lambda).sqrt()
    }
}

/// Build the loss of a robust function at the scale `lambda`.
pub fn robust_loss(function: RobustFunction, lambda: f64) -> Box<dyn RobustLoss> {
    match function {
        RobustFunction::Quadratic => Box::new(QuadraticLoss),
        RobustFunction::TruncatedQuadratic => Box::new(TruncatedQuadraticLoss { lambda }),
        RobustFunction::GemanMcClure => Box::new(GemanMcClureLoss { lambda }),
        RobustFunction::Lorentzian => Box::new(LorentzianLoss { lambda }),
        RobustFunction::Charbonnier => Box::new(CharbonnierLoss { lambda }),
    }
}

/// The robust scale along the iterations.
///
/// A positive scale is kept fixed. Otherwise it starts at [`AUTO_LAMBDA_START`] and decays by
/// [`AUTO_LAMBDA_DECAY`] per iteration down to [`AUTO_LAMBDA_MIN`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambdaSchedule {
    current: f64,
    automatic: bool,
}

impl LambdaSchedule {
    /// Create the schedule for a requested scale, non positive for automatic.
    pub fn new(lambda: f64) -> Self {
        if lambda > 0.0 {
            Self {
                current: lambda,
                automatic: false,
            }
        } else {
            Self {
                current: AUTO_LAMBDA_START,
                automatic: true,
            }
        }
    }

    /// The scale of the current iteration.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Move to the next iteration.
    pub fn step(&mut self) {
        if self.automatic {
            self.current = (self.current * AUTO_LAMBDA_DECAY).max(AUTO_LAMBDA_MIN);
        }
    }
}
