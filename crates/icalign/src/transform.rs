use icalign_image::ImageError;

use crate::error::AlignError;

/// The parametric motion models, identified by their number of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformType {
    /// `(tx, ty)`.
    Translation,
    /// `(tx, ty, θ)`.
    Euclidean,
    /// `(tx, ty, a, b)`, with matrix `[1+a, -b, tx; b, 1+a, ty]`.
    Similarity,
    /// `(tx, ty, a11, a12, a21, a22)`, with matrix `[1+a11, a12, tx; a21, 1+a22, ty]`.
    Affinity,
    /// `(h11, h12, h13, h21, h22, h23, h31, h32)`, the homography minus the identity.
    Homography,
}

impl TransformType {
    /// Get the transform type with `nparams` parameters, if any.
    pub fn from_nparams(nparams: usize) -> Option<Self> {
        match nparams {
            2 => Some(TransformType::Translation),
            3 => Some(TransformType::Euclidean),
            4 => Some(TransformType::Similarity),
            6 => Some(TransformType::Affinity),
            8 => Some(TransformType::Homography),
            _ => None,
        }
    }

    /// Number of parameters of the model.
    pub fn nparams(&self) -> usize {
        match self {
            TransformType::Translation => 2,
            TransformType::Euclidean => 3,
            TransformType::Similarity => 4,
            TransformType::Affinity => 6,
            TransformType::Homography => 8,
        }
    }

    /// Jacobian of the warped point with respect to the parameters, at the identity.
    ///
    /// # Arguments
    ///
    /// * `x` - The x coordinate of the point.
    /// * `y` - The y coordinate of the point.
    ///
    /// # Returns
    ///
    /// The two rows `d(x')/dp` and `d(y')/dp`. Only the first [`Self::nparams`] columns are
    /// meaningful, the rest are zero.
    #[rustfmt::skip]
    pub fn jacobian(&self, x: f64, y: f64) -> [[f64; 8]; 2] {
        match self {
            TransformType::Translation => [
                [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            ],
            TransformType::Euclidean => [
                [1.0, 0.0, -y, 0.0, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, x, 0.0, 0.0, 0.0, 0.0, 0.0],
            ],
            TransformType::Similarity => [
                [1.0, 0.0, x, -y, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, y, x, 0.0, 0.0, 0.0, 0.0],
            ],
            TransformType::Affinity => [
                [1.0, 0.0, x, y, 0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0, x, y, 0.0, 0.0],
            ],
            TransformType::Homography => [
                [x, y, 1.0, 0.0, 0.0, 0.0, -x * x, -x * y],
                [0.0, 0.0, 0.0, x, y, 1.0, -x * y, -y * y],
            ],
        }
    }
}

impl std::fmt::Display for TransformType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            TransformType::Translation => "translation",
            TransformType::Euclidean => "euclidean",
            TransformType::Similarity => "similarity",
            TransformType::Affinity => "affinity",
            TransformType::Homography => "homography",
        };
        write!(f, "{name}")
    }
}

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

/// A 3x3 homogeneous matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformMatrix(pub [f64; 9]);

impl TransformMatrix {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0])
    }

    /// The 9 entries, row-major.
    pub fn as_array(&self) -> &[f64; 9] {
        &self.0
    }

    /// The determinant of the matrix.
    pub fn determinant(&self) -> f64 {
        determinant3x3(&self.0)
    }

    /// The inverse of the matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix is singular.
    pub fn inverse(&self) -> Result<Self, ImageError> {
        let det = self.determinant();

        if det == 0.0 {
            return Err(ImageError::CannotComputeDeterminant);
        }

        let adj = adjugate3x3(&self.0);
        let inv_det = 1.0 / det;

        Ok(Self(adj.map(|v| v * inv_det)))
    }

    /// Map a point, with the perspective division.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        icalign_imgproc::warp::transform_point(x, y, &self.0)
    }
}

impl std::ops::Mul for TransformMatrix {
    type Output = TransformMatrix;

    fn mul(self, rhs: TransformMatrix) -> TransformMatrix {
        let (a, b) = (&self.0, &rhs.0);
        let mut out = [0.0; 9];
        for i in 0..3 {
            for j in 0..3 {
                out[3 * i + j] = (0..3).map(|k| a[3 * i + k] * b[3 * k + j]).sum();
            }
        }
        TransformMatrix(out)
    }
}

/// The parameter vector of a transform, of length [`TransformType::nparams`].
///
/// All parameters at zero is the identity for every model.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParameters {
    kind: TransformType,
    values: Vec<f64>,
}

impl TransformParameters {
    /// The identity transform of the given type.
    pub fn identity(kind: TransformType) -> Self {
        Self {
            kind,
            values: vec![0.0; kind.nparams()],
        }
    }

    /// Create the parameters taking value `i` from `seeds[i]`.
    ///
    /// Seeds past the number of parameters of the model are ignored.
    pub fn from_seeds(kind: TransformType, seeds: &[f64; 8]) -> Self {
        Self {
            kind,
            values: seeds[..kind.nparams()].to_vec(),
        }
    }

    /// Create the parameters from their values.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of values differs from the parameter count of `kind`.
    pub fn from_slice(kind: TransformType, values: &[f64]) -> Result<Self, AlignError> {
        if values.len() != kind.nparams() {
            return Err(AlignError::InvalidParameterCount {
                expected: kind.nparams(),
                found: values.len(),
            });
        }
        Ok(Self {
            kind,
            values: values.to_vec(),
        })
    }

    /// The transform type.
    pub fn kind(&self) -> TransformType {
        self.kind
    }

    /// The parameter values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// The parameter values, mutable.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// The homogeneous matrix of the transform.
    ///
    /// # Example
    ///
    /// ```
    /// use icalign::transform::{TransformParameters, TransformType};
    ///
    /// let p = TransformParameters::from_slice(TransformType::Translation, &[2.0, -1.0]).unwrap();
    /// assert_eq!(
    ///     p.to_matrix().as_array(),
    ///     &[1.0, 0.0, 2.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0]
    /// );
    /// ```
    pub fn to_matrix(&self) -> TransformMatrix {
        let p = &self.values;
        let mut m = TransformMatrix::identity().0;
        match self.kind {
            TransformType::Translation => {
                m[2] = p[0];
                m[5] = p[1];
            }
            TransformType::Euclidean => {
                let (sin, cos) = p[2].sin_cos();
                m = [cos, -sin, p[0], sin, cos, p[1], 0.0, 0.0, 1.0];
            }
            TransformType::Similarity => {
                m = [1.0 + p[2], -p[3], p[0], p[3], 1.0 + p[2], p[1], 0.0, 0.0, 1.0];
            }
            TransformType::Affinity => {
                m = [1.0 + p[2], p[3], p[0], p[4], 1.0 + p[5], p[1], 0.0, 0.0, 1.0];
            }
            TransformType::Homography => {
                m = [
                    1.0 + p[0],
                    p[1],
                    p[2],
                    p[3],
                    1.0 + p[4],
                    p[5],
                    p[6],
                    p[7],
                    1.0,
                ];
            }
        }
        TransformMatrix(m)
    }

    /// Recover the parameters of `kind` from a matrix of that family.
    ///
    /// Entries the model cannot represent are ignored. A homography is normalized so that its
    /// last entry is one.
    pub fn from_matrix(kind: TransformType, matrix: &TransformMatrix) -> Self {
        let m = &matrix.0;
        let values = match kind {
            TransformType::Translation => vec![m[2], m[5]],
            TransformType::Euclidean => vec![m[2], m[5], m[3].atan2(m[0])],
            TransformType::Similarity => vec![m[2], m[5], m[0] - 1.0, m[3]],
            TransformType::Affinity => vec![m[2], m[5], m[0] - 1.0, m[1], m[3], m[4] - 1.0],
            TransformType::Homography => {
                let s = if m[8] != 0.0 { 1.0 / m[8] } else { 1.0 };
                vec![
                    m[0] * s - 1.0,
                    m[1] * s,
                    m[2] * s,
                    m[3] * s,
                    m[4] * s - 1.0,
                    m[5] * s,
                    m[6] * s,
                    m[7] * s,
                ]
            }
        };
        Self { kind, values }
    }

    /// Inverse compositional update: `M(p) · M(Δp)⁻¹`.
    ///
    /// # Errors
    ///
    /// Returns an error if the increment is not invertible.
    pub fn compose_inverse(&self, delta: &TransformParameters) -> Result<Self, AlignError> {
        let inv_delta = delta.to_matrix().inverse()?;
        Ok(Self::from_matrix(self.kind, &(self.to_matrix() * inv_delta)))
    }

    /// Express the transform in a frame scaled by `scale`: `S · M · S⁻¹`, `S = diag(s, s, 1)`.
    pub fn rescaled(&self, scale: f64) -> Self {
        let mut m = self.to_matrix().0;
        m[2] *= scale;
        m[5] *= scale;
        m[6] /= scale;
        m[7] /= scale;
        Self::from_matrix(self.kind, &TransformMatrix(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_TYPES: [TransformType; 5] = [
        TransformType::Translation,
        TransformType::Euclidean,
        TransformType::Similarity,
        TransformType::Affinity,
        TransformType::Homography,
    ];

    fn sample_values(kind: TransformType) -> Vec<f64> {
        [0.7, -1.3, 0.05, -0.02, 0.03, 0.01, 1e-4, -2e-4][..kind.nparams()].to_vec()
    }

    #[test]
    fn nparams_round_trip() {
        for kind in ALL_TYPES {
            assert_eq!(TransformType::from_nparams(kind.nparams()), Some(kind));
        }
        assert_eq!(TransformType::from_nparams(5), None);
        assert_eq!(TransformType::from_nparams(0), None);
    }

    #[test]
    fn seeds_are_assigned_positionally() {
        let seeds = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let p = TransformParameters::from_seeds(TransformType::Similarity, &seeds);
        assert_eq!(p.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        let p = TransformParameters::from_seeds(TransformType::Homography, &seeds);
        assert_eq!(p.as_slice(), &seeds);
    }

    #[test]
    fn from_slice_checks_length() {
        let result = TransformParameters::from_slice(TransformType::Affinity, &[0.0; 4]);
        assert!(matches!(
            result,
            Err(AlignError::InvalidParameterCount {
                expected: 6,
                found: 4
            })
        ));
    }

    #[test]
    fn identity_matrix_for_zero_parameters() {
        for kind in ALL_TYPES {
            assert_eq!(
                TransformParameters::identity(kind).to_matrix(),
                TransformMatrix::identity()
            );
        }
    }

    #[test]
    fn euclidean_matrix() -> Result<(), AlignError> {
        let theta = std::f64::consts::FRAC_PI_6;
        let p = TransformParameters::from_slice(TransformType::Euclidean, &[3.0, 4.0, theta])?;
        let m = p.to_matrix();
        assert_relative_eq!(m.0[0], theta.cos());
        assert_relative_eq!(m.0[1], -theta.sin());
        assert_relative_eq!(m.0[3], theta.sin());
        assert_eq!((m.0[2], m.0[5]), (3.0, 4.0));
        Ok(())
    }

    #[test]
    fn matrix_round_trip() {
        for kind in ALL_TYPES {
            let p = TransformParameters::from_slice(kind, &sample_values(kind)).unwrap();
            let back = TransformParameters::from_matrix(kind, &p.to_matrix());
            for (a, b) in back.as_slice().iter().zip(p.as_slice()) {
                assert_relative_eq!(a, b, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn matrix_inverse() -> Result<(), ImageError> {
        let m = TransformMatrix([1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0]);
        let expected = TransformMatrix([1.0, 0.0, 1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.inverse()?, expected);

        let singular = TransformMatrix([1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 0.0, 0.0, 1.0]);
        assert_eq!(singular.inverse(), Err(ImageError::CannotComputeDeterminant));
        Ok(())
    }

    #[test]
    fn compose_inverse_of_itself_is_identity() -> Result<(), AlignError> {
        for kind in ALL_TYPES {
            let p = TransformParameters::from_slice(kind, &sample_values(kind))?;
            let composed = p.compose_inverse(&p)?;
            for v in composed.as_slice() {
                assert_relative_eq!(*v, 0.0, epsilon = 1e-12);
            }
        }
        Ok(())
    }

    #[test]
    fn compose_inverse_translation() -> Result<(), AlignError> {
        let p = TransformParameters::from_slice(TransformType::Translation, &[5.0, 1.0])?;
        let delta = TransformParameters::from_slice(TransformType::Translation, &[0.5, -0.25])?;
        assert_eq!(p.compose_inverse(&delta)?.as_slice(), &[4.5, 1.25]);
        Ok(())
    }

    #[test]
    fn rescaled_maps_points_consistently() -> Result<(), AlignError> {
        let kind = TransformType::Homography;
        let p = TransformParameters::from_slice(kind, &sample_values(kind))?;
        let scaled = p.rescaled(2.0);

        // a point x at the coarse level is 2x at the fine level
        let (x, y) = (10.0, 7.0);
        let (u, v) = p.to_matrix().transform_point(x, y);
        let (us, vs) = scaled.to_matrix().transform_point(2.0 * x, 2.0 * y);
        assert_relative_eq!(us, 2.0 * u, epsilon = 1e-9);
        assert_relative_eq!(vs, 2.0 * v, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn jacobian_matches_finite_differences() -> Result<(), AlignError> {
        let (x, y) = (3.0, -2.0);
        let eps = 1e-7;
        for kind in ALL_TYPES {
            let jacobian = kind.jacobian(x, y);
            for i in 0..kind.nparams() {
                let mut values = vec![0.0; kind.nparams()];
                values[i] = eps;
                let p = TransformParameters::from_slice(kind, &values)?;
                let (u, v) = p.to_matrix().transform_point(x, y);
                assert_relative_eq!((u - x) / eps, jacobian[0][i], epsilon = 1e-4);
                assert_relative_eq!((v - y) / eps, jacobian[1][i], epsilon = 1e-4);
            }
        }
        Ok(())
    }
}
