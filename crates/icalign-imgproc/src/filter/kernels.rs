/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Create a first order gaussian derivative kernel.
///
/// The kernel is scaled so that correlating it with a unit ramp yields exactly one.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, odd.
/// * `sigma` - The sigma of the underlying gaussian.
pub fn gaussian_derivative_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    let mut kernel = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - mean;
            x * (-(x * x) / (2.0 * sigma_sq)).exp()
        })
        .collect::<Vec<_>>();

    normalize_derivative_kernel(&mut kernel);
    kernel
}

/// Create the Farid 3-tap derivative and prefilter kernels.
///
/// # Returns
///
/// A tuple with the derivative and the prefilter kernels.
pub fn farid3_kernel_1d() -> (Vec<f32>, Vec<f32>) {
    (
        vec![-0.425287, 0.0, 0.425287],
        vec![0.229879, 0.540242, 0.229879],
    )
}

/// Create the Farid 5-tap derivative and prefilter kernels.
///
/// # Returns
///
/// A tuple with the derivative and the prefilter kernels.
pub fn farid5_kernel_1d() -> (Vec<f32>, Vec<f32>) {
    (
        vec![-0.109604, -0.276691, 0.0, 0.276691, 0.109604],
        vec![0.037659, 0.249153, 0.426375, 0.249153, 0.037659],
    )
}

/// Scale a derivative kernel so that correlating it with a unit ramp yields exactly one.
pub fn normalize_derivative_kernel(kernel: &mut [f32]) {
    let center = kernel.len().saturating_sub(1) as f32 / 2.0;
    let norm = kernel
        .iter()
        .enumerate()
        .map(|(i, k)| (i as f32 - center) * k)
        .sum::<f32>();
    if norm != 0.0 {
        kernel.iter_mut().for_each(|k| *k /= norm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (i, &k) in kernel.iter().enumerate() {
            assert_relative_eq!(k, expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gaussian_derivative_kernel_1d() {
        let kernel = gaussian_derivative_kernel_1d(5, 0.6);

        assert_eq!(kernel.len(), 5);
        assert_relative_eq!(kernel[2], 0.0);
        assert_relative_eq!(kernel[0], -kernel[4], epsilon = 1e-7);

        let ramp_response: f32 = kernel
            .iter()
            .enumerate()
            .map(|(i, k)| k * i as f32)
            .sum();
        assert_relative_eq!(ramp_response, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_farid_kernel_1d() {
        let (mut derivative, prefilter) = farid5_kernel_1d();
        assert_eq!(derivative.len(), 5);
        assert_relative_eq!(prefilter.iter().sum::<f32>(), 1.0, epsilon = 1e-5);

        normalize_derivative_kernel(&mut derivative);
        assert_relative_eq!(derivative[3] + 2.0 * derivative[4], 0.5, epsilon = 1e-6);

        let (derivative, prefilter) = farid3_kernel_1d();
        assert_relative_eq!(derivative[0], -derivative[2]);
        assert_relative_eq!(prefilter.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
    }
}
