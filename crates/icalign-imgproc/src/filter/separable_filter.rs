use icalign_image::{Image, ImageError};

/// A separable 2D correlation: a horizontal 1D pass followed by a vertical 1D pass.
struct SeparableFilter {
    kernel_x: Vec<f32>,
    kernel_y: Vec<f32>,
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
}

impl SeparableFilter {
    /// Create a new separable filter with the given kernels.
    ///
    /// The kernel tap `i` is applied at offset `i - (len - 1) / 2`, so even sized kernels lean
    /// towards the positive side.
    fn new(kernel_x: &[f32], kernel_y: &[f32]) -> Self {
        let offsets = |kernel: &[f32]| -> Vec<isize> {
            let center = (kernel.len().saturating_sub(1) / 2) as isize;
            (0..kernel.len()).map(|i| i as isize - center).collect()
        };

        Self {
            kernel_x: kernel_x.to_vec(),
            kernel_y: kernel_y.to_vec(),
            offsets_x: offsets(kernel_x),
            offsets_y: offsets(kernel_y),
        }
    }

    fn apply<const C: usize>(
        &self,
        src: &Image<f32, C>,
        dst: &mut Image<f32, C>,
    ) -> Result<(), ImageError> {
        let rows = src.rows();
        let cols = src.cols();

        let src_data = src.as_slice();
        let dst_data = dst.as_slice_mut();
        let mut temp = vec![0.0f32; src_data.len()];

        // horizontal
        for r in 0..rows {
            let row_offset = r * cols * C;
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                    let x = (c as isize + off).clamp(0, cols as isize - 1) as usize;
                    let idx = row_offset + x * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += src_data[idx + ch] * k;
                    }
                }
                temp[row_offset + c * C..row_offset + (c + 1) * C].copy_from_slice(&acc);
            }
        }

        // vertical
        for r in 0..rows {
            for c in 0..cols {
                let mut acc = [0.0f32; C];
                for (&k, &off) in self.kernel_y.iter().zip(self.offsets_y.iter()) {
                    let y = (r as isize + off).clamp(0, rows as isize - 1) as usize;
                    let idx = (y * cols + c) * C;
                    for (ch, acc_val) in acc.iter_mut().enumerate() {
                        *acc_val += temp[idx + ch] * k;
                    }
                }
                let out_idx = (r * cols + c) * C;
                dst_data[out_idx..out_idx + C].copy_from_slice(&acc);
            }
        }

        Ok(())
    }
}

/// Apply a separable filter to an image.
///
/// The filter is a correlation with replicated (clamped) borders.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
///
/// # Errors
///
/// Returns an error if the source and destination sizes differ.
///
/// # Example
///
/// ```
/// use icalign_image::{Image, ImageSize};
/// use icalign_imgproc::filter::separable_filter;
///
/// let src = Image::<f32, 1>::new(
///     ImageSize {
///         width: 3,
///         height: 1,
///     },
///     vec![0.0, 3.0, 6.0],
/// )
/// .unwrap();
///
/// let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0).unwrap();
///
/// separable_filter(&src, &mut dst, &[1.0 / 3.0; 3], &[1.0]).unwrap();
/// assert_eq!(dst.as_slice(), &[1.0, 3.0, 5.0]);
/// ```
pub fn separable_filter<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.size().area() == 0 {
        return Ok(());
    }

    SeparableFilter::new(kernel_x, kernel_y).apply(src, dst)
}
