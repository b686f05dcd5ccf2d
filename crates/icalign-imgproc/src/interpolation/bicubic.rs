use icalign_image::Image;

/// Keys cubic convolution (a = -0.5) through four equally spaced samples.
///
/// `t` is the offset from `v[1]` towards `v[2]`, in `[0, 1)`.
fn cubic_interpolate(v: [f32; 4], t: f32) -> f32 {
    let [v0, v1, v2, v3] = v;
    v1 + 0.5
        * t
        * (v2 - v0
            + t * (2.0 * v0 - 5.0 * v1 + 4.0 * v2 - v3 + t * (3.0 * (v1 - v2) + v3 - v0)))
}

/// Kernel for bicubic interpolation
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `c` - The channel of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel value. Neighbours outside the image are replicated from the border.
pub(crate) fn bicubic_interpolation<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    c: usize,
) -> f32 {
    let (rows, cols) = (image.rows() as isize, image.cols() as isize);
    let data = image.as_slice();

    // beyond two pixels outside the image every neighbour is a border pixel
    let u = u.clamp(-2.0, cols as f32 + 1.0);
    let v = v.clamp(-2.0, rows as f32 + 1.0);

    let (u0, v0) = (u.floor(), v.floor());
    let (tu, tv) = (u - u0, v - v0);
    let (iu, iv) = (u0 as isize, v0 as isize);

    let sample = |x: isize, y: isize| -> f32 {
        let x = x.clamp(0, cols - 1) as usize;
        let y = y.clamp(0, rows - 1) as usize;
        data[(y * cols as usize + x) * C + c]
    };

    let mut column = [0.0f32; 4];
    for (j, value) in column.iter_mut().enumerate() {
        let y = iv - 1 + j as isize;
        *value = cubic_interpolate(
            [
                sample(iu - 1, y),
                sample(iu, y),
                sample(iu + 1, y),
                sample(iu + 2, y),
            ],
            tu,
        );
    }

    cubic_interpolate(column, tv)
}
