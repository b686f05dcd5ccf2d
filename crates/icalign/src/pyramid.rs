use icalign_image::ImageSize;

/// Smallest side, in pixels, allowed at the coarsest pyramid level.
pub const MIN_PYRAMID_SIDE: usize = 32;

/// Number of pyramid levels and the zoom factor between consecutive levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidSpec {
    /// Number of levels, the finest one included. At least one.
    pub levels: usize,
    /// Zoom factor between consecutive levels, in (0, 1).
    pub zoom_factor: f64,
}

/// Number of pyramid levels for a smaller side `D`, never less than one.
///
/// It is the largest count keeping the coarsest smaller side at [`MIN_PYRAMID_SIDE`] or more:
/// `N = 1 + floor(log(D / 32) / log(1 / z))`, corrected so that `D·z^(N-1) ≥ 32 > D·z^N`
/// holds despite floating point rounding. Where that formula gives zero or less, for images
/// smaller than 32 pixels, the result is one level, as it is for zoom factors outside (0, 1).
///
/// # Arguments
///
/// * `min_side` - The smaller side of the image.
/// * `zoom_factor` - The zoom factor, in (0, 1).
pub fn max_levels(min_side: usize, zoom_factor: f64) -> usize {
    let side = min_side as f64;
    let limit = MIN_PYRAMID_SIDE as f64;

    if side < limit || !(zoom_factor > 0.0 && zoom_factor < 1.0) {
        return 1;
    }

    let estimate = 1.0 + ((side / limit).ln() / (1.0 / zoom_factor).ln()).floor();
    let mut levels = if estimate.is_finite() && estimate >= 1.0 {
        estimate as usize
    } else {
        1
    };

    let coarsest = |levels: usize| side * zoom_factor.powi(levels as i32 - 1);
    while levels > 1 && coarsest(levels) < limit {
        levels -= 1;
    }
    while coarsest(levels + 1) >= limit {
        levels += 1;
    }

    levels
}

impl PyramidSpec {
    /// Resolve the level count for an image.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the finest level.
    /// * `requested` - The requested level count. `None`, or more levels than the image
    ///   allows, selects [`max_levels`].
    /// * `zoom_factor` - The zoom factor, in (0, 1).
    pub fn resolve(size: ImageSize, requested: Option<usize>, zoom_factor: f64) -> Self {
        let max = max_levels(size.min_side(), zoom_factor);
        let levels = match requested {
            Some(levels) if levels > 0 && levels <= max => levels,
            _ => max,
        };

        Self {
            levels,
            zoom_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_levels_keeps_coarsest_side_above_limit() {
        for side in [32usize, 33, 63, 64, 65, 100, 127, 128, 129, 480, 512, 1000, 4096] {
            for zoom in [0.3, 0.5, 0.5f64.sqrt(), 0.75, 0.9, 0.95] {
                let n = max_levels(side, zoom);
                let d = side as f64;
                assert!(n >= 1);
                assert!(d * zoom.powi(n as i32 - 1) >= 32.0, "side {side} zoom {zoom}");
                assert!(d * zoom.powi(n as i32) < 32.0, "side {side} zoom {zoom}");
            }
        }
    }

    #[test]
    fn max_levels_known_values() {
        assert_eq!(max_levels(64, 0.5), 2);
        assert_eq!(max_levels(256, 0.5), 4);
        assert_eq!(max_levels(255, 0.5), 3);
        assert_eq!(max_levels(20, 0.5), 1);
    }

    #[test]
    fn resolve_requested_levels() {
        let size = ImageSize {
            width: 300,
            height: 256,
        };
        assert_eq!(PyramidSpec::resolve(size, None, 0.5).levels, 4);
        assert_eq!(PyramidSpec::resolve(size, Some(0), 0.5).levels, 4);
        assert_eq!(PyramidSpec::resolve(size, Some(9), 0.5).levels, 4);
        assert_eq!(PyramidSpec::resolve(size, Some(2), 0.5).levels, 2);
        assert_eq!(PyramidSpec::resolve(size, Some(4), 0.5).levels, 4);
    }
}
